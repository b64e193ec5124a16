use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ltv_cac_simulator::{
    app::{self, AppError, ScenarioOverrides},
    config, i18n,
    report::ReportFormat,
};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// LTV/CAC 시나리오 시뮬레이터 CLI
#[derive(Parser)]
#[command(name = "ltv_cac_simulator_cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 언어(auto/pt-br/en-us/ko-kr)
    #[arg(short = 'L', long, global = true, default_value = "auto")]
    lang: String,

    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 파라미터를 받아 6개 시나리오를 한 번 계산한다
    Simulate {
        #[command(flatten)]
        overrides: ScenarioOverrides,

        /// 출력 형식
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// 결과를 저장할 파일(생략 시 표준출력)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 파라미터를 하나씩 묻고 계산한다(기본 동작)
    Interactive,
    /// 기본 설정 파일을 생성한다
    InitConfig,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 선택한 명령을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let lang = i18n::resolve_language(&cli.lang, None);
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            let tr = i18n::Translator::new(&lang);
            eprintln!("{}: {err}", tr.t(i18n::keys::ERROR_PREFIX));
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    if let Some(Commands::InitConfig) = cli.command {
        return app::run_init_config(&cli.config);
    }

    let mut cfg = config::load_from(&cli.config)?;
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = i18n::Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    debug!(lang = %lang, config = %cli.config.display(), "CLI started");

    match cli.command {
        Some(Commands::Simulate {
            overrides,
            format,
            output,
        }) => app::run_simulate(&cfg, &overrides, format, output.as_deref(), &tr),
        Some(Commands::Interactive) | None => app::run_interactive(&mut cfg, &cli.config, &tr),
        Some(Commands::InitConfig) => Ok(()),
    }
}
