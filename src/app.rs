use std::path::Path;

use clap::Args;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{self, Config, ConfigError};
use crate::i18n::{keys, Translator};
use crate::report::{self, ReportFormat};
use crate::scenario::{self, ScenarioBreakdown, ScenarioError, ScenarioInput};
use crate::ui_cli;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// 시나리오 입력/계산 오류
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
    /// CSV 작성 오류
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// 명령행에서 시나리오 파라미터를 덮어쓴다. 지정하지 않은 값은 설정 파일 값을 쓴다.
#[derive(Debug, Clone, Default, Args)]
pub struct ScenarioOverrides {
    /// 월 평균 객단가
    #[arg(long)]
    pub revenue: Option<f64>,
    /// 감가상각 포함 매출총이익률 [%]
    #[arg(long, value_name = "PCT")]
    pub margin_full: Option<f64>,
    /// 감가상각 제외 매출총이익률 [%]
    #[arg(long, value_name = "PCT")]
    pub margin_ex_dep: Option<f64>,
    /// 월 이탈률 [%]
    #[arg(long, value_name = "PCT")]
    pub churn: Option<f64>,
    /// 장비 CAPEX
    #[arg(long)]
    pub capex: Option<f64>,
    /// 기타 획득 비용
    #[arg(long)]
    pub other_cac: Option<f64>,
    /// 장비 내용연수 [월]
    #[arg(long, value_name = "MONTHS")]
    pub useful_life: Option<f64>,
}

impl ScenarioOverrides {
    /// 기준 입력에 지정된 값만 덮어쓴다. 퍼센트 값은 소수로 바꾼다.
    pub fn apply(&self, base: ScenarioInput) -> ScenarioInput {
        ScenarioInput {
            average_monthly_revenue: self.revenue.unwrap_or(base.average_monthly_revenue),
            gross_margin_full: self
                .margin_full
                .map(|p| p / 100.0)
                .unwrap_or(base.gross_margin_full),
            gross_margin_ex_depreciation: self
                .margin_ex_dep
                .map(|p| p / 100.0)
                .unwrap_or(base.gross_margin_ex_depreciation),
            monthly_churn_rate: self
                .churn
                .map(|p| p / 100.0)
                .unwrap_or(base.monthly_churn_rate),
            equipment_capex: self.capex.unwrap_or(base.equipment_capex),
            other_acquisition_cost: self.other_cac.unwrap_or(base.other_acquisition_cost),
            equipment_useful_life_months: self
                .useful_life
                .unwrap_or(base.equipment_useful_life_months),
        }
    }
}

/// 입력을 검증하고 보조 표시값을 계산한다. 정의되지 않는 비율은 경고만 남긴다.
fn compute_checked(input: &ScenarioInput) -> Result<ScenarioBreakdown, ScenarioError> {
    input.validate()?;
    let breakdown = scenario::compute_breakdown(input).inspect_err(|e| {
        warn!(error = %e, "scenario computation failed");
    })?;
    for (kind, ratio) in breakdown.ratios() {
        if let Err(e) = ratio {
            warn!(scenario = kind.label(), error = %e, "ratio undefined");
        }
    }
    debug!(?input, "scenario computed");
    Ok(breakdown)
}

/// 입력을 검증·계산하고 보고서 문자열을 만든다.
///
/// CSV 형식은 보조 표시값 없이 표 본문만 돌려준다.
pub fn simulate(
    input: &ScenarioInput,
    format: ReportFormat,
    tr: &Translator,
    money_prefix: &str,
) -> Result<String, AppError> {
    let breakdown = compute_checked(input)?;
    if format == ReportFormat::Csv {
        return Ok(report::render_csv(&breakdown)?);
    }
    Ok(format!(
        "{}\n== {} ==\n{}",
        report::render_breakdown(&breakdown, tr, money_prefix),
        tr.t(keys::RESULTS_HEADING),
        report::render(&breakdown, format, tr)?
    ))
}

/// `simulate` 명령: 결과를 표준출력 또는 파일로 보낸다.
pub fn run_simulate(
    config: &Config,
    overrides: &ScenarioOverrides,
    format: ReportFormat,
    output: Option<&Path>,
    tr: &Translator,
) -> Result<(), AppError> {
    let input = overrides.apply(config.scenario);
    let text = simulate(&input, format, tr, &config.money_prefix)?;
    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            info!(path = %path.display(), "report written");
            println!("{} {}", tr.t(keys::EXPORT_SAVED), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// 대화형 모드의 메인 루프를 실행한다. 마지막으로 계산한 입력을 설정에 저장한다.
pub fn run_interactive(
    config: &mut Config,
    config_path: &Path,
    tr: &Translator,
) -> Result<(), AppError> {
    println!("{}", tr.t(keys::INTERACTIVE_HEADING));
    println!("{}", tr.t(keys::INTERACTIVE_HINT));
    loop {
        let input = ui_cli::prompt_scenario(tr, &config.scenario)?;
        match compute_checked(&input) {
            Ok(breakdown) => {
                println!(
                    "\n{}",
                    report::render_breakdown(&breakdown, tr, &config.money_prefix)
                );
                println!("== {} ==", tr.t(keys::RESULTS_HEADING));
                println!("{}", report::render_table(&breakdown, tr));
                println!("{}", report::render(&breakdown, ReportFormat::Chart, tr)?);
                config.scenario = input;
            }
            Err(e) => {
                warn!(error = %e, "scenario rejected");
                println!("{}: {e}", tr.t(keys::ERROR_INVALID_INPUT));
            }
        }
        if !ui_cli::confirm(&tr.t(keys::PROMPT_AGAIN))? {
            break;
        }
    }
    config::save_to(config, config_path)?;
    println!("{}", tr.t(keys::APP_EXIT));
    Ok(())
}

/// `init-config` 명령: 기본 설정 파일을 쓴다.
pub fn run_init_config(path: &Path) -> Result<(), AppError> {
    config::save_to(&Config::default(), path)?;
    info!(path = %path.display(), "default config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_convert_percentages() {
        let o = ScenarioOverrides {
            margin_full: Some(40.0),
            churn: Some(5.0),
            capex: Some(0.0),
            ..Default::default()
        };
        let input = o.apply(ScenarioInput::default());
        assert!((input.gross_margin_full - 0.4).abs() < 1e-12);
        assert!((input.monthly_churn_rate - 0.05).abs() < 1e-12);
        assert_eq!(input.equipment_capex, 0.0);
        assert_eq!(input.gross_margin_ex_depreciation, 0.60);
        assert_eq!(input.average_monthly_revenue, 500.0);
    }

    #[test]
    fn simulate_rejects_invalid_input_before_computing() {
        let tr = Translator::new("en");
        let input = ScenarioInput {
            monthly_churn_rate: 0.0,
            ..ScenarioInput::default()
        };
        let err = simulate(&input, ReportFormat::Table, &tr, "R$").unwrap_err();
        assert!(matches!(
            err,
            AppError::Scenario(ScenarioError::OutOfRange {
                field: "monthly_churn_rate",
                ..
            })
        ));
    }

    #[test]
    fn simulate_csv_has_no_readouts() {
        let tr = Translator::new("pt");
        let text = simulate(&ScenarioInput::default(), ReportFormat::Csv, &tr, "R$").unwrap();
        assert!(text.starts_with("scenario,ltv_cac\n"));
        assert_eq!(text.lines().count(), 7);
        assert!(!text.contains("R$"));
    }

    #[test]
    fn simulate_keeps_readouts_when_ex_capex_cost_is_zero() {
        let tr = Translator::new("pt");
        let input = ScenarioInput {
            other_acquisition_cost: 0.0,
            ..ScenarioInput::default()
        };
        let text = simulate(&input, ReportFormat::Table, &tr, "R$").unwrap();
        assert!(text.contains("CAC Amortizado: R$ 2,777.78"), "{text}");
        assert!(text.contains(tr.t(keys::RATIO_UNDEFINED).as_ref()), "{text}");
        let csv = simulate(&input, ReportFormat::Csv, &tr, "R$").unwrap();
        assert_eq!(csv.lines().count(), 7);
        assert!(csv.ends_with("LTV MB Sem Deprec. vs CAC sem CAPEX,\n"), "{csv}");
    }

    #[test]
    fn simulate_table_includes_readouts_and_labels() {
        let tr = Translator::new("pt");
        let text = simulate(&ScenarioInput::default(), ReportFormat::Table, &tr, "R$").unwrap();
        assert!(text.contains("Tempo Médio de Retenção: 33.33 meses"));
        assert!(text.contains("CAC Amortizado: R$ 3,277.78"));
        assert!(text.contains("LTV MB Sem Deprec. vs CAC sem CAPEX"));
        assert!(text.contains("2.38"));
    }
}
