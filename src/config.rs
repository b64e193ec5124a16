use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::scenario::ScenarioInput;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드(auto/pt-br/en-us/ko-kr)
    pub language: String,
    /// 외부 언어팩 디렉터리. 없으면 locales/ 후 내장 문자열.
    pub language_pack_dir: Option<String>,
    /// 금액 표시 앞에 붙는 문자열(표시 전용)
    pub money_prefix: String,
    /// GUI 창 투명도(0.3~1.0)
    pub window_alpha: f32,
    /// GUI 하단에 표시할 작성자/서명 문구
    pub footer_lines: Vec<String>,
    /// GUI 하단 서명 이미지(PNG) 경로
    pub signature_image: Option<String>,
    /// 시작 시 채워 넣을 시나리오 입력
    pub scenario: ScenarioInput,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            language_pack_dir: None,
            money_prefix: "R$".into(),
            window_alpha: 1.0,
            footer_lines: Vec::new(),
            signature_image: None,
            scenario: ScenarioInput::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML 역직렬화 오류
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_from(DEFAULT_CONFIG_PATH)
}

/// 지정 경로에서 설정을 읽는다. 파일이 없으면 기본값을 저장하고 돌려준다.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_to(&cfg, path)?;
        info!(path = %path.display(), "default config written");
        Ok(cfg)
    }
}

/// 설정을 지정 경로에 TOML로 저장한다.
pub fn save_to(cfg: &Config, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path.as_ref(), content)?;
    Ok(())
}

impl Config {
    /// 설정을 config.toml에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        save_to(self, DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ltv_cac_{}_{name}.toml", std::process::id()))
    }

    #[test]
    fn missing_file_writes_defaults() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_then_load_keeps_scenario() {
        let path = temp_path("roundtrip");
        let mut cfg = Config::default();
        cfg.language = "en-us".into();
        cfg.scenario.monthly_churn_rate = 0.05;
        save_to(&cfg, &path).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("language = \"ko\"\n").unwrap();
        assert_eq!(cfg.language, "ko");
        assert_eq!(cfg.money_prefix, "R$");
        assert_eq!(cfg.scenario, ScenarioInput::default());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let path = temp_path("invalid");
        fs::write(&path, "language = [").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&path);
    }
}
