//! 핵심 계산 로직을 라이브러리로 분리하여 CLI 뿐 아니라 GUI에서도 같은 엔진을 쓴다.

pub mod app;
pub mod config;
pub mod i18n;
pub mod report;
pub mod scenario;
pub mod ui_cli;

pub use scenario::{
    compute_breakdown, compute_scenarios, retention_months, ScenarioBreakdown, ScenarioError,
    ScenarioInput, ScenarioKind, ScenarioTable,
};
