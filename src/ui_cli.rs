use std::io::{self, Write};

use crate::app::AppError;
use crate::i18n::{keys, Translator};
use crate::scenario::ScenarioInput;

/// 각 파라미터를 순서대로 묻는다. 엔터만 누르면 괄호 안의 기존 값을 유지한다.
/// 마진과 이탈률은 퍼센트로 입력받는다.
pub fn prompt_scenario(tr: &Translator, current: &ScenarioInput) -> Result<ScenarioInput, AppError> {
    let revenue = read_f64_or(tr, keys::LABEL_REVENUE, current.average_monthly_revenue)?;
    let margin_full = read_f64_or(tr, keys::LABEL_MARGIN_FULL, current.gross_margin_full * 100.0)?;
    let margin_ex_dep = read_f64_or(
        tr,
        keys::LABEL_MARGIN_EX_DEP,
        current.gross_margin_ex_depreciation * 100.0,
    )?;
    let churn = read_f64_or(tr, keys::LABEL_CHURN, current.monthly_churn_rate * 100.0)?;
    let capex = read_f64_or(tr, keys::LABEL_CAPEX, current.equipment_capex)?;
    let other = read_f64_or(tr, keys::LABEL_OTHER_CAC, current.other_acquisition_cost)?;
    let life = read_f64_or(tr, keys::LABEL_USEFUL_LIFE, current.equipment_useful_life_months)?;
    Ok(ScenarioInput::from_percentages(
        revenue,
        margin_full,
        margin_ex_dep,
        churn,
        capex,
        other,
        life,
    ))
}

/// y/s(sim)/예 로 시작하는 답이면 true.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    let answer = read_line(prompt)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    let a = answer.trim().to_lowercase();
    a.starts_with('y') || a.starts_with('s') || a.starts_with('예')
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

fn read_f64_or(tr: &Translator, label_key: &str, default: f64) -> Result<f64, AppError> {
    let prompt = format!("{} [{}]: ", tr.t(label_key), show_default(default));
    loop {
        let s = read_line(&prompt)?;
        match parse_or_default(&s, default) {
            Some(v) => return Ok(v),
            None => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
        }
    }
}

/// 빈 입력은 기본값, 숫자는 그 값, 그 외는 None.
fn parse_or_default(s: &str, default: f64) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(default);
    }
    t.parse::<f64>().ok()
}

/// 0.03 * 100 같은 부동소수 잔여물을 숨기고 표시한다.
fn show_default(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    format!("{rounded}")
}
