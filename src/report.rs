//! 계산 결과를 사람이 읽을 수 있는 문자열(표, CSV, 막대 차트)로 만든다.
//!
//! 모든 출력은 `ScenarioBreakdown`에서 시나리오별로 비율을 구한다. 정의되지 않는
//! 비율(해당 CAC가 0)은 해당 줄만 표시를 바꾸고 나머지는 그대로 보여준다.

use std::borrow::Cow;
use std::fmt::Write;

use clap::ValueEnum;

use crate::i18n::{keys, Translator};
use crate::scenario::{ScenarioBreakdown, ScenarioError};

/// 결과 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// 정렬된 2열 표
    Table,
    /// 쉼표 구분 값
    Csv,
    /// 가로 막대 차트
    Chart,
}

/// 금액을 천 단위 구분자와 소수 2자리로 표시한다. 예: 3277.777 -> "3,277.78"
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn format_ratio(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_months(value: f64) -> String {
    format!("{value:.2}")
}

/// 보조 표시값(유지 기간, LTV 2종, CAC 3종)을 여러 줄 문자열로 만든다.
pub fn render_breakdown(b: &ScenarioBreakdown, tr: &Translator, money_prefix: &str) -> String {
    let money = |v: f64| {
        if money_prefix.is_empty() {
            format_money(v)
        } else {
            format!("{money_prefix} {}", format_money(v))
        }
    };
    let mut out = String::new();
    let _ = writeln!(out, "-- {} --", tr.t(keys::READOUT_HEADING));
    let _ = writeln!(
        out,
        "{}: {} {}",
        tr.t(keys::READOUT_RETENTION),
        format_months(b.retention_months),
        tr.t(keys::READOUT_MONTHS)
    );
    for (key, value) in [
        (keys::READOUT_LTV_FULL, b.value_full),
        (keys::READOUT_LTV_EX_DEP, b.value_ex_depreciation),
        (keys::READOUT_CAC_FULL, b.cost_full),
        (keys::READOUT_CAC_AMORTIZED, b.cost_amortized),
        (keys::READOUT_CAC_EX_CAPEX, b.cost_ex_capex),
    ] {
        let _ = writeln!(out, "{}: {}", tr.t(key), money(value));
    }
    out
}

fn ratio_text<'a>(ratio: &Result<f64, ScenarioError>, tr: &'a Translator) -> Cow<'a, str> {
    match ratio {
        Ok(v) => Cow::Owned(format_ratio(*v)),
        Err(_) => tr.t(keys::RATIO_UNDEFINED),
    }
}

/// 시나리오 라벨과 LTV/CAC 비율을 정렬된 표로 만든다.
pub fn render_table(b: &ScenarioBreakdown, tr: &Translator) -> String {
    let header_scenario = tr.t(keys::TABLE_SCENARIO);
    let header_ratio = tr.t(keys::TABLE_RATIO);
    let rows: Vec<(&str, Cow<'_, str>)> = b
        .ratios()
        .iter()
        .map(|(kind, ratio)| (kind.label(), ratio_text(ratio, tr)))
        .collect();
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain(std::iter::once(header_scenario.chars().count()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .chain([header_ratio.chars().count(), 8])
        .max()
        .unwrap_or(8);

    let mut out = String::new();
    let _ = writeln!(out, "{header_scenario:<width$}  {header_ratio:>value_width$}");
    let _ = writeln!(out, "{}", "-".repeat(width + 2 + value_width));
    for (label, value) in &rows {
        let _ = writeln!(out, "{label:<width$}  {value:>value_width$}");
    }
    out
}

/// 결과를 CSV로 만든다. 헤더는 `scenario,ltv_cac`이고 정의되지 않는 비율은 빈 칸이다.
pub fn render_csv(b: &ScenarioBreakdown) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(["scenario", "ltv_cac"])?;
    for (kind, ratio) in b.ratios() {
        let value = ratio.map(|r| r.to_string()).unwrap_or_default();
        wtr.write_record([kind.label(), value.as_str()])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 비율마다 가로 막대 하나를 그린다. 가장 큰 비율이 `width` 칸을 차지한다.
pub fn render_bar_chart(b: &ScenarioBreakdown, width: usize, tr: &Translator) -> String {
    let ratios = b.ratios();
    let label_width = ratios
        .iter()
        .map(|(kind, _)| kind.label().chars().count())
        .max()
        .unwrap_or(0);
    let max = ratios
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (kind, ratio) in &ratios {
        let len = match ratio {
            Ok(v) if max > 0.0 && v.is_finite() && *v > 0.0 => {
                ((v / max) * width as f64).round() as usize
            }
            _ => 0,
        };
        let _ = writeln!(
            out,
            "{:<label_width$} | {} {}",
            kind.label(),
            "█".repeat(len),
            ratio_text(ratio, tr)
        );
    }
    out
}

/// 선택한 형식으로 결과 본문을 만든다.
pub fn render(
    b: &ScenarioBreakdown,
    format: ReportFormat,
    tr: &Translator,
) -> Result<String, csv::Error> {
    Ok(match format {
        ReportFormat::Table => render_table(b, tr),
        ReportFormat::Csv => render_csv(b)?,
        ReportFormat::Chart => {
            format!("{}\n{}", tr.t(keys::CHART_TITLE), render_bar_chart(b, 40, tr))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{compute_breakdown, ScenarioInput, ScenarioKind};

    fn zero_other_cost() -> ScenarioBreakdown {
        compute_breakdown(&ScenarioInput {
            other_acquisition_cost: 0.0,
            ..ScenarioInput::default()
        })
        .unwrap()
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(3277.777), "3,277.78");
        assert_eq!(format_money(500.0), "500.00");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-10000.0), "-10,000.00");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(999.999), "1,000.00");
    }

    #[test]
    fn table_marks_undefined_ratios() {
        let tr = Translator::new("en");
        let text = render_table(&zero_other_cost(), &tr);
        let undefined = tr.t(keys::RATIO_UNDEFINED);
        let lines: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[..4].iter().all(|l| !l.contains(undefined.as_ref())), "{text}");
        assert!(lines[4].starts_with(ScenarioKind::FullVsExCapex.label()));
        assert!(lines[4].ends_with(undefined.as_ref()), "{text}");
        assert!(lines[5].ends_with(undefined.as_ref()), "{text}");
    }

    #[test]
    fn csv_leaves_undefined_ratio_empty() {
        let csv = render_csv(&zero_other_cost()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, ["scenario", "ltv_cac"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6);
        assert!(rows[0][1].parse::<f64>().is_ok());
        assert_eq!(&rows[4][1], "");
        assert_eq!(&rows[5][1], "");
        assert!(!csv.contains('\r'));
    }

    #[test]
    fn chart_draws_no_bar_for_undefined_ratio() {
        let tr = Translator::new("pt");
        let chart = render_bar_chart(&zero_other_cost(), 10, &tr);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[0].contains('█'));
        assert!(!lines[5].contains('█'));
        assert!(lines[5].ends_with(tr.t(keys::RATIO_UNDEFINED).as_ref()));
    }
}
