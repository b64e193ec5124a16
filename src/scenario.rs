//! LTV/CAC 시나리오 계산 엔진.
//!
//! 7개의 사업 파라미터로부터 평균 유지 기간, 3가지 CAC, 2가지 LTV,
//! 그리고 LTV × CAC 교차곱 6개의 비율을 계산한다. 상태를 갖지 않는 순수 함수로만
//! 구성되며 로깅/입출력도 하지 않는다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 0으로 나누기가 발생한 분모를 구분한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divisor {
    /// 월 이탈률 (유지 기간 = 1 / 이탈률)
    MonthlyChurnRate,
    /// 장비 내용연수(월)
    EquipmentUsefulLife,
    /// CAC 완전
    CostFull,
    /// CAC 상각
    CostAmortized,
    /// CAPEX 제외 CAC
    CostExCapex,
}

impl std::fmt::Display for Divisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Divisor::MonthlyChurnRate => "monthly churn rate",
            Divisor::EquipmentUsefulLife => "equipment useful life",
            Divisor::CostFull => "full CAC",
            Divisor::CostAmortized => "amortized CAC",
            Divisor::CostExCapex => "CAC without CAPEX",
        };
        f.write_str(name)
    }
}

/// 시나리오 계산 오류.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ScenarioError {
    /// 분모가 0이거나 나눗셈 결과가 유한하지 않음
    #[error("division by zero: {divisor} is zero")]
    DivisionByZero { divisor: Divisor },

    /// 입력 범위 위반. `ScenarioInput::validate`에서만 반환된다.
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// 시나리오 계산 입력. 마진과 이탈률은 소수(0.5 = 50%)로 받는다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    /// 고객당 월 평균 매출(티켓)
    pub average_monthly_revenue: f64,
    /// 감가상각 포함 매출총이익률(0~1)
    pub gross_margin_full: f64,
    /// 감가상각 제외 매출총이익률(0~1)
    pub gross_margin_ex_depreciation: f64,
    /// 월 이탈률(0~1, 0 초과)
    pub monthly_churn_rate: f64,
    /// 고객 1명 확보 시 투입되는 장비 CAPEX
    pub equipment_capex: f64,
    /// 기타 획득 비용(마케팅, 영업 등)
    pub other_acquisition_cost: f64,
    /// 장비 내용연수 [월]
    pub equipment_useful_life_months: f64,
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self {
            average_monthly_revenue: 500.0,
            gross_margin_full: 0.50,
            gross_margin_ex_depreciation: 0.60,
            monthly_churn_rate: 0.03,
            equipment_capex: 3000.0,
            other_acquisition_cost: 500.0,
            equipment_useful_life_months: 36.0,
        }
    }
}

impl ScenarioInput {
    /// 마진/이탈률을 퍼센트(0~100)로 받아 입력을 만든다.
    pub fn from_percentages(
        average_monthly_revenue: f64,
        gross_margin_full_pct: f64,
        gross_margin_ex_depreciation_pct: f64,
        monthly_churn_rate_pct: f64,
        equipment_capex: f64,
        other_acquisition_cost: f64,
        equipment_useful_life_months: f64,
    ) -> Self {
        Self {
            average_monthly_revenue,
            gross_margin_full: gross_margin_full_pct / 100.0,
            gross_margin_ex_depreciation: gross_margin_ex_depreciation_pct / 100.0,
            monthly_churn_rate: monthly_churn_rate_pct / 100.0,
            equipment_capex,
            other_acquisition_cost,
            equipment_useful_life_months,
        }
    }

    /// 입력값이 도메인 범위 안에 있는지 확인한다.
    ///
    /// `compute_scenarios`는 이 검사를 하지 않는다(마진 등은 산술적으로 그대로 전파).
    /// CLI/GUI가 계산 전에 호출한다. NaN은 모든 범위에서 거부된다.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        check(
            "average_monthly_revenue",
            self.average_monthly_revenue,
            self.average_monthly_revenue > 0.0,
            "> 0",
        )?;
        check(
            "gross_margin_full",
            self.gross_margin_full,
            (0.0..=1.0).contains(&self.gross_margin_full),
            "0..=1",
        )?;
        check(
            "gross_margin_ex_depreciation",
            self.gross_margin_ex_depreciation,
            (0.0..=1.0).contains(&self.gross_margin_ex_depreciation),
            "0..=1",
        )?;
        check(
            "monthly_churn_rate",
            self.monthly_churn_rate,
            self.monthly_churn_rate > 0.0 && self.monthly_churn_rate <= 1.0,
            "0 < x <= 1",
        )?;
        check(
            "equipment_capex",
            self.equipment_capex,
            self.equipment_capex >= 0.0,
            ">= 0",
        )?;
        check(
            "other_acquisition_cost",
            self.other_acquisition_cost,
            self.other_acquisition_cost >= 0.0,
            ">= 0",
        )?;
        check(
            "equipment_useful_life_months",
            self.equipment_useful_life_months,
            self.equipment_useful_life_months > 0.0,
            "> 0",
        )?;
        Ok(())
    }
}

/// 무한대와 NaN은 범위 조건과 관계없이 거부한다.
fn check(field: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<(), ScenarioError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ScenarioError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}

/// LTV 산정 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueBasis {
    /// 감가상각 포함 마진
    Full,
    /// 감가상각 제외 마진
    ExDepreciation,
}

/// CAC 산정 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostBasis {
    /// CAPEX + 기타 비용
    Full,
    /// 유지 기간만큼만 상각한 CAPEX + 기타 비용
    Amortized,
    /// 기타 비용만
    ExCapex,
}

impl CostBasis {
    fn divisor(self) -> Divisor {
        match self {
            CostBasis::Full => Divisor::CostFull,
            CostBasis::Amortized => Divisor::CostAmortized,
            CostBasis::ExCapex => Divisor::CostExCapex,
        }
    }
}

/// 6개 비교 시나리오. 선언 순서가 곧 출력 순서다(CAC 기준으로 묶이고 LTV가 번갈아 나온다).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    FullVsFull,
    ExDepreciationVsFull,
    FullVsAmortized,
    ExDepreciationVsAmortized,
    FullVsExCapex,
    ExDepreciationVsExCapex,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::FullVsFull,
        ScenarioKind::ExDepreciationVsFull,
        ScenarioKind::FullVsAmortized,
        ScenarioKind::ExDepreciationVsAmortized,
        ScenarioKind::FullVsExCapex,
        ScenarioKind::ExDepreciationVsExCapex,
    ];

    /// 고정 라벨. 차트/표 소비자가 위치로 대응시키므로 번역하지 않는다.
    pub fn label(self) -> &'static str {
        match self {
            ScenarioKind::FullVsFull => "LTV Completo vs CAC Completo",
            ScenarioKind::ExDepreciationVsFull => "LTV MB Sem Deprec. vs CAC Completo",
            ScenarioKind::FullVsAmortized => "LTV Completo vs CAC Amortizado",
            ScenarioKind::ExDepreciationVsAmortized => "LTV MB Sem Deprec. vs CAC Amortizado",
            ScenarioKind::FullVsExCapex => "LTV Completo vs CAC sem CAPEX",
            ScenarioKind::ExDepreciationVsExCapex => "LTV MB Sem Deprec. vs CAC sem CAPEX",
        }
    }

    pub fn value_basis(self) -> ValueBasis {
        match self {
            ScenarioKind::FullVsFull
            | ScenarioKind::FullVsAmortized
            | ScenarioKind::FullVsExCapex => ValueBasis::Full,
            _ => ValueBasis::ExDepreciation,
        }
    }

    pub fn cost_basis(self) -> CostBasis {
        match self {
            ScenarioKind::FullVsFull | ScenarioKind::ExDepreciationVsFull => CostBasis::Full,
            ScenarioKind::FullVsAmortized | ScenarioKind::ExDepreciationVsAmortized => {
                CostBasis::Amortized
            }
            ScenarioKind::FullVsExCapex | ScenarioKind::ExDepreciationVsExCapex => {
                CostBasis::ExCapex
            }
        }
    }
}

/// 중간 계산값. 화면 보조 표시(사이드바 등)에서 그대로 사용한다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioBreakdown {
    /// 평균 유지 기간 [월]
    pub retention_months: f64,
    /// CAC 완전
    pub cost_full: f64,
    /// CAC 상각
    pub cost_amortized: f64,
    /// CAC (CAPEX 제외)
    pub cost_ex_capex: f64,
    /// LTV (감가상각 포함 마진)
    pub value_full: f64,
    /// LTV (감가상각 제외 마진)
    pub value_ex_depreciation: f64,
}

impl ScenarioBreakdown {
    pub fn value(&self, basis: ValueBasis) -> f64 {
        match basis {
            ValueBasis::Full => self.value_full,
            ValueBasis::ExDepreciation => self.value_ex_depreciation,
        }
    }

    pub fn cost(&self, basis: CostBasis) -> f64 {
        match basis {
            CostBasis::Full => self.cost_full,
            CostBasis::Amortized => self.cost_amortized,
            CostBasis::ExCapex => self.cost_ex_capex,
        }
    }

    /// 단일 시나리오의 LTV/CAC를 계산한다. 해당 CAC가 0이면 `DivisionByZero`.
    pub fn ratio(&self, kind: ScenarioKind) -> Result<f64, ScenarioError> {
        let cost = kind.cost_basis();
        checked_div(self.value(kind.value_basis()), self.cost(cost), cost.divisor())
    }

    /// 6개 시나리오를 고정 순서로 계산한다. 정의되지 않는 비율만 `Err`로 남는다.
    pub fn ratios(&self) -> [(ScenarioKind, Result<f64, ScenarioError>); 6] {
        ScenarioKind::ALL.map(|kind| (kind, self.ratio(kind)))
    }
}

/// 라벨이 붙은 LTV/CAC 비율 한 줄.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioRatio {
    pub kind: ScenarioKind,
    pub label: &'static str,
    pub ratio: f64,
}

/// 계산 결과 전체: 중간값 + 순서가 고정된 6개 비율.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    pub breakdown: ScenarioBreakdown,
    pub ratios: Vec<ScenarioRatio>,
}

impl ScenarioTable {
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRatio> {
        self.ratios.iter()
    }

    /// 시나리오 종류로 비율을 찾는다.
    pub fn ratio(&self, kind: ScenarioKind) -> Option<f64> {
        self.ratios.iter().find(|r| r.kind == kind).map(|r| r.ratio)
    }

    /// (라벨, 비율) 쌍으로 내보낸다.
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        self.ratios.iter().map(|r| (r.label, r.ratio)).collect()
    }
}

/// 분모가 0이거나(부호 무관) 몫이 발산하면 오류로 돌려준다.
/// 분자가 NaN인 경우는 그대로 전파한다.
fn checked_div(numerator: f64, denominator: f64, divisor: Divisor) -> Result<f64, ScenarioError> {
    if denominator == 0.0 {
        return Err(ScenarioError::DivisionByZero { divisor });
    }
    let q = numerator / denominator;
    if q.is_infinite() && numerator.is_finite() {
        return Err(ScenarioError::DivisionByZero { divisor });
    }
    Ok(q)
}

/// 평균 유지 기간 = 1 / 월 이탈률.
pub fn retention_months(monthly_churn_rate: f64) -> Result<f64, ScenarioError> {
    checked_div(1.0, monthly_churn_rate, Divisor::MonthlyChurnRate)
}

/// 유지 기간, CAC 3종, LTV 2종을 한 번에 계산한다.
pub fn compute_breakdown(input: &ScenarioInput) -> Result<ScenarioBreakdown, ScenarioError> {
    let retention = retention_months(input.monthly_churn_rate)?;

    let capex_per_month = checked_div(
        input.equipment_capex,
        input.equipment_useful_life_months,
        Divisor::EquipmentUsefulLife,
    )?;
    let cost_full = input.equipment_capex + input.other_acquisition_cost;
    let cost_amortized = capex_per_month * retention + input.other_acquisition_cost;
    let cost_ex_capex = input.other_acquisition_cost;

    let value_full = input.average_monthly_revenue * input.gross_margin_full * retention;
    let value_ex_depreciation =
        input.average_monthly_revenue * input.gross_margin_ex_depreciation * retention;

    Ok(ScenarioBreakdown {
        retention_months: retention,
        cost_full,
        cost_amortized,
        cost_ex_capex,
        value_full,
        value_ex_depreciation,
    })
}

/// 6개 LTV/CAC 시나리오를 고정 순서로 계산한다. 정의되지 않는 비율이 하나라도 있으면 오류.
pub fn compute_scenarios(input: &ScenarioInput) -> Result<ScenarioTable, ScenarioError> {
    let breakdown = compute_breakdown(input)?;
    let ratios = ScenarioKind::ALL
        .iter()
        .map(|&kind| {
            Ok(ScenarioRatio {
                kind,
                label: kind.label(),
                ratio: breakdown.ratio(kind)?,
            })
        })
        .collect::<Result<Vec<_>, ScenarioError>>()?;
    Ok(ScenarioTable { breakdown, ratios })
}
