use approx::assert_relative_eq;
use ltv_cac_simulator::scenario::{
    self, CostBasis, Divisor, ScenarioError, ScenarioInput, ScenarioKind, ValueBasis,
};

#[test]
fn reference_scenario_matches_published_values() {
    let table = scenario::compute_scenarios(&ScenarioInput::default()).expect("reference calc");
    let b = table.breakdown;
    assert!((b.retention_months - 33.333_333).abs() < 1e-4, "retention={}", b.retention_months);
    assert!((b.value_full - 8333.33).abs() < 0.01, "ltv_full={}", b.value_full);
    assert!((b.value_ex_depreciation - 10000.0).abs() < 1e-6);
    assert_eq!(b.cost_full, 3500.0);
    assert!((b.cost_amortized - 3277.78).abs() < 0.01, "cac_amortized={}", b.cost_amortized);
    assert_eq!(b.cost_ex_capex, 500.0);

    let first = &table.ratios[0];
    assert_eq!(first.label, "LTV Completo vs CAC Completo");
    assert!((first.ratio - 2.38).abs() < 0.005, "ratio={}", first.ratio);
}

#[test]
fn table_keeps_contract_order_and_pairs_value_over_cost() {
    let input = ScenarioInput::default();
    let table = scenario::compute_scenarios(&input).unwrap();
    assert_eq!(table.ratios.len(), 6);
    let b = table.breakdown;
    let expected = [
        b.value_full / b.cost_full,
        b.value_ex_depreciation / b.cost_full,
        b.value_full / b.cost_amortized,
        b.value_ex_depreciation / b.cost_amortized,
        b.value_full / b.cost_ex_capex,
        b.value_ex_depreciation / b.cost_ex_capex,
    ];
    for ((r, kind), want) in table.iter().zip(ScenarioKind::ALL).zip(expected) {
        assert_eq!(r.kind, kind);
        assert_eq!(r.label, kind.label());
        assert_eq!(r.ratio, want);
    }
    let pairs = table.pairs();
    assert_eq!(pairs[5].0, "LTV MB Sem Deprec. vs CAC sem CAPEX");
    assert_relative_eq!(pairs[5].1, 20.0, epsilon = 1e-9);
    assert_eq!(table.ratio(ScenarioKind::FullVsAmortized), Some(expected[2]));
}

#[test]
fn breakdown_accessors_select_variants() {
    let b = scenario::compute_breakdown(&ScenarioInput::default()).unwrap();
    assert_eq!(b.value(ValueBasis::Full), b.value_full);
    assert_eq!(b.value(ValueBasis::ExDepreciation), b.value_ex_depreciation);
    assert_eq!(b.cost(CostBasis::Full), b.cost_full);
    assert_eq!(b.cost(CostBasis::Amortized), b.cost_amortized);
    assert_eq!(b.cost(CostBasis::ExCapex), b.cost_ex_capex);
}

#[test]
fn amortized_exceeds_full_when_retention_outlasts_useful_life() {
    // 이탈률 1% -> 유지 100개월 > 내용연수 36개월
    let input = ScenarioInput {
        monthly_churn_rate: 0.01,
        ..ScenarioInput::default()
    };
    let b = scenario::compute_breakdown(&input).unwrap();
    assert!(b.retention_months > input.equipment_useful_life_months);
    assert!(b.cost_amortized > b.cost_full, "amortized={} full={}", b.cost_amortized, b.cost_full);
    assert!(b.cost_full > b.cost_ex_capex);
}

#[test]
fn costs_ordered_when_retention_within_useful_life() {
    let input = ScenarioInput {
        monthly_churn_rate: 0.05, // 20개월 <= 36개월
        ..ScenarioInput::default()
    };
    let b = scenario::compute_breakdown(&input).unwrap();
    assert!(b.cost_full >= b.cost_amortized);
    assert!(b.cost_amortized >= b.cost_ex_capex);
}

#[test]
fn zero_acquisition_costs_leave_ratios_undefined() {
    let input = ScenarioInput {
        equipment_capex: 0.0,
        other_acquisition_cost: 0.0,
        ..ScenarioInput::default()
    };
    let b = scenario::compute_breakdown(&input).unwrap();
    assert_eq!(b.cost_ex_capex, 0.0);
    for kind in [ScenarioKind::FullVsExCapex, ScenarioKind::ExDepreciationVsExCapex] {
        assert_eq!(
            b.ratio(kind),
            Err(ScenarioError::DivisionByZero {
                divisor: Divisor::CostExCapex
            })
        );
    }
    // capex와 기타 비용이 모두 0이면 CAC 전체/상각도 0이다.
    assert!(b.ratio(ScenarioKind::FullVsFull).is_err());

    let err = scenario::compute_scenarios(&input).unwrap_err();
    assert!(matches!(err, ScenarioError::DivisionByZero { .. }));
}

#[test]
fn zero_other_cost_keeps_first_four_ratios_defined() {
    let input = ScenarioInput {
        other_acquisition_cost: 0.0,
        ..ScenarioInput::default()
    };
    let b = scenario::compute_breakdown(&input).unwrap();
    for kind in &ScenarioKind::ALL[..4] {
        let r = b.ratio(*kind).unwrap();
        assert!(r.is_finite() && r > 0.0, "{kind:?} -> {r}");
    }
    assert_eq!(
        scenario::compute_scenarios(&input),
        Err(ScenarioError::DivisionByZero {
            divisor: Divisor::CostExCapex
        })
    );
}

#[test]
fn churn_approaching_zero_is_explicit_failure() {
    for churn in [0.0, -0.0, 1e-310, f64::MIN_POSITIVE / 4.0] {
        let input = ScenarioInput {
            monthly_churn_rate: churn,
            ..ScenarioInput::default()
        };
        assert_eq!(
            scenario::compute_scenarios(&input),
            Err(ScenarioError::DivisionByZero {
                divisor: Divisor::MonthlyChurnRate
            }),
            "churn={churn:e}"
        );
    }
    // 아주 작지만 정상 범위인 이탈률은 유한한 값을 낸다.
    let tiny = ScenarioInput {
        monthly_churn_rate: 1e-9,
        ..ScenarioInput::default()
    };
    let table = scenario::compute_scenarios(&tiny).unwrap();
    assert!(table.iter().all(|r| r.ratio.is_finite()));
}

#[test]
fn repeated_calls_return_identical_tables() {
    let input = ScenarioInput::from_percentages(720.0, 42.5, 55.0, 2.2, 4100.0, 650.0, 48.0);
    let first = scenario::compute_scenarios(&input).unwrap();
    for _ in 0..5 {
        assert_eq!(scenario::compute_scenarios(&input).unwrap(), first);
    }
}

#[test]
fn compute_from_many_threads() {
    let input = ScenarioInput::default();
    let expected = scenario::compute_scenarios(&input).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(move || scenario::compute_scenarios(&input).unwrap()))
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
