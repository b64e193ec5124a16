use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const APP_TITLE: &str = "general.app_title";

    pub const INTERACTIVE_HEADING: &str = "interactive.heading";
    pub const INTERACTIVE_HINT: &str = "interactive.hint";
    pub const PROMPT_AGAIN: &str = "interactive.prompt_again";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const ERROR_INVALID_INPUT: &str = "error.invalid_input";

    pub const SIDEBAR_HEADING: &str = "input.heading";
    pub const LABEL_REVENUE: &str = "input.revenue";
    pub const LABEL_MARGIN_FULL: &str = "input.margin_full";
    pub const LABEL_MARGIN_EX_DEP: &str = "input.margin_ex_dep";
    pub const LABEL_CHURN: &str = "input.churn";
    pub const LABEL_CAPEX: &str = "input.capex";
    pub const LABEL_OTHER_CAC: &str = "input.other_cac";
    pub const LABEL_USEFUL_LIFE: &str = "input.useful_life";

    pub const READOUT_HEADING: &str = "readout.heading";
    pub const READOUT_RETENTION: &str = "readout.retention";
    pub const READOUT_MONTHS: &str = "readout.months";
    pub const READOUT_LTV_FULL: &str = "readout.ltv_full";
    pub const READOUT_LTV_EX_DEP: &str = "readout.ltv_ex_dep";
    pub const READOUT_CAC_FULL: &str = "readout.cac_full";
    pub const READOUT_CAC_AMORTIZED: &str = "readout.cac_amortized";
    pub const READOUT_CAC_EX_CAPEX: &str = "readout.cac_ex_capex";

    pub const RESULTS_HEADING: &str = "results.heading";
    pub const TABLE_SCENARIO: &str = "results.scenario";
    pub const TABLE_RATIO: &str = "results.ratio";
    pub const CHART_TITLE: &str = "results.chart_title";
    pub const RATIO_UNDEFINED: &str = "results.undefined";
    pub const EXPORT_SAVED: &str = "results.export_saved";

    pub const FORMULA_LTV_HEADING: &str = "formula.ltv_heading";
    pub const FORMULA_LTV: &str = "formula.ltv";
    pub const FORMULA_LTV_WHERE: &str = "formula.ltv_where";
    pub const FORMULA_CAC_HEADING: &str = "formula.cac_heading";
    pub const FORMULA_CAC: &str = "formula.cac";
    pub const FORMULA_CAC_WHERE: &str = "formula.cac_where";

    pub const GUI_SETTINGS: &str = "gui.settings";
    pub const GUI_LANGUAGE: &str = "gui.language";
    pub const GUI_ALPHA: &str = "gui.alpha";
    pub const GUI_SAVE: &str = "gui.save";
    pub const GUI_SAVED: &str = "gui.saved";
    pub const GUI_EXPORT_CSV: &str = "gui.export_csv";
    pub const GUI_RESET: &str = "gui.reset";
    pub const GUI_SHOW_FORMULAS: &str = "gui.show_formulas";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Pt,
    En,
    Ko,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("en") {
            Language::En
        } else if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::Pt
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(pt/en/ko)에 따라 번역기를 생성한다. 알 수 없는 코드는 pt로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// 번역을 가져온다. 언어팩 → 해당 언어 → 영어 → 포르투갈어 → 키 순으로 찾는다.
    pub fn t<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return Cow::Borrowed(v.as_str());
        }
        let builtin = match self.lang {
            Language::Pt => pt(key),
            Language::En => en(key).or_else(|| pt(key)),
            Language::Ko => ko(key).or_else(|| en(key)).or_else(|| pt(key)),
        };
        Cow::Borrowed(builtin.unwrap_or(key))
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "pt-br".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        "pt" | "pt-br" | "pt-pt" => Some("pt-br".into()),
        "en" | "en-us" | "en-uk" | "en-gb" => Some("en-us".into()),
        "ko" | "ko-kr" => Some("ko-kr".into()),
        other if other.starts_with("pt") => Some("pt-br".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        other if other.starts_with("ko") => Some("ko-kr".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "pt" => Some("pt-br".into()),
        "en" => Some("en-us".into()),
        "ko" => Some("ko-kr".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(loc) = get_locale() {
        if let Some(lang) = normalize_locale_string(&loc) {
            return Some(lang);
        }
    }
    for var in ["LANG", "LC_ALL"] {
        if let Ok(lang) = std::env::var(var) {
            if let Some(code) = normalize_locale_string(&lang) {
                return Some(code);
            }
        }
    }
    None
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 플랫 맵 또는 [섹션] 중첩.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., pt-br)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., pt)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Table = toml::from_str(src).ok()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    walk(&format!("{prefix}.{k}"), v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in &value {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn pt(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Erro",
        APP_EXIT => "Encerrando o simulador.",
        APP_TITLE => "Simulador de Cenários LTV/CAC",
        INTERACTIVE_HEADING => "\n=== Simulador de Cenários LTV/CAC ===",
        INTERACTIVE_HINT => "Pressione Enter para manter o valor entre colchetes.",
        PROMPT_AGAIN => "Simular outro cenário? (s/N): ",
        ERROR_INVALID_NUMBER => "Digite um número.",
        ERROR_INVALID_INPUT => "Parâmetro inválido",
        SIDEBAR_HEADING => "Parâmetros de Entrada",
        LABEL_REVENUE => "Ticket médio mensal",
        LABEL_MARGIN_FULL => "Margem bruta completa (%)",
        LABEL_MARGIN_EX_DEP => "Margem bruta sem depreciação (%)",
        LABEL_CHURN => "Churn rate mensal (%)",
        LABEL_CAPEX => "CAPEX do equipamento",
        LABEL_OTHER_CAC => "Outros custos de aquisição",
        LABEL_USEFUL_LIFE => "Vida útil do equipamento (meses)",
        READOUT_HEADING => "Valores Calculados",
        READOUT_RETENTION => "Tempo Médio de Retenção",
        READOUT_MONTHS => "meses",
        READOUT_LTV_FULL => "LTV (com depreciação)",
        READOUT_LTV_EX_DEP => "LTV (sem depreciação)",
        READOUT_CAC_FULL => "CAC Completo",
        READOUT_CAC_AMORTIZED => "CAC Amortizado",
        READOUT_CAC_EX_CAPEX => "CAC sem CAPEX",
        RESULTS_HEADING => "Resultados da Simulação",
        TABLE_SCENARIO => "Cenário",
        TABLE_RATIO => "LTV/CAC",
        CHART_TITLE => "Comparação de Cenários LTV/CAC",
        RATIO_UNDEFINED => "indefinido",
        EXPORT_SAVED => "Arquivo salvo:",
        FORMULA_LTV_HEADING => "Fórmula do LTV",
        FORMULA_LTV => "LTV = Ticket Médio Mensal × Margem Bruta × (1 / Churn Rate Mensal)",
        FORMULA_LTV_WHERE => {
            "• Ticket Médio Mensal: valor médio pago pelo cliente por mês.\n\
             • Margem Bruta: pode considerar ou não a depreciação dos equipamentos.\n\
             • Churn Rate Mensal: taxa de cancelamento mensal dos clientes."
        }
        FORMULA_CAC_HEADING => "Fórmula do CAC Amortizado",
        FORMULA_CAC => {
            "CAC amortizado = (CAPEX do Equipamento / Vida Útil (meses) × Tempo Médio de Retenção) + Outros Custos de Aquisição"
        }
        FORMULA_CAC_WHERE => {
            "• CAPEX do Equipamento: custo total do equipamento instalado.\n\
             • Vida Útil (meses): período em que o equipamento é depreciado.\n\
             • Tempo Médio de Retenção: calculado como 1 / Churn Rate Mensal.\n\
             • Outros Custos de Aquisição: marketing, vendas, etc."
        }
        GUI_SETTINGS => "Configurações",
        GUI_LANGUAGE => "Idioma",
        GUI_ALPHA => "Transparência da janela",
        GUI_SAVE => "Salvar configurações",
        GUI_SAVED => "Salvo.",
        GUI_EXPORT_CSV => "Exportar CSV",
        GUI_RESET => "Restaurar padrões",
        GUI_SHOW_FORMULAS => "Mostrar fórmulas",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting simulator.",
        APP_TITLE => "LTV/CAC Scenario Simulator",
        INTERACTIVE_HEADING => "\n=== LTV/CAC Scenario Simulator ===",
        INTERACTIVE_HINT => "Press Enter to keep the value in brackets.",
        PROMPT_AGAIN => "Simulate another scenario? (y/N): ",
        ERROR_INVALID_NUMBER => "Please enter a number.",
        ERROR_INVALID_INPUT => "Invalid parameter",
        SIDEBAR_HEADING => "Input Parameters",
        LABEL_REVENUE => "Average monthly ticket",
        LABEL_MARGIN_FULL => "Full gross margin (%)",
        LABEL_MARGIN_EX_DEP => "Gross margin excl. depreciation (%)",
        LABEL_CHURN => "Monthly churn rate (%)",
        LABEL_CAPEX => "Equipment CAPEX",
        LABEL_OTHER_CAC => "Other acquisition costs",
        LABEL_USEFUL_LIFE => "Equipment useful life (months)",
        READOUT_HEADING => "Calculated Values",
        READOUT_RETENTION => "Average Retention Time",
        READOUT_MONTHS => "months",
        READOUT_LTV_FULL => "LTV (with depreciation)",
        READOUT_LTV_EX_DEP => "LTV (without depreciation)",
        READOUT_CAC_FULL => "Full CAC",
        READOUT_CAC_AMORTIZED => "Amortized CAC",
        READOUT_CAC_EX_CAPEX => "CAC without CAPEX",
        RESULTS_HEADING => "Simulation Results",
        TABLE_SCENARIO => "Scenario",
        CHART_TITLE => "LTV/CAC Scenario Comparison",
        RATIO_UNDEFINED => "undefined",
        EXPORT_SAVED => "File saved:",
        FORMULA_LTV_HEADING => "LTV formula",
        FORMULA_LTV => "LTV = Average Monthly Ticket × Gross Margin × (1 / Monthly Churn Rate)",
        FORMULA_LTV_WHERE => {
            "• Average Monthly Ticket: average amount a customer pays per month.\n\
             • Gross Margin: may or may not include equipment depreciation.\n\
             • Monthly Churn Rate: monthly customer cancellation rate."
        }
        FORMULA_CAC_HEADING => "Amortized CAC formula",
        FORMULA_CAC => {
            "Amortized CAC = (Equipment CAPEX / Useful Life (months) × Average Retention Time) + Other Acquisition Costs"
        }
        FORMULA_CAC_WHERE => {
            "• Equipment CAPEX: total cost of the installed equipment.\n\
             • Useful Life (months): period over which the equipment is depreciated.\n\
             • Average Retention Time: 1 / Monthly Churn Rate.\n\
             • Other Acquisition Costs: marketing, sales, etc."
        }
        GUI_SETTINGS => "Settings",
        GUI_LANGUAGE => "Language",
        GUI_ALPHA => "Window transparency",
        GUI_SAVE => "Save settings",
        GUI_SAVED => "Saved.",
        GUI_EXPORT_CSV => "Export CSV",
        GUI_RESET => "Reset to defaults",
        GUI_SHOW_FORMULAS => "Show formulas",
        _ => return None,
    })
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        APP_TITLE => "LTV/CAC 시나리오 시뮬레이터",
        INTERACTIVE_HEADING => "\n=== LTV/CAC 시나리오 시뮬레이터 ===",
        INTERACTIVE_HINT => "엔터를 누르면 괄호 안의 값을 유지합니다.",
        PROMPT_AGAIN => "다른 시나리오를 계산할까요? (y/N): ",
        ERROR_INVALID_NUMBER => "숫자를 입력하세요.",
        ERROR_INVALID_INPUT => "입력값 오류",
        SIDEBAR_HEADING => "입력 파라미터",
        LABEL_REVENUE => "월 평균 객단가",
        LABEL_MARGIN_FULL => "매출총이익률(감가상각 포함, %)",
        LABEL_MARGIN_EX_DEP => "매출총이익률(감가상각 제외, %)",
        LABEL_CHURN => "월 이탈률(%)",
        LABEL_CAPEX => "장비 CAPEX",
        LABEL_OTHER_CAC => "기타 획득 비용",
        LABEL_USEFUL_LIFE => "장비 내용연수(개월)",
        READOUT_HEADING => "계산값",
        READOUT_RETENTION => "평균 유지 기간",
        READOUT_MONTHS => "개월",
        READOUT_LTV_FULL => "LTV(감가상각 포함)",
        READOUT_LTV_EX_DEP => "LTV(감가상각 제외)",
        READOUT_CAC_FULL => "CAC 전체",
        READOUT_CAC_AMORTIZED => "CAC 상각",
        READOUT_CAC_EX_CAPEX => "CAC(CAPEX 제외)",
        RESULTS_HEADING => "시뮬레이션 결과",
        TABLE_SCENARIO => "시나리오",
        CHART_TITLE => "LTV/CAC 시나리오 비교",
        RATIO_UNDEFINED => "정의되지 않음",
        EXPORT_SAVED => "저장됨:",
        GUI_SETTINGS => "설정",
        GUI_LANGUAGE => "언어",
        GUI_ALPHA => "창 투명도",
        GUI_SAVE => "설정 저장",
        GUI_SAVED => "저장되었습니다.",
        GUI_EXPORT_CSV => "CSV 내보내기",
        GUI_RESET => "기본값 복원",
        GUI_SHOW_FORMULAS => "공식 보기",
        _ => return None,
    })
}
