#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::FileDialog;
use std::{env, fs, path::Path};
use ltv_cac_simulator::{
    config, i18n,
    i18n::keys,
    report,
    scenario::{self, ScenarioBreakdown, ScenarioError, ScenarioInput, ScenarioKind},
};
use tracing::{debug, info, warn};

/// 막대 색상(시나리오 순서와 동일).
const BAR_COLORS: [egui::Color32; 6] = [
    egui::Color32::from_rgb(39, 80, 155),
    egui::Color32::from_rgb(252, 229, 0),
    egui::Color32::from_rgb(234, 75, 107),
    egui::Color32::from_rgb(239, 125, 0),
    egui::Color32::from_rgb(60, 175, 175),
    egui::Color32::from_rgb(173, 226, 93),
];

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/pt-br/en-us/ko-kr)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(1100.0, 760.0))
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let mut app_cfg = config::load_or_default().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed, using defaults");
        config::Config::default()
    });
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }
    eframe::run_native(
        "LTV/CAC Simulator",
        options,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx) {
                debug!("{e}");
            }
            Box::new(GuiApp::new(app_cfg))
        }),
    )
}

fn decode_rgba(path: &Path) -> Option<([usize; 2], Vec<u8>)> {
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let (w, h) = img.dimensions();
    Some(([w as usize, h as usize], img.to_rgba8().into_raw()))
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().map(Path::new).find(|p| p.exists())?;
    let ([w, h], rgba) = decode_rgba(path)?;
    Some(egui::IconData {
        rgba,
        width: w as u32,
        height: h as u32,
    })
}

fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(name.to_string(), egui::FontData::from_owned(bytes));
    // 기본 라틴 폰트 뒤에 붙여 한글만 대체 글꼴로 그린다.
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(name.to_string());
    }
    ctx.set_fonts(fonts);
}

/// 한글 표시용 대체 폰트를 찾는다. 없으면 기본 폰트를 유지한다.
fn setup_fonts(ctx: &egui::Context) -> Result<(), String> {
    let mut candidates = vec![Path::new("assets/fonts/malgun.ttf").to_path_buf()];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        candidates.extend(["malgun.ttf", "gulim.ttc"].iter().map(|f| fonts.join(f)));
    }
    candidates.push(Path::new("/usr/share/fonts/truetype/nanum/NanumGothic.ttf").to_path_buf());
    for p in candidates {
        if p.exists() {
            let bytes = fs::read(&p)
                .map_err(|e| format!("Failed to read font ({}): {e}", p.display()))?;
            apply_font_bytes(ctx, bytes, "cjk_fallback");
            return Ok(());
        }
    }
    Err("CJK fallback font not found; using default fonts.".into())
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    lang_input: String,
    lang_save_status: Option<String>,
    window_alpha: f32,
    show_settings_modal: bool,
    show_formulas: bool,
    // 입력(퍼센트 항목은 0~100)
    revenue: f64,
    margin_full_pct: f64,
    margin_ex_dep_pct: f64,
    churn_pct: f64,
    capex: f64,
    other_cac: f64,
    useful_life: f64,
    export_status: Option<String>,
    signature: Option<egui::TextureHandle>,
    signature_checked: bool,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        info!(lang = %lang_code, "GUI language resolved");
        let mut s = Self {
            lang_input: config.language.clone(),
            lang_save_status: None,
            window_alpha: config.window_alpha.clamp(0.3, 1.0),
            show_settings_modal: false,
            show_formulas: true,
            revenue: 0.0,
            margin_full_pct: 0.0,
            margin_ex_dep_pct: 0.0,
            churn_pct: 0.0,
            capex: 0.0,
            other_cac: 0.0,
            useful_life: 0.0,
            export_status: None,
            signature: None,
            signature_checked: false,
            tr,
            config,
        };
        s.load_inputs(s.config.scenario);
        s
    }

    fn load_inputs(&mut self, input: ScenarioInput) {
        self.revenue = input.average_monthly_revenue;
        self.margin_full_pct = input.gross_margin_full * 100.0;
        self.margin_ex_dep_pct = input.gross_margin_ex_depreciation * 100.0;
        self.churn_pct = input.monthly_churn_rate * 100.0;
        self.capex = input.equipment_capex;
        self.other_cac = input.other_acquisition_cost;
        self.useful_life = input.equipment_useful_life_months;
    }

    fn scenario_input(&self) -> ScenarioInput {
        ScenarioInput::from_percentages(
            self.revenue,
            self.margin_full_pct,
            self.margin_ex_dep_pct,
            self.churn_pct,
            self.capex,
            self.other_cac,
            self.useful_life,
        )
    }

    fn txt(&self, key: &str) -> String {
        self.tr.t(key).into_owned()
    }

    fn money(&self, v: f64) -> String {
        format!("{} {}", self.config.money_prefix, report::format_money(v))
    }

    fn ensure_signature(&mut self, ctx: &egui::Context) {
        if self.signature_checked {
            return;
        }
        self.signature_checked = true;
        let Some(path) = self.config.signature_image.as_deref() else {
            return;
        };
        match decode_rgba(Path::new(path)) {
            Some((size, rgba)) => {
                let img = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
                self.signature = Some(ctx.load_texture("signature", img, Default::default()));
            }
            None => warn!(path, "signature image could not be loaded"),
        }
    }

    fn ui_inputs(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = |key: &str| tr.t(key).into_owned();
        let prefix = self.config.money_prefix.clone();
        ui.heading(txt(keys::SIDEBAR_HEADING));
        ui.add_space(6.0);
        let money_label = |key: &str| format!("{} ({prefix})", txt(key));

        ui.label(money_label(keys::LABEL_REVENUE));
        ui.add(egui::DragValue::new(&mut self.revenue).speed(10.0).clamp_range(0.0..=f64::MAX));
        ui.label(txt(keys::LABEL_MARGIN_FULL));
        ui.add(
            egui::DragValue::new(&mut self.margin_full_pct)
                .speed(0.1)
                .clamp_range(0.0..=100.0)
                .max_decimals(2),
        );
        ui.label(txt(keys::LABEL_MARGIN_EX_DEP));
        ui.add(
            egui::DragValue::new(&mut self.margin_ex_dep_pct)
                .speed(0.1)
                .clamp_range(0.0..=100.0)
                .max_decimals(2),
        );
        ui.label(txt(keys::LABEL_CHURN));
        ui.add(
            egui::DragValue::new(&mut self.churn_pct)
                .speed(0.01)
                .clamp_range(0.01..=50.0)
                .max_decimals(2),
        );
        ui.label(money_label(keys::LABEL_CAPEX));
        ui.add(egui::DragValue::new(&mut self.capex).speed(10.0).clamp_range(0.0..=f64::MAX));
        ui.label(money_label(keys::LABEL_OTHER_CAC));
        ui.add(egui::DragValue::new(&mut self.other_cac).speed(10.0).clamp_range(0.0..=f64::MAX));
        ui.label(txt(keys::LABEL_USEFUL_LIFE));
        ui.add(egui::DragValue::new(&mut self.useful_life).speed(1.0).clamp_range(1.0..=600.0));
    }

    fn ui_readouts(&self, ui: &mut egui::Ui, breakdown: &ScenarioBreakdown) {
        let txt = |key: &str| self.txt(key);
        ui.heading(txt(keys::READOUT_HEADING));
        egui::Grid::new("readout_grid")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label(txt(keys::READOUT_RETENTION));
                ui.strong(format!(
                    "{} {}",
                    report::format_months(breakdown.retention_months),
                    txt(keys::READOUT_MONTHS)
                ));
                ui.end_row();
                for (key, value) in [
                    (keys::READOUT_LTV_FULL, breakdown.value_full),
                    (keys::READOUT_LTV_EX_DEP, breakdown.value_ex_depreciation),
                    (keys::READOUT_CAC_FULL, breakdown.cost_full),
                    (keys::READOUT_CAC_AMORTIZED, breakdown.cost_amortized),
                    (keys::READOUT_CAC_EX_CAPEX, breakdown.cost_ex_capex),
                ] {
                    ui.label(txt(key));
                    ui.strong(self.money(value));
                    ui.end_row();
                }
            });
    }

    fn ui_formulas(&self, ui: &mut egui::Ui) {
        let txt = |key: &str| self.txt(key);
        egui::CollapsingHeader::new(txt(keys::GUI_SHOW_FORMULAS))
            .default_open(self.show_formulas)
            .show(ui, |ui| {
                ui.style_mut().wrap = Some(true);
                ui.strong(txt(keys::FORMULA_LTV_HEADING));
                ui.monospace(txt(keys::FORMULA_LTV));
                ui.label(txt(keys::FORMULA_LTV_WHERE));
                ui.add_space(6.0);
                ui.strong(txt(keys::FORMULA_CAC_HEADING));
                ui.monospace(txt(keys::FORMULA_CAC));
                ui.label(txt(keys::FORMULA_CAC_WHERE));
            });
    }

    fn ui_results(&self, ui: &mut egui::Ui, ratios: &[(ScenarioKind, Result<f64, ScenarioError>)]) {
        let txt = |key: &str| self.txt(key);
        ui.heading(txt(keys::RESULTS_HEADING));
        egui::Grid::new("results_grid")
            .num_columns(2)
            .striped(true)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.strong(txt(keys::TABLE_SCENARIO));
                ui.strong(txt(keys::TABLE_RATIO));
                ui.end_row();
                for (kind, ratio) in ratios {
                    ui.label(kind.label());
                    match ratio {
                        Ok(v) => ui.label(report::format_ratio(*v)),
                        Err(e) => ui
                            .colored_label(ui.visuals().warn_fg_color, txt(keys::RATIO_UNDEFINED))
                            .on_hover_text(e.to_string()),
                    };
                    ui.end_row();
                }
            });
    }

    fn ui_chart(&self, ui: &mut egui::Ui, ratios: &[(ScenarioKind, Result<f64, ScenarioError>)]) {
        ui.heading(self.txt(keys::CHART_TITLE));
        let values: Vec<Option<f64>> = ratios.iter().map(|(_, r)| r.as_ref().ok().copied()).collect();
        let heights = bar_heights(&values);

        let size = egui::vec2(ui.available_width().max(300.0), 300.0);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().strong_text_color();
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            ui.visuals().widgets.noninteractive.fg_stroke,
        );

        let plot_top = rect.top() + 28.0;
        let plot_height = rect.bottom() - 20.0 - plot_top;
        let slot = rect.width() / heights.len().max(1) as f32;
        let bar_width = slot * 0.6;
        for (i, (h, value)) in heights.iter().zip(&values).enumerate() {
            let x_center = rect.left() + slot * (i as f32 + 0.5);
            let base_y = rect.bottom() - 20.0;
            painter.text(
                egui::pos2(x_center, rect.bottom() - 2.0),
                egui::Align2::CENTER_BOTTOM,
                format!("{}", i + 1),
                egui::FontId::proportional(12.0),
                text_color,
            );
            let Some(v) = value else {
                painter.text(
                    egui::pos2(x_center, base_y - 4.0),
                    egui::Align2::CENTER_BOTTOM,
                    "×",
                    egui::FontId::proportional(16.0),
                    text_color,
                );
                continue;
            };
            let top_y = base_y - plot_height * *h;
            let bar = egui::Rect::from_min_max(
                egui::pos2(x_center - bar_width / 2.0, top_y),
                egui::pos2(x_center + bar_width / 2.0, base_y),
            );
            painter.rect_filled(bar, 2.0, BAR_COLORS[i % BAR_COLORS.len()]);
            painter.text(
                egui::pos2(x_center, top_y - 4.0),
                egui::Align2::CENTER_BOTTOM,
                report::format_ratio(*v),
                egui::FontId::proportional(16.0),
                text_color,
            );
        }

        ui.add_space(4.0);
        for (i, (kind, _)) in ratios.iter().enumerate() {
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(swatch, 2.0, BAR_COLORS[i % BAR_COLORS.len()]);
                ui.label(format!("{}. {}", i + 1, kind.label()));
            });
        }
    }

    fn ui_footer(&self, ui: &mut egui::Ui) {
        if self.config.footer_lines.is_empty() && self.signature.is_none() {
            return;
        }
        ui.separator();
        for line in &self.config.footer_lines {
            ui.label(line);
        }
        if let Some(tex) = &self.signature {
            ui.add(egui::Image::new(tex).max_width(120.0));
        }
    }

    fn export_csv(&mut self, input: &ScenarioInput) {
        let csv = input
            .validate()
            .and_then(|_| scenario::compute_breakdown(input))
            .map_err(|e| e.to_string())
            .and_then(|b| report::render_csv(&b).map_err(|e| e.to_string()));
        let csv = match csv {
            Ok(csv) => csv,
            Err(e) => {
                self.export_status = Some(format!("{}: {e}", self.txt(keys::ERROR_PREFIX)));
                return;
            }
        };
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("ltv_cac.csv")
            .save_file()
        else {
            return;
        };
        self.export_status = Some(match fs::write(&path, csv) {
            Ok(()) => {
                info!(path = %path.display(), "CSV exported");
                format!("{} {}", self.txt(keys::EXPORT_SAVED), path.display())
            }
            Err(e) => {
                warn!(error = %e, "CSV export failed");
                format!("{}: {e}", self.txt(keys::ERROR_PREFIX))
            }
        });
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let tr = self.tr.clone();
        let txt = |key: &str| tr.t(key).into_owned();
        let mut open = self.show_settings_modal;
        egui::Window::new(txt(keys::GUI_SETTINGS))
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(txt(keys::GUI_LANGUAGE));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(&self.lang_input)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.lang_input, "auto".into(), "auto");
                        ui.selectable_value(&mut self.lang_input, "pt-br".into(), "Português (BR)");
                        ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                        ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                    });
                ui.separator();
                ui.label(txt(keys::GUI_ALPHA));
                ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                ui.separator();
                if ui.button(txt(keys::GUI_SAVE)).clicked() {
                    self.config.language = self.lang_input.clone();
                    self.config.window_alpha = self.window_alpha;
                    self.config.scenario = self.scenario_input();
                    let resolved = i18n::resolve_language(&self.config.language, None);
                    self.tr = i18n::Translator::new_with_pack(
                        &resolved,
                        self.config.language_pack_dir.as_deref(),
                    );
                    self.lang_save_status = Some(match self.config.save() {
                        Ok(()) => self.txt(keys::GUI_SAVED),
                        Err(e) => format!("{}: {e}", self.txt(keys::ERROR_PREFIX)),
                    });
                }
                if let Some(msg) = &self.lang_save_status {
                    ui.label(msg);
                }
            });
        self.show_settings_modal = open;
    }
}

/// 막대 높이를 0~1로 정규화한다. 가장 큰 막대 위에 값 라벨 자리를 남기도록 최대값의 1.15배를 1로 본다.
fn bar_heights(values: &[Option<f64>]) -> Vec<f32> {
    let max = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    values
        .iter()
        .map(|v| match v {
            Some(v) if max > 0.0 && v.is_finite() && *v > 0.0 => (*v / (max * 1.15)) as f32,
            _ => 0.0,
        })
        .collect()
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.ensure_signature(ctx);

        let mut style = (*ctx.style()).clone();
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        let tr = self.tr.clone();
        let txt = |key: &str| tr.t(key).into_owned();
        let input = self.scenario_input();
        let validation = input.validate();
        let breakdown = validation.and_then(|_| scenario::compute_breakdown(&input));
        let ratios: Vec<(ScenarioKind, Result<f64, ScenarioError>)> = match &breakdown {
            Ok(b) => Vec::from(b.ratios()),
            Err(_) => Vec::new(),
        };

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(txt(keys::APP_TITLE));
                ui.separator();
                if ui.button(txt(keys::GUI_SETTINGS)).clicked() {
                    self.show_settings_modal = true;
                }
                if ui.button(txt(keys::GUI_EXPORT_CSV)).clicked() {
                    self.export_csv(&input);
                }
                if ui.button(txt(keys::GUI_RESET)).clicked() {
                    self.load_inputs(ScenarioInput::default());
                }
                if let Some(msg) = &self.export_status {
                    ui.label(msg);
                }
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        egui::SidePanel::left("inputs")
            .resizable(true)
            .min_width(220.0)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.ui_inputs(ui);
                    ui.separator();
                    match &breakdown {
                        Ok(b) => self.ui_readouts(ui, b),
                        Err(e) => {
                            ui.colored_label(
                                ui.visuals().error_fg_color,
                                format!("{}: {e}", txt(keys::ERROR_INVALID_INPUT)),
                            );
                        }
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    self.ui_formulas(ui);
                    ui.separator();
                    if !ratios.is_empty() {
                        self.ui_results(ui, &ratios);
                        ui.add_space(12.0);
                        self.ui_chart(ui, &ratios);
                    }
                    self.ui_footer(ui);
                });
        });
    }
}
