use std::collections::HashMap;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use chart_studio::{ChartState, ImageFormat, LineInterpolation, ThemeCatalog};

use super::{Command, Tab, UiState, color32};

// ---------------------------------------------------------------------------
// Left side panel – chart options
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut ChartState) {
    ui.heading("Chart");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Labels ----
            if let Some(title) = text_field(ui, "Title", &state.config().title) {
                state.configure(|c| c.set_title(title));
            }
            if let Some(label) = text_field(ui, "X axis label", &state.config().x_axis_label) {
                state.configure(|c| c.set_x_axis_label(label));
            }
            if let Some(label) = text_field(ui, "Y axis label", &state.config().y_axis_label) {
                state.configure(|c| c.set_y_axis_label(label));
            }
            ui.separator();

            // ---- Style ----
            ui.strong("Theme");
            let current_theme = state.config().theme().to_string();
            egui::ComboBox::from_id_salt("theme")
                .selected_text(&current_theme)
                .show_ui(ui, |ui: &mut Ui| {
                    for name in ThemeCatalog::names() {
                        if ui.selectable_label(current_theme == name, name).clicked() {
                            state.configure(|c| c.set_theme(name));
                        }
                    }
                });
            palette_strip(ui, &current_theme);

            ui.strong("Line style");
            let current_mode = state.config().interpolation;
            egui::ComboBox::from_id_salt("interpolation")
                .selected_text(current_mode.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for mode in LineInterpolation::ALL {
                        if ui.selectable_label(current_mode == mode, mode.label()).clicked() {
                            state.configure(|c| c.interpolation = mode);
                        }
                    }
                });

            let mut show_points = state.config().show_points;
            if ui.checkbox(&mut show_points, "Show data points").changed() {
                state.configure(|c| c.set_show_points(show_points));
            }
            let mut fill = state.config().fill_area;
            if ui.checkbox(&mut fill, "Fill area").changed() {
                state.configure(|c| c.set_fill_area(fill));
            }
            ui.separator();

            // ---- Values ----
            values_section(ui, state);
            ui.separator();

            // ---- Columns ----
            let Some(dataset) = state.dataset() else {
                ui.label("No dataset loaded.");
                return;
            };
            let columns = dataset.columns().to_vec();

            ui.strong("Category axis");
            let category = state.category_column().unwrap_or_default().to_string();
            egui::ComboBox::from_id_salt("category")
                .selected_text(&category)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(category == *col, col).clicked() {
                            if let Err(e) = state.set_category_column(col) {
                                log::warn!("{e}");
                            }
                        }
                    }
                });

            ui.strong("Series");
            let swatches: HashMap<String, Color32> = state
                .current_render_plan()
                .map(|plan| {
                    plan.series
                        .iter()
                        .map(|s| (s.column.clone(), color32(s.color)))
                        .collect()
                })
                .unwrap_or_default();
            let available = state.selection().available().to_vec();
            if available.is_empty() {
                ui.weak("No plottable columns.");
            }
            for col in &available {
                let mut checked = state.selection().is_selected(col);
                let mut text = RichText::new(col);
                if let Some(c) = swatches.get(col) {
                    text = text.color(*c);
                }
                if ui.checkbox(&mut checked, text).changed() {
                    if let Err(e) = state.toggle_column(col) {
                        log::warn!("{e}");
                    }
                }
            }
        });
}

fn values_section(ui: &mut Ui, state: &mut ChartState) {
    ui.strong("Values");
    let mut t = state.config().transforms;
    let mut changed = ui.checkbox(&mut t.normalize, "Normalize (0–1)").changed();
    changed |= ui.checkbox(&mut t.cumulative, "Cumulative").changed();
    changed |= ui.checkbox(&mut t.percentage, "Percent of total").changed();

    let mut window = t.moving_average.unwrap_or(0);
    let mut smooth = window >= 2;
    ui.horizontal(|ui: &mut Ui| {
        if ui.checkbox(&mut smooth, "Moving average").changed() {
            window = if smooth { 3 } else { 0 };
            changed = true;
        }
        if smooth
            && ui
                .add(egui::DragValue::new(&mut window).range(2..=60).suffix(" rows"))
                .changed()
        {
            changed = true;
        }
    });
    if changed {
        state.configure(|c| {
            c.transforms = t;
            c.set_moving_average(window);
        });
    }

    let mut log_scale = state.config().log_scale;
    if ui.checkbox(&mut log_scale, "Log scale").changed() {
        state.configure(|c| c.set_log_scale(log_scale));
    }
}

/// A labelled single-line edit; returns the new text when it changed.
fn text_field(ui: &mut Ui, label: &str, current: &str) -> Option<String> {
    ui.label(label);
    let mut text = current.to_string();
    ui.text_edit_singleline(&mut text).changed().then_some(text)
}

fn palette_strip(ui: &mut Ui, theme: &str) {
    let theme = ThemeCatalog::get(theme);
    ui.horizontal(|ui: &mut Ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        for c in &theme.colors {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 10.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color32(*c));
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns the command picked, if any.
pub fn top_bar(ui: &mut Ui, state: &ChartState, view: &mut UiState) -> Option<Command> {
    let mut command = None;
    let has_data = state.dataset().is_some();

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                command = Some(Command::OpenFile);
                ui.close_menu();
            }
            if ui.button("Load sample data").clicked() {
                command = Some(Command::LoadSample);
                ui.close_menu();
            }
        });

        ui.menu_button("Export", |ui: &mut Ui| {
            if ui.add_enabled(has_data, egui::Button::new("CSV…")).clicked() {
                command = Some(Command::ExportCsv);
                ui.close_menu();
            }
            for format in ImageFormat::ALL {
                if ui
                    .add_enabled(has_data, egui::Button::new(format!("{format}…")))
                    .clicked()
                {
                    command = Some(Command::ExportImage(format));
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        ui.selectable_value(&mut view.tab, Tab::Chart, "Chart");
        ui.selectable_value(&mut view.tab, Tab::Spreadsheet, "Spreadsheet");
        ui.selectable_value(&mut view.tab, Tab::Text, "Text");

        ui.separator();

        if state.loading {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{} rows, {} columns, {} plotted",
                ds.len(),
                ds.columns().len(),
                state.selection().selected().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    command
}
