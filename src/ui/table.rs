use eframe::egui::{self, ScrollArea, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use chart_studio::ChartState;

use super::UiState;

const ROW_HEIGHT: f32 = 22.0;
const HEADER_HEIGHT: f32 = 26.0;

/// A spreadsheet edit collected during layout and applied afterwards.
enum Edit {
    Cell { row: usize, column: String, text: String },
    AddRow,
    DeleteRow(usize),
    AddColumn,
    DeleteColumn(String),
    RenameColumn { old: String, new: String },
}

// ---------------------------------------------------------------------------
// Spreadsheet editor
// ---------------------------------------------------------------------------

/// Editable grid over the current dataset. Cells commit on focus loss.
pub fn spreadsheet(ui: &mut Ui, state: &mut ChartState, view: &mut UiState) {
    let Some(dataset) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };
    view.sync_drafts(state.revision(), dataset);

    let columns = dataset.columns().to_vec();
    let n_rows = dataset.len();
    let mut edit = None;

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Add row").clicked() {
            edit = Some(Edit::AddRow);
        }
        if ui.button("Add column").clicked() {
            edit = Some(Edit::AddColumn);
        }
        ui.weak(format!("{n_rows} rows × {} columns", columns.len()));
    });
    ui.separator();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::exact(56.0))
        .columns(Column::initial(110.0).at_least(60.0).clip(true), columns.len())
        .header(HEADER_HEIGHT, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for (c, name) in columns.iter().enumerate() {
                header.col(|ui: &mut Ui| {
                    let draft = &mut view.header_drafts[c];
                    let resp = ui.add(TextEdit::singleline(draft).desired_width(72.0));
                    if resp.lost_focus() && draft.trim() != name.as_str() {
                        edit = Some(Edit::RenameColumn {
                            old: name.clone(),
                            new: draft.clone(),
                        });
                    }
                    if ui.small_button("✖").on_hover_text("Delete column").clicked() {
                        edit = Some(Edit::DeleteColumn(name.clone()));
                    }
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, n_rows, |mut row| {
                let r = row.index();
                row.col(|ui: &mut Ui| {
                    if ui.small_button("✖").on_hover_text("Delete row").clicked() {
                        edit = Some(Edit::DeleteRow(r));
                    }
                    ui.label((r + 1).to_string());
                });
                for (c, name) in columns.iter().enumerate() {
                    row.col(|ui: &mut Ui| {
                        let original = dataset
                            .cell(r, name)
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        let draft = view
                            .cell_drafts
                            .entry((r, c))
                            .or_insert_with(|| original.clone());
                        let resp = ui.add(TextEdit::singleline(draft).frame(false));
                        if resp.lost_focus() && *draft != original {
                            edit = Some(Edit::Cell {
                                row: r,
                                column: name.clone(),
                                text: draft.clone(),
                            });
                        }
                    });
                }
            });
        });

    let Some(edit) = edit else {
        return;
    };
    let result = match edit {
        Edit::Cell { row, column, text } => state.edit_cell(row, &column, &text),
        Edit::AddRow => state.add_row(),
        Edit::DeleteRow(row) => state.delete_row(row),
        Edit::AddColumn => state.add_column().map(|name| log::debug!("Added column {name}")),
        Edit::DeleteColumn(column) => state.delete_column(&column),
        Edit::RenameColumn { old, new } => state.rename_column(&old, &new),
    };
    if let Err(e) = result {
        log::warn!("Edit rejected: {e}");
        state.status_message = Some(format!("Error: {e}"));
        // Put the rejected header text back.
        if let Some(ds) = state.dataset() {
            view.header_drafts = ds.columns().to_vec();
        }
    }
}

// ---------------------------------------------------------------------------
// Text editor
// ---------------------------------------------------------------------------

/// Free-text view of the dataset. Every keystroke re-parses; parse errors
/// keep the last good dataset and the buffer as typed.
pub fn text_editor(ui: &mut Ui, state: &mut ChartState, view: &mut UiState) {
    view.sync_text(state);

    ui.label("One row per line, header first. Fields are separated by the configured delimiter.");
    ui.separator();

    let resp = ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add(
                TextEdit::multiline(&mut view.text_draft)
                    .code_editor()
                    .desired_width(f32::INFINITY)
                    .desired_rows(24)
                    .lock_focus(true),
            )
        })
        .inner;

    if resp.changed() && state.apply_text(&view.text_draft).is_ok() {
        view.text_applied(state.revision());
    }

    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        view.reload_text(state);
    }
}
