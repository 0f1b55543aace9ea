use crate::error::{ChartError, ChartResult};

/// Number of series selected when nothing from the previous selection
/// survives a dataset replacement.
pub const DEFAULT_SERIES_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Carry a selection over to a new set of available columns.
///
/// * Entries of `previous` that still exist survive, in `previous` order.
/// * If none survive, the first `min(3, available.len())` available
///   columns are selected in their natural order.
pub fn reconcile_selection(available: &[String], previous: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(previous.len());
    for col in previous {
        if available.contains(col) && !kept.contains(col) {
            kept.push(col.clone());
        }
    }

    if kept.is_empty() {
        available
            .iter()
            .take(DEFAULT_SERIES_COUNT.min(available.len()))
            .cloned()
            .collect()
    } else {
        kept
    }
}

// ---------------------------------------------------------------------------
// ColumnSelection
// ---------------------------------------------------------------------------

/// The plottable columns and the ordered subset chosen for display.
///
/// `selected` is always a duplicate-free subset of `available`; it only
/// changes through [`ColumnSelection::reconcile`], [`ColumnSelection::toggle`]
/// and [`ColumnSelection::rename`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    available: Vec<String>,
    selected: Vec<String>,
}

impl ColumnSelection {
    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.selected.iter().any(|c| c == column)
    }

    /// Replace the available columns and re-derive the selection from the
    /// current one. Run on every dataset replacement.
    pub fn reconcile(&mut self, available: Vec<String>) {
        self.selected = reconcile_selection(&available, &self.selected);
        self.available = available;
        log::debug!("Selection reconciled to {:?}", self.selected);
    }

    /// Remove `column` if selected, otherwise append it.
    pub fn toggle(&mut self, column: &str) -> ChartResult<()> {
        if !self.available.iter().any(|c| c == column) {
            return Err(ChartError::UnknownColumn(column.to_string()));
        }
        if let Some(pos) = self.selected.iter().position(|c| c == column) {
            self.selected.remove(pos);
        } else {
            self.selected.push(column.to_string());
        }
        Ok(())
    }

    /// Follow a column rename so the renamed column keeps its slot.
    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        for col in self.available.iter_mut().chain(self.selected.iter_mut()) {
            if col == old {
                *col = new.to_string();
            }
        }
    }
}
