use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::config::ChartConfig;
use crate::data::codec::TextCodec;
use crate::data::model::{CellValue, TabularDataset};
use crate::data::selection::ColumnSelection;
use crate::error::{ChartError, ChartResult};
use crate::export::{ExportCoordinator, ImageFormat, SnapshotRenderer};
use crate::plan::{RenderPlan, build_render_plan};

// ---------------------------------------------------------------------------
// Load sequencing
// ---------------------------------------------------------------------------

/// Identifies one dataset-load attempt. Only the newest ticket may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The dataset replaced the current one.
    Applied,
    /// A newer load was started; the result was discarded.
    Stale,
}

/// Handle returned by [`ChartState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&RenderPlan)>;

// ---------------------------------------------------------------------------
// Chart state
// ---------------------------------------------------------------------------

/// The full chart state, independent of rendering.
///
/// All mutation goes through methods that re-derive the render plan
/// before returning, so [`ChartState::current_render_plan`] is always in
/// step with the dataset, selection and configuration.
pub struct ChartState {
    /// Current dataset (None until the first successful load).
    dataset: Option<Arc<TabularDataset>>,

    /// Category (x axis) column of the current dataset.
    category: Option<String>,

    /// Plottable columns and the ordered selection.
    selection: ColumnSelection,

    config: ChartConfig,

    codec: TextCodec,

    /// Derived from the fields above; None while there is no dataset.
    plan: Option<RenderPlan>,

    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,

    /// Newest load ticket handed out.
    latest_load: u64,

    /// Number of dataset replacements so far.
    revision: u64,

    /// Whether a load is in flight.
    pub loading: bool,

    /// Recoverable notice shown in the UI (parse errors, failed loads).
    pub status_message: Option<String>,
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new(ChartConfig::default(), TextCodec::default())
    }
}

impl ChartState {
    pub fn new(config: ChartConfig, codec: TextCodec) -> Self {
        Self {
            dataset: None,
            category: None,
            selection: ColumnSelection::default(),
            config,
            codec,
            plan: None,
            listeners: Vec::new(),
            next_subscription: 0,
            latest_load: 0,
            revision: 0,
            loading: false,
            status_message: None,
        }
    }

    // -- Accessors --

    pub fn dataset(&self) -> Option<&TabularDataset> {
        self.dataset.as_deref()
    }

    pub fn category_column(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    /// The plan for the current state (pull side of change notification).
    pub fn current_render_plan(&self) -> Option<&RenderPlan> {
        self.plan.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -- Change notification --

    /// Call `listener` with every new plan, in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&RenderPlan) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Re-derive the plan and notify listeners if it changed.
    fn refresh(&mut self) {
        let next = match (&self.dataset, &self.category) {
            (Some(ds), Some(cat)) => Some(build_render_plan(
                ds,
                cat,
                self.selection.selected(),
                &self.config,
            )),
            _ => None,
        };
        if next == self.plan {
            return;
        }
        self.plan = next;
        if let Some(plan) = &self.plan {
            for (_, listener) in &mut self.listeners {
                listener(plan);
            }
        }
    }

    // -- Dataset replacement --

    /// Replace the dataset wholesale and reconcile the selection.
    pub fn set_dataset(&mut self, dataset: TabularDataset) {
        let category = match &self.category {
            Some(c) if dataset.has_column(c) => c.clone(),
            _ => dataset.columns()[0].clone(),
        };
        self.selection.reconcile(dataset.plottable_columns(&category));

        log::info!(
            "Dataset replaced: {} rows, columns {:?}, category {category:?}",
            dataset.len(),
            dataset.columns()
        );

        self.category = Some(category);
        self.dataset = Some(Arc::new(dataset));
        self.revision += 1;
        self.status_message = None;
        self.refresh();
    }

    /// Ingest structured rows. On failure the previous dataset stays.
    pub fn load_rows(&mut self, rows: Vec<Map<String, JsonValue>>) -> ChartResult<()> {
        let dataset = self.recoverable(TabularDataset::from_rows(rows))?;
        self.set_dataset(dataset);
        Ok(())
    }

    /// Parse edited text. On failure the previous dataset stays.
    pub fn apply_text(&mut self, text: &str) -> ChartResult<()> {
        let dataset = self.recoverable(self.codec.parse_text(text))?;
        self.set_dataset(dataset);
        Ok(())
    }

    /// The current dataset as delimited text, for the text editor.
    pub fn source_text(&self) -> ChartResult<String> {
        match self.dataset() {
            Some(ds) => self.codec.serialize(ds),
            None => Ok(String::new()),
        }
    }

    fn recoverable<T>(&mut self, result: ChartResult<T>) -> ChartResult<T> {
        if let Err(e) = &result {
            log::warn!("Keeping previous dataset: {e}");
            self.status_message = Some(format!("Error: {e}"));
        }
        result
    }

    // -- Load sequencing --

    /// Start a load; any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        self.loading = true;
        LoadTicket(self.latest_load)
    }

    /// Apply the result of the load identified by `ticket`, unless a newer
    /// load has been started since.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: ChartResult<TabularDataset>,
    ) -> ChartResult<LoadOutcome> {
        if ticket.0 != self.latest_load {
            log::debug!("Discarding stale load {} (latest {})", ticket.0, self.latest_load);
            return Ok(LoadOutcome::Stale);
        }
        self.loading = false;
        let dataset = self.recoverable(result)?;
        self.set_dataset(dataset);
        Ok(LoadOutcome::Applied)
    }

    // -- Selection and configuration --

    /// Toggle a plottable column. Unknown columns leave state unchanged.
    pub fn toggle_column(&mut self, column: &str) -> ChartResult<()> {
        self.selection.toggle(column)?;
        self.refresh();
        Ok(())
    }

    /// Edit display options, then re-derive the plan.
    pub fn configure(&mut self, edit: impl FnOnce(&mut ChartConfig)) {
        edit(&mut self.config);
        self.refresh();
    }

    /// Use another column as the category axis.
    pub fn set_category_column(&mut self, column: &str) -> ChartResult<()> {
        let dataset = self
            .dataset
            .as_ref()
            .filter(|ds| ds.has_column(column))
            .ok_or_else(|| ChartError::UnknownColumn(column.to_string()))?;
        self.selection.reconcile(dataset.plottable_columns(column));
        self.category = Some(column.to_string());
        self.refresh();
        Ok(())
    }

    // -- Spreadsheet edits (copy-on-change) --

    fn current(&self) -> ChartResult<Arc<TabularDataset>> {
        self.dataset
            .clone()
            .ok_or_else(|| ChartError::InvalidEdit("no dataset loaded".to_string()))
    }

    /// Set one cell from raw text, coerced like parsed input.
    pub fn edit_cell(&mut self, row: usize, column: &str, text: &str) -> ChartResult<()> {
        let next = self.current()?.with_cell(row, column, CellValue::coerce(text))?;
        self.set_dataset(next);
        Ok(())
    }

    pub fn add_row(&mut self) -> ChartResult<()> {
        let next = self.current()?.with_row_appended();
        self.set_dataset(next);
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> ChartResult<()> {
        let next = self.current()?.without_row(row)?;
        self.set_dataset(next);
        Ok(())
    }

    /// Append an empty column and return its generated name.
    pub fn add_column(&mut self) -> ChartResult<String> {
        let (next, name) = self.current()?.with_column_appended();
        self.set_dataset(next);
        Ok(name)
    }

    pub fn delete_column(&mut self, column: &str) -> ChartResult<()> {
        let next = self.current()?.without_column(column)?;
        self.set_dataset(next);
        Ok(())
    }

    /// Rename a column; it keeps its selection slot and category role.
    pub fn rename_column(&mut self, old: &str, new: &str) -> ChartResult<()> {
        let next = self.current()?.with_column_renamed(old, new)?;
        let new = new.trim();
        self.selection.rename(old, new);
        if self.category.as_deref() == Some(old) {
            self.category = Some(new.to_string());
        }
        self.set_dataset(next);
        Ok(())
    }

    // -- Export --

    pub fn export_csv(&self) -> ChartResult<String> {
        let dataset = self.dataset().ok_or(ChartError::EmptyInput)?;
        ExportCoordinator::new(self.codec).export_csv(dataset)
    }

    pub fn export_image<R: SnapshotRenderer + ?Sized>(
        &self,
        format: &str,
        renderer: &mut R,
    ) -> anyhow::Result<ImageFormat> {
        let plan = self.plan.as_ref().ok_or(ChartError::EmptyInput)?;
        ExportCoordinator::new(self.codec).export_image(format, plan, renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn state_with(text: &str) -> ChartState {
        let mut state = ChartState::default();
        state.apply_text(text).unwrap();
        state
    }

    #[test]
    fn test_first_load_defaults_selection() {
        let state = state_with("date,a,b,c,d\n1,1,2,3,4");
        assert_eq!(state.category_column(), Some("date"));
        assert_eq!(state.selection().selected(), ["a", "b", "c"]);
        assert_eq!(state.current_render_plan().unwrap().series.len(), 3);
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_failed_parse_keeps_previous_dataset() {
        let mut state = state_with("date,a\n1,2");
        let before = state.current_render_plan().cloned();

        assert!(state.apply_text("   ").is_err());
        assert_eq!(state.dataset().unwrap().columns(), ["date", "a"]);
        assert_eq!(state.current_render_plan().cloned(), before);
        assert!(state.status_message.is_some());

        state.apply_text("date,a\n1,3").unwrap();
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_empty_rows_keep_previous_dataset() {
        let mut state = state_with("date,a\n1,2");
        let err = state.load_rows(Vec::new()).unwrap_err();
        assert!(matches!(err, ChartError::EmptyInput));
        assert_eq!(state.dataset().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut state = ChartState::default();
        let first = state.begin_load();
        let second = state.begin_load();

        let newer = TextCodec::default().parse_text("date,new\n1,1").unwrap();
        let older = TextCodec::default().parse_text("date,old\n1,1").unwrap();

        assert_eq!(state.finish_load(second, Ok(newer)).unwrap(), LoadOutcome::Applied);
        assert_eq!(state.finish_load(first, Ok(older)).unwrap(), LoadOutcome::Stale);
        assert_eq!(state.dataset().unwrap().columns(), ["date", "new"]);
        assert!(!state.loading);
    }

    #[test]
    fn test_edit_during_load_keeps_loading() {
        let mut state = state_with("date,a\n1,2");
        let ticket = state.begin_load();
        state.edit_cell(0, "a", "5").unwrap();
        state.apply_text("date,a\n1,6").unwrap();
        assert!(state.loading);

        let fetched = TextCodec::default().parse_text("date,b\n1,1").unwrap();
        assert_eq!(state.finish_load(ticket, Ok(fetched)).unwrap(), LoadOutcome::Applied);
        assert!(!state.loading);
    }

    #[test]
    fn test_failed_current_load_reports_error() {
        let mut state = state_with("date,a\n1,2");
        let ticket = state.begin_load();
        assert!(state.loading);
        let result = state.finish_load(ticket, Err(ChartError::EmptyInput));
        assert!(result.is_err());
        assert!(!state.loading);
        assert_eq!(state.dataset().unwrap().columns(), ["date", "a"]);
    }

    #[test]
    fn test_listeners_notified_on_change_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = ChartState::default();
        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |plan| sink.borrow_mut().push(plan.series.len()));

        state.apply_text("date,a,b\n1,2,3").unwrap();
        state.toggle_column("a").unwrap();
        state.configure(|c| c.set_title("Business Performance Over Time"));
        state.configure(|c| c.set_theme("dark"));
        assert_eq!(*seen.borrow(), vec![2, 1, 1]);

        assert!(state.unsubscribe(id));
        state.toggle_column("a").unwrap();
        assert_eq!(seen.borrow().len(), 3);
        assert!(!state.unsubscribe(id));
    }

    #[test]
    fn test_toggle_unknown_is_inert() {
        let mut state = state_with("date,revenue\n1,2");
        let plan = state.current_render_plan().cloned();
        assert!(matches!(
            state.toggle_column("nonexistent"),
            Err(ChartError::UnknownColumn(_))
        ));
        assert_eq!(state.selection().selected(), ["revenue"]);
        assert_eq!(state.current_render_plan().cloned(), plan);
    }

    #[test]
    fn test_category_column_choice() {
        let mut state = state_with("date,region,a\nq1,north,1");
        state.set_category_column("region").unwrap();
        assert_eq!(state.category_column(), Some("region"));
        assert_eq!(state.selection().available(), ["date", "a"]);
        assert!(state.set_category_column("nope").is_err());

        // Survives a replacement that keeps the column, resets otherwise.
        state.apply_text("date,region,a\nq2,south,2").unwrap();
        assert_eq!(state.category_column(), Some("region"));
        state.apply_text("month,a\njan,1").unwrap();
        assert_eq!(state.category_column(), Some("month"));
    }

    #[test]
    fn test_spreadsheet_edits() {
        let mut state = state_with("date,a,b\n1,2,3");

        state.edit_cell(0, "a", "42").unwrap();
        assert_eq!(state.dataset().unwrap().cell(0, "a"), Some(&CellValue::Number(42.0)));

        state.add_row().unwrap();
        assert_eq!(state.dataset().unwrap().len(), 2);
        state.delete_row(0).unwrap();
        assert_eq!(state.dataset().unwrap().cell(0, "a"), Some(&CellValue::Null));

        let name = state.add_column().unwrap();
        assert_eq!(name, "column4");
        assert!(!state.selection().is_selected("column4"));

        state.rename_column("b", "beta").unwrap();
        assert_eq!(state.selection().selected(), ["a", "beta"]);

        state.delete_column("a").unwrap();
        assert_eq!(state.selection().selected(), ["beta"]);
        assert!(state.edit_cell(9, "beta", "1").is_err());
    }

    #[test]
    fn test_rename_category_column() {
        let mut state = state_with("date,a\n1,2");
        state.rename_column("date", "month").unwrap();
        assert_eq!(state.category_column(), Some("month"));
        assert_eq!(state.selection().selected(), ["a"]);
    }

    #[test]
    fn test_edits_without_dataset_fail() {
        let mut state = ChartState::default();
        assert!(matches!(state.add_row(), Err(ChartError::InvalidEdit(_))));
        assert!(state.export_csv().is_err());
        assert_eq!(state.source_text().unwrap(), "");
    }

    #[test]
    fn test_source_text_roundtrips() {
        let state = state_with("date,a\n2023-01,5\n2023-02,");
        assert_eq!(state.source_text().unwrap(), "date,a\n2023-01,5\n2023-02,");
        assert_eq!(state.export_csv().unwrap(), state.source_text().unwrap());
    }
}
