use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::error::{ChartError, ChartResult};

// ---------------------------------------------------------------------------
// CellValue – a single scalar cell
// ---------------------------------------------------------------------------

/// A post-coercion cell: number, text or null.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Coerce raw text the way the codec does: empty → null, numeric
    /// pattern → number, anything else stays text.
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Null;
        }
        if looks_numeric(raw) {
            if let Ok(v) = raw.trim().parse::<f64>() {
                if v.is_finite() {
                    return CellValue::Number(v);
                }
            }
        }
        CellValue::Text(raw.to_string())
    }

    /// Coerce a JSON scalar coming from row-based ingestion. Strings go
    /// through [`CellValue::coerce`], so `"42"` and `""` land as they
    /// would from text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Number(n) => match n.as_f64() {
                Some(v) => CellValue::Number(v),
                None => CellValue::Text(n.to_string()),
            },
            JsonValue::String(s) => CellValue::coerce(s),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Numeric view used by the render plan; text and null are gaps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Text form used by serialization: numbers without locale formatting,
/// null as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => Ok(()),
        }
    }
}

/// Integer or decimal with optional sign and exponent, surrounding
/// whitespace allowed: `42`, `-3.5`, `.5`, `7.`, `1e6`.
pub(crate) fn looks_numeric(s: &str) -> bool {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

// ---------------------------------------------------------------------------
// Row – one record, aligned with the dataset's column list
// ---------------------------------------------------------------------------

/// One row. `cells[i]` belongs to `columns[i]` of the owning dataset, so
/// every row always carries the full key set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Build a row of exactly `width` cells: missing trailing cells are
    /// null, excess cells are dropped.
    pub(crate) fn fitted(mut cells: Vec<CellValue>, width: usize) -> Self {
        cells.resize(width, CellValue::Null);
        Row { cells }
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

// ---------------------------------------------------------------------------
// TabularDataset – the canonical, immutable dataset
// ---------------------------------------------------------------------------

/// Ordered rows plus the ordered, distinct column names.
///
/// A dataset is never mutated in place; every edit returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularDataset {
    /// Assemble a dataset, fitting every row to the column count.
    /// Callers guarantee `columns` is non-empty and distinct.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|r| Row::fitted(r.cells, width))
            .collect();
        TabularDataset { columns, rows }
    }

    /// Build from already-structured rows (e.g. a JSON API result).
    ///
    /// Column order is the key order of the first row. Rows missing one of
    /// those keys get null; keys the first row does not have are dropped.
    pub fn from_rows<I>(rows: I) -> ChartResult<Self>
    where
        I: IntoIterator<Item = Map<String, JsonValue>>,
    {
        let mut iter = rows.into_iter();
        let first = iter.next().ok_or(ChartError::EmptyInput)?;
        if first.is_empty() {
            return Err(ChartError::EmptyInput);
        }

        let columns: Vec<String> = first.keys().cloned().collect();
        let mut out = Vec::new();
        let mut filled = 0usize;
        let mut dropped = 0usize;

        for record in std::iter::once(first).chain(iter) {
            let cells = columns
                .iter()
                .map(|col| match record.get(col) {
                    Some(v) => CellValue::from_json(v),
                    None => {
                        filled += 1;
                        CellValue::Null
                    }
                })
                .collect();
            dropped += record.keys().filter(|k| !columns.contains(*k)).count();
            out.push(Row { cells });
        }

        if filled > 0 || dropped > 0 {
            log::warn!(
                "Row schema drift: {filled} missing field(s) filled with null, \
                 {dropped} unexpected field(s) dropped"
            );
        }

        Ok(TabularDataset { columns, rows: out })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows (it always has columns).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// All values of one column in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<CellValue>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r.cells[idx].clone()).collect())
    }

    /// Every column except the category column, in dataset order.
    pub fn plottable_columns(&self, category: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.as_str() != category)
            .cloned()
            .collect()
    }

    // -- Copy-on-change edits --

    /// A copy with one cell replaced.
    pub fn with_cell(&self, row: usize, column: &str, value: CellValue) -> ChartResult<Self> {
        let idx = self.require_column(column)?;
        if row >= self.rows.len() {
            return Err(ChartError::InvalidEdit(format!(
                "row {row} out of range (dataset has {} rows)",
                self.rows.len()
            )));
        }
        let mut next = self.clone();
        next.rows[row].cells[idx] = value;
        Ok(next)
    }

    /// A copy with a null row appended.
    pub fn with_row_appended(&self) -> Self {
        let mut next = self.clone();
        next.rows.push(Row::fitted(Vec::new(), self.columns.len()));
        next
    }

    /// A copy without row `row`.
    pub fn without_row(&self, row: usize) -> ChartResult<Self> {
        if row >= self.rows.len() {
            return Err(ChartError::InvalidEdit(format!("row {row} out of range")));
        }
        let mut next = self.clone();
        next.rows.remove(row);
        Ok(next)
    }

    /// A copy with a new all-null column named `columnN`.
    pub fn with_column_appended(&self) -> (Self, String) {
        let mut n = self.columns.len() + 1;
        let mut name = format!("column{n}");
        while self.has_column(&name) {
            n += 1;
            name = format!("column{n}");
        }

        let mut next = self.clone();
        next.columns.push(name.clone());
        for row in &mut next.rows {
            row.cells.push(CellValue::Null);
        }
        (next, name)
    }

    /// A copy without `column`. The last column cannot be removed.
    pub fn without_column(&self, column: &str) -> ChartResult<Self> {
        let idx = self.require_column(column)?;
        if self.columns.len() == 1 {
            return Err(ChartError::InvalidEdit(
                "cannot delete the only column".to_string(),
            ));
        }
        let mut next = self.clone();
        next.columns.remove(idx);
        for row in &mut next.rows {
            row.cells.remove(idx);
        }
        Ok(next)
    }

    /// A copy with `old` renamed to `new`.
    pub fn with_column_renamed(&self, old: &str, new: &str) -> ChartResult<Self> {
        let idx = self.require_column(old)?;
        let new = new.trim();
        if new.is_empty() {
            return Err(ChartError::InvalidEdit("column name is blank".to_string()));
        }
        if new != old && self.has_column(new) {
            return Err(ChartError::InvalidEdit(format!("column '{new}' already exists")));
        }
        let mut next = self.clone();
        next.columns[idx] = new.to_string();
        Ok(next)
    }

    fn require_column(&self, column: &str) -> ChartResult<usize> {
        self.column_index(column)
            .ok_or_else(|| ChartError::UnknownColumn(column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: JsonValue) -> Vec<Map<String, JsonValue>> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_coerce_rules() {
        assert_eq!(CellValue::coerce(""), CellValue::Null);
        assert_eq!(CellValue::coerce("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::coerce("-3.25"), CellValue::Number(-3.25));
        assert_eq!(CellValue::coerce(".5"), CellValue::Number(0.5));
        assert_eq!(CellValue::coerce("1e3"), CellValue::Number(1000.0));
        assert_eq!(CellValue::coerce("2023-01"), CellValue::Text("2023-01".into()));
        assert_eq!(CellValue::coerce("abc"), CellValue::Text("abc".into()));
        assert_eq!(CellValue::coerce("1,000"), CellValue::Text("1,000".into()));
        // Overflows to infinity, kept verbatim.
        assert_eq!(CellValue::coerce("1e999"), CellValue::Text("1e999".into()));
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("7."));
        assert!(looks_numeric(" 12 "));
        assert!(looks_numeric("+4"));
        assert!(!looks_numeric("."));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("1e"));
        assert!(!looks_numeric("12a"));
        assert!(!looks_numeric("0x10"));
    }

    #[test]
    fn test_display_is_locale_free() {
        assert_eq!(CellValue::Number(45000.0).to_string(), "45000");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn test_from_rows_preserves_order_and_count() {
        let ds = TabularDataset::from_rows(rows(json!([
            {"date": "2023-01", "revenue": 45000, "expenses": 32000},
            {"date": "2023-02", "revenue": 47500, "expenses": 33500},
        ])))
        .unwrap();

        assert_eq!(ds.columns(), ["date", "revenue", "expenses"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(1, "revenue"), Some(&CellValue::Number(47500.0)));
    }

    #[test]
    fn test_from_rows_fills_missing_and_drops_extra() {
        let ds = TabularDataset::from_rows(rows(json!([
            {"date": "a", "x": 1},
            {"date": "b", "y": true},
        ])))
        .unwrap();

        assert_eq!(ds.columns(), ["date", "x"]);
        assert_eq!(ds.cell(1, "x"), Some(&CellValue::Null));
        assert!(ds.cell(1, "y").is_none());
    }

    #[test]
    fn test_from_rows_empty_fails() {
        let err = TabularDataset::from_rows(Vec::new()).unwrap_err();
        assert!(matches!(err, ChartError::EmptyInput));

        let err = TabularDataset::from_rows(rows(json!([{}]))).unwrap_err();
        assert!(matches!(err, ChartError::EmptyInput));
    }

    #[test]
    fn test_json_scalars_coerced() {
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Text("true".into()));
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(1.5)), CellValue::Number(1.5));
    }

    #[test]
    fn test_json_strings_coerced_like_text() {
        assert_eq!(CellValue::from_json(&json!("42")), CellValue::Number(42.0));
        assert_eq!(CellValue::from_json(&json!("")), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!("2023-01")), CellValue::Text("2023-01".into()));

        // Ingested rows survive the text editor round trip unchanged.
        let ds = TabularDataset::from_rows(rows(json!([
            {"d": "2023-01", "v": "42", "n": ""},
            {"d": "2023-02", "v": 7, "n": "note"}
        ])))
        .unwrap();
        let codec = crate::data::codec::TextCodec::default();
        let again = codec.parse_text(&codec.serialize(&ds).unwrap()).unwrap();
        assert_eq!(again, ds);
    }

    #[test]
    fn test_edits_are_copy_on_change() {
        let ds = TabularDataset::from_rows(rows(json!([{"d": "a", "v": 1}]))).unwrap();

        let edited = ds.with_cell(0, "v", CellValue::Number(9.0)).unwrap();
        assert_eq!(ds.cell(0, "v"), Some(&CellValue::Number(1.0)));
        assert_eq!(edited.cell(0, "v"), Some(&CellValue::Number(9.0)));

        let grown = ds.with_row_appended();
        assert_eq!(grown.len(), 2);
        assert_eq!(grown.cell(1, "d"), Some(&CellValue::Null));

        let (wider, name) = ds.with_column_appended();
        assert_eq!(name, "column3");
        assert_eq!(wider.columns(), ["d", "v", "column3"]);
        assert_eq!(ds.columns().len(), 2);
    }

    #[test]
    fn test_invalid_edits_rejected() {
        let ds = TabularDataset::from_rows(rows(json!([{"d": "a", "v": 1}]))).unwrap();

        assert!(matches!(
            ds.with_cell(5, "v", CellValue::Null),
            Err(ChartError::InvalidEdit(_))
        ));
        assert!(matches!(
            ds.with_cell(0, "nope", CellValue::Null),
            Err(ChartError::UnknownColumn(_))
        ));
        assert!(matches!(
            ds.with_column_renamed("v", "d"),
            Err(ChartError::InvalidEdit(_))
        ));
        assert!(matches!(
            ds.with_column_renamed("v", "  "),
            Err(ChartError::InvalidEdit(_))
        ));

        let single = ds.without_column("v").unwrap();
        assert!(matches!(
            single.without_column("d"),
            Err(ChartError::InvalidEdit(_))
        ));
    }

    #[test]
    fn test_plottable_columns_excludes_category() {
        let ds = TabularDataset::from_rows(rows(json!([{"d": "a", "v": 1, "w": 2}]))).unwrap();
        assert_eq!(ds.plottable_columns("d"), ["v", "w"]);
        assert_eq!(ds.plottable_columns("v"), ["d", "w"]);
    }
}
