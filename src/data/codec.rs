use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use super::model::{CellValue, Row, TabularDataset};
use crate::error::{ChartError, ChartResult};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with data rows whose field count differs from the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowLengthPolicy {
    /// Pad short rows with null, drop the excess fields of long rows.
    #[default]
    Lenient,
    /// Reject the whole parse on the first mismatched row.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    pub delimiter: u8,
    pub row_policy: RowLengthPolicy,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            row_policy: RowLengthPolicy::Lenient,
        }
    }
}

// ---------------------------------------------------------------------------
// TextCodec
// ---------------------------------------------------------------------------

/// Converts between [`TabularDataset`] and delimited text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec {
    options: CodecOptions,
}

impl TextCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Parse delimited text.
    ///
    /// The first non-blank line is the header. Quoted fields may contain
    /// the delimiter, quotes (doubled) and line breaks. Cells are coerced
    /// with [`CellValue::coerce`]. Only a missing header fails in lenient
    /// mode; bad data rows are skipped and logged.
    pub fn parse_text(&self, text: &str) -> ChartResult<TabularDataset> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        let header = loop {
            match records.next() {
                None => {
                    return Err(ChartError::MalformedRow {
                        line: 1,
                        reason: "no header line".to_string(),
                    })
                }
                Some(Err(e)) => {
                    return Err(ChartError::MalformedRow {
                        line: error_line(&e),
                        reason: e.to_string(),
                    })
                }
                Some(Ok(record)) if is_blank(&record) => continue,
                Some(Ok(record)) => break record,
            }
        };

        let columns = header_names(&header);
        let width = columns.len();

        let mut rows = Vec::new();
        let mut padded = 0usize;
        let mut truncated = 0usize;

        for result in records {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Skipping unreadable row at line {}: {e}", error_line(&e));
                    continue;
                }
            };

            if record.len() != width {
                if self.options.row_policy == RowLengthPolicy::Strict {
                    return Err(ChartError::MalformedRow {
                        line: record_line(&record),
                        reason: format!("expected {width} fields, found {}", record.len()),
                    });
                }
                if record.len() < width {
                    padded += 1;
                } else {
                    truncated += 1;
                }
            }

            let cells = record.iter().take(width).map(CellValue::coerce).collect();
            rows.push(Row::fitted(cells, width));
        }

        if padded > 0 || truncated > 0 {
            log::warn!(
                "Parsed with {padded} short row(s) padded and {truncated} long row(s) truncated"
            );
        }
        log::debug!("Parsed {} rows x {} columns", rows.len(), width);

        Ok(TabularDataset::from_parts(columns, rows))
    }

    /// Serialize to delimited text: header line, then one line per row.
    ///
    /// Fields are quoted only when they contain the delimiter, a quote or a
    /// line break; inner quotes are doubled. No trailing line break.
    pub fn serialize(&self, dataset: &TabularDataset) -> ChartResult<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.options.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(dataset.columns())?;
        for row in dataset.rows() {
            writer.write_record(row.cells.iter().map(|c| c.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ChartError::Csv(csv::Error::from(e.into_error())))?;
        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}

/// Header names, trimmed; blanks become `columnN` and repeats get a
/// numeric suffix so the column list stays distinct.
fn header_names(header: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (i, raw) in header.iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("column{}", i + 1),
            name => name.to_string(),
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        if name != raw {
            log::warn!("Header field {} renamed from {raw:?} to {name:?}", i + 1);
        }
        names.push(name);
    }
    names
}

/// A line with nothing but whitespace. A line of empty fields (`,,`) is
/// not blank: it is a header whose names are all missing.
fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

fn error_line(err: &csv::Error) -> usize {
    err.position().map(|p| p.line() as usize).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TextCodec {
        TextCodec::default()
    }

    #[test]
    fn test_parse_simple() {
        let ds = codec()
            .parse_text("date,revenue\n2023-01,45000\n2023-02,47500")
            .unwrap();
        assert_eq!(ds.columns(), ["date", "revenue"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(0, "date"), Some(&CellValue::Text("2023-01".into())));
        assert_eq!(ds.cell(1, "revenue"), Some(&CellValue::Number(47500.0)));
    }

    #[test]
    fn test_parse_empty_cells_become_null() {
        let ds = codec()
            .parse_text("date,a,b\n2023-01,5,\n2023-02,,7")
            .unwrap();
        assert_eq!(ds.cell(0, "b"), Some(&CellValue::Null));
        assert_eq!(ds.cell(1, "a"), Some(&CellValue::Null));
        assert_eq!(ds.cell(1, "b"), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        let ds = codec().parse_text("\n\n   \nx,y\n1,2").unwrap();
        assert_eq!(ds.columns(), ["x", "y"]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_quoted_fields() {
        let text = "name,note\n\"Doe, Jane\",\"say \"\"hi\"\"\"";
        let ds = codec().parse_text(text).unwrap();
        assert_eq!(ds.cell(0, "name"), Some(&CellValue::Text("Doe, Jane".into())));
        assert_eq!(ds.cell(0, "note"), Some(&CellValue::Text("say \"hi\"".into())));
    }

    #[test]
    fn test_short_and_long_rows_lenient() {
        let ds = codec().parse_text("a,b,c\n1\n1,2,3,4,5").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].cells.len(), 3);
        assert_eq!(ds.cell(0, "c"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[1].cells.len(), 3);
        assert_eq!(ds.cell(1, "c"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_strict_rejects_mismatched_rows() {
        let strict = TextCodec::new(CodecOptions {
            row_policy: RowLengthPolicy::Strict,
            ..CodecOptions::default()
        });
        let err = strict.parse_text("a,b\n1,2\n3").unwrap_err();
        match err {
            ChartError::MalformedRow { line, .. } => assert_eq!(line, 3),
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_header_is_malformed() {
        assert!(matches!(
            codec().parse_text(""),
            Err(ChartError::MalformedRow { .. })
        ));
        assert!(matches!(
            codec().parse_text("\n  \n"),
            Err(ChartError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_all_blank_header_keeps_first_data_row() {
        let ds = codec().parse_text(",,\n1,2,3\n4,5,6").unwrap();
        assert_eq!(ds.columns(), ["column1", "column2", "column3"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(0, "column1"), Some(&CellValue::Number(1.0)));

        let ds = codec().parse_text("\" \", , \n7,8,9").unwrap();
        assert_eq!(ds.columns(), ["column1", "column2", "column3"]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_header_only_gives_empty_dataset() {
        let ds = codec().parse_text("date,value").unwrap();
        assert_eq!(ds.columns(), ["date", "value"]);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_duplicate_and_blank_headers_renamed() {
        let ds = codec().parse_text("x,x,,y\n1,2,3,4").unwrap();
        assert_eq!(ds.columns(), ["x", "x_1", "column3", "y"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let tsv = TextCodec::new(CodecOptions {
            delimiter: b'\t',
            ..CodecOptions::default()
        });
        let ds = tsv.parse_text("a\tb\n1,5\t2").unwrap();
        assert_eq!(ds.cell(0, "a"), Some(&CellValue::Text("1,5".into())));
        assert_eq!(tsv.serialize(&ds).unwrap(), "a\tb\n1,5\t2");
    }

    #[test]
    fn test_serialize_quotes_only_when_needed() {
        let ds = codec()
            .parse_text("label,v\n\"a,b\",1\n\"q\"\"x\",\nplain,2.5")
            .unwrap();
        let out = codec().serialize(&ds).unwrap();
        assert_eq!(out, "label,v\n\"a,b\",1\n\"q\"\"x\",\nplain,2.5");
    }

    #[test]
    fn test_roundtrip_preserves_cells() {
        let original = "date,revenue,expenses,note\n\
                        2023-01,45000,32000.5,\"a, b\"\n\
                        2023-02,,-12,\n\
                        2023-03,1e3,0.125,x";
        let parsed = codec().parse_text(original).unwrap();
        let written = codec().serialize(&parsed).unwrap();
        let reparsed = codec().parse_text(&written).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_roundtrip_single_column_null_row() {
        let ds = codec().parse_text("only\n1\n\"\"\n3").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.cell(1, "only"), Some(&CellValue::Null));
        let reparsed = codec().parse_text(&codec().serialize(&ds).unwrap()).unwrap();
        assert_eq!(ds, reparsed);
    }
}
