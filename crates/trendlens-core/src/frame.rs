// ABOUTME: Column-oriented frame built from an array of flat JSON records.
// ABOUTME: Classifies every column as numeric, date, or text once, at ingestion time.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::error::AnalyticsError;

/// The typed values of a single column. Absent keys are explicit nulls,
/// so every column's length equals the record count.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
    Text(Vec<Option<String>>),
}

/// A named column extracted from the record set.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// A column-oriented view over an ordered set of flat JSON records.
/// Columns keep first-seen key order; rows keep record order.
#[derive(Debug, Clone)]
pub struct Frame {
    len: usize,
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame from a JSON array of flat objects. Each record must be
    /// an object whose values are scalars; nested arrays or objects are
    /// rejected. A column is numeric when every present value is a JSON
    /// number, a date when every present value is a date-parseable string,
    /// and text otherwise.
    pub fn from_records(records: &Value) -> Result<Self, AnalyticsError> {
        let rows = records.as_array().ok_or_else(|| {
            AnalyticsError::MalformedInput("expected a JSON array of records".to_string())
        })?;

        // First-seen key order, matching record iteration order.
        let mut names: Vec<String> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let obj = row.as_object().ok_or_else(|| {
                AnalyticsError::MalformedInput(format!("record {} is not a flat object", i))
            })?;
            for (key, value) in obj {
                if value.is_array() || value.is_object() {
                    return Err(AnalyticsError::MalformedInput(format!(
                        "record {} field '{}' is not a scalar",
                        i, key
                    )));
                }
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let cells: Vec<Option<&Value>> = rows
                .iter()
                .map(|row| row.get(&name).filter(|v| !v.is_null()))
                .collect();
            columns.push(Column {
                data: classify(&cells),
                name,
            });
        }

        debug!(rows = rows.len(), columns = columns.len(), "ingested record set");
        Ok(Self {
            len: rows.len(),
            columns,
        })
    }

    /// Number of records in the frame.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Iterate numeric columns in frame order as (name, values) pairs.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns.iter().filter_map(|c| match &c.data {
            ColumnData::Numeric(values) => Some((c.name.as_str(), values.as_slice())),
            _ => None,
        })
    }

    /// A named column's values, if the column exists and is numeric.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Numeric(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// A named column's values, if the column exists and holds dates.
    pub fn dates(&self, name: &str) -> Option<&[Option<NaiveDate>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Date(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// A named column's values, if the column exists and holds text.
    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Text(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// The first date-typed column in frame order, preferring one named "date".
    pub fn first_date_column(&self) -> Option<(&str, &[Option<NaiveDate>])> {
        if let Some(values) = self.dates("date") {
            return Some(("date", values));
        }
        self.columns.iter().find_map(|c| match &c.data {
            ColumnData::Date(values) => Some((c.name.as_str(), values.as_slice())),
            _ => None,
        })
    }
}

/// Parse a date-like string: plain "YYYY-MM-DD", or an RFC 3339 / ISO 8601
/// datetime whose date part is kept.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    None
}

/// Classify one column's cells into a typed vector. A column with no
/// present values at all is text.
fn classify(cells: &[Option<&Value>]) -> ColumnData {
    let present: Vec<&Value> = cells.iter().flatten().copied().collect();

    if !present.is_empty() && present.iter().all(|v| v.is_number()) {
        return ColumnData::Numeric(
            cells
                .iter()
                .map(|cell| cell.and_then(|v| v.as_f64()))
                .collect(),
        );
    }

    if !present.is_empty()
        && present
            .iter()
            .all(|v| v.as_str().is_some_and(|s| parse_date(s).is_some()))
    {
        return ColumnData::Date(
            cells
                .iter()
                .map(|cell| cell.and_then(|v| v.as_str()).and_then(parse_date))
                .collect(),
        );
    }

    ColumnData::Text(
        cells
            .iter()
            .map(|cell| {
                cell.map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_records_classifies_numeric_date_and_text() {
        let frame = Frame::from_records(&json!([
            {"date": "2024-01-01", "clicks": 10, "channel": "email"},
            {"date": "2024-01-02", "clicks": 12.5, "channel": "social"},
        ]))
        .unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.columns().len(), 3);
        assert!(frame.numeric("clicks").is_some());
        assert!(frame.dates("date").is_some());
        assert!(frame.text("channel").is_some());
    }

    #[test]
    fn missing_keys_become_nulls_keeping_columns_aligned() {
        let frame = Frame::from_records(&json!([
            {"clicks": 10, "cost": 1.5},
            {"clicks": 12},
            {"cost": 2.0},
        ]))
        .unwrap();

        let clicks = frame.numeric("clicks").unwrap();
        let cost = frame.numeric("cost").unwrap();
        assert_eq!(clicks.len(), 3);
        assert_eq!(cost.len(), 3);
        assert_eq!(clicks[2], None);
        assert_eq!(cost[1], None);
    }

    #[test]
    fn mixed_number_and_string_column_is_text() {
        let frame = Frame::from_records(&json!([
            {"v": 1},
            {"v": "two"},
        ]))
        .unwrap();

        assert!(frame.numeric("v").is_none());
        assert!(frame.text("v").is_some());
    }

    #[test]
    fn empty_array_yields_empty_frame() {
        let frame = Frame::from_records(&json!([])).unwrap();
        assert!(frame.is_empty());
        assert!(frame.columns().is_empty());
    }

    #[test]
    fn non_array_payload_is_malformed() {
        let err = Frame::from_records(&json!({"not": "an array"})).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedInput(_)));
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = Frame::from_records(&json!([{"v": {"nested": 1}}])).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedInput(_)));
    }

    #[test]
    fn datetime_strings_parse_to_their_date_part() {
        assert_eq!(
            parse_date("2024-03-10T15:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(
            parse_date("2024-03-10"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn first_date_column_prefers_one_named_date() {
        let frame = Frame::from_records(&json!([
            {"published": "2024-01-05", "date": "2024-01-01"},
        ]))
        .unwrap();

        let (name, _) = frame.first_date_column().unwrap();
        assert_eq!(name, "date");
    }
}
