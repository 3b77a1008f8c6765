use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group key used for records whose `dateTime` could not be parsed.
pub const INVALID_DATE_KEY: &str = "Invalid Date";

/// The columns the aggregation pipeline reads by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    DateTime,
    StoreName,
    ProductName,
    TotalCost,
    Quantity,
    Weight,
}

impl Field {
    /// Every known field, in canonical column order.
    pub const ALL: [Field; 6] = [
        Field::DateTime,
        Field::StoreName,
        Field::ProductName,
        Field::TotalCost,
        Field::Quantity,
        Field::Weight,
    ];

    /// Header spelling of the field in the input file.
    pub fn header_name(self) -> &'static str {
        match self {
            Field::DateTime => "dateTime",
            Field::StoreName => "storeName",
            Field::ProductName => "productName",
            Field::TotalCost => "totalCost",
            Field::Quantity => "quantity",
            Field::Weight => "weight",
        }
    }

    /// Resolve a header name to a known field. Matching is case-sensitive.
    pub fn from_header(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.header_name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header_name())
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

/// Ordered column names declared by the header line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Known fields that no header column declares.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.columns.iter().any(|c| c == f.header_name()))
            .collect()
    }
}

// ── RawRecord ─────────────────────────────────────────────────────────────────

/// One data line, as `(column, value)` pairs in header order.
///
/// Columns past the end of a short line are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(line: usize, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Value of the column called `name`.
    ///
    /// When the header repeats a column the rightmost occurrence wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        self.get(field.header_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ── RecordDate ────────────────────────────────────────────────────────────────

/// A parsed `dateTime` value, or the marker left by an unparseable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordDate {
    Valid(DateTime<Utc>),
    Invalid,
}

impl RecordDate {
    pub fn is_valid(&self) -> bool {
        matches!(self, RecordDate::Valid(_))
    }

    /// Calendar-date group key (`"%Y-%m-%d"`), time of day discarded.
    ///
    /// All invalid dates share [`INVALID_DATE_KEY`].
    pub fn date_key(&self) -> String {
        match self {
            RecordDate::Valid(ts) => ts.format("%Y-%m-%d").to_string(),
            RecordDate::Invalid => INVALID_DATE_KEY.to_string(),
        }
    }
}

// ── NormalizedRecord ──────────────────────────────────────────────────────────

/// A purchase row with its numeric and temporal fields coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    pub date_time: RecordDate,
    /// Empty when the column is absent.
    pub store_name: String,
    /// Empty when the column is absent.
    pub product_name: String,
    /// Currency amount in major units (source cents divided by 100).
    pub total_cost: f64,
    pub quantity: f64,
    pub weight: f64,
    /// Columns the pipeline does not know about, passed through verbatim.
    pub extra: Vec<(String, String)>,
}

impl NormalizedRecord {
    pub fn extra_field(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
