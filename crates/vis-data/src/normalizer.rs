//! Type coercion of parsed rows into [`NormalizedRecord`]s.

use vis_core::coercion::{
    coerce_date, coerce_number, coerce_number_or_zero, parse_date_time, parse_number,
    CoercionPolicy,
};
use vis_core::error::Result;
use vis_core::models::{Field, NormalizedRecord, RawRecord, RecordDate};

/// `totalCost` is stored in minor units (cents).
const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Coerce every record, substituting zero or [`RecordDate::Invalid`] for
/// anything that does not parse. Order is preserved.
pub fn normalize(records: &[RawRecord]) -> Vec<NormalizedRecord> {
    records.iter().map(normalize_lossy).collect()
}

/// Coerce every record under `policy`.
///
/// With [`CoercionPolicy::Strict`] the first bad field aborts with
/// [`vis_core::error::VisError::Coercion`].
pub fn normalize_with(
    records: &[RawRecord],
    policy: CoercionPolicy,
) -> Result<Vec<NormalizedRecord>> {
    match policy {
        CoercionPolicy::Lossy => Ok(normalize(records)),
        CoercionPolicy::Strict => records.iter().map(normalize_strict).collect(),
    }
}

/// Known numeric/date fields of `raw` that would fall back to a default.
pub fn coercion_fallbacks(raw: &RawRecord) -> Vec<Field> {
    let mut fields = Vec::new();
    if raw.field(Field::DateTime).and_then(parse_date_time).is_none() {
        fields.push(Field::DateTime);
    }
    for field in [Field::TotalCost, Field::Quantity, Field::Weight] {
        if raw.field(field).and_then(parse_number).is_none() {
            fields.push(field);
        }
    }
    fields
}

fn normalize_lossy(raw: &RawRecord) -> NormalizedRecord {
    let date_time = raw
        .field(Field::DateTime)
        .and_then(parse_date_time)
        .map_or(RecordDate::Invalid, RecordDate::Valid);

    assemble(
        raw,
        date_time,
        coerce_number_or_zero(raw.field(Field::TotalCost)),
        coerce_number_or_zero(raw.field(Field::Quantity)),
        coerce_number_or_zero(raw.field(Field::Weight)),
    )
}

fn normalize_strict(raw: &RawRecord) -> Result<NormalizedRecord> {
    let policy = CoercionPolicy::Strict;
    let number = |field: Field| coerce_number(raw.field(field), policy, raw.line, field);

    Ok(assemble(
        raw,
        coerce_date(raw.field(Field::DateTime), policy, raw.line)?,
        number(Field::TotalCost)?,
        number(Field::Quantity)?,
        number(Field::Weight)?,
    ))
}

fn assemble(
    raw: &RawRecord,
    date_time: RecordDate,
    cost_minor: f64,
    quantity: f64,
    weight: f64,
) -> NormalizedRecord {
    let text = |field: Field| raw.field(field).unwrap_or_default().to_string();

    NormalizedRecord {
        line: raw.line,
        date_time,
        store_name: text(Field::StoreName),
        product_name: text(Field::ProductName),
        total_cost: cost_minor / MINOR_UNITS_PER_MAJOR,
        quantity,
        weight,
        extra: raw
            .iter()
            .filter(|(name, _)| Field::from_header(name).is_none())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
