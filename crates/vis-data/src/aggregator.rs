//! Grouping of normalized purchases by date, store and product.
//!
//! [`group_by`] is the single aggregation primitive. Each key is seeded once
//! and every later record with that key is folded into the same accumulator,
//! by addition only. Keys keep first-seen order.

use indexmap::IndexMap;
use serde::Serialize;
use vis_core::models::NormalizedRecord;

// ── GroupSummary ──────────────────────────────────────────────────────────────

/// Finished, read-only mapping from group key to accumulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupSummary<A> {
    groups: IndexMap<String, A>,
}

impl<A> GroupSummary<A> {
    pub fn get(&self, key: &str) -> Option<&A> {
        self.groups.get(key)
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &A)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of `value` over every group.
    pub fn total_by(&self, value: impl Fn(&A) -> f64) -> f64 {
        self.groups.values().map(value).sum()
    }
}

impl<A> Default for GroupSummary<A> {
    fn default() -> Self {
        Self {
            groups: IndexMap::new(),
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Fold `records` into one accumulator per key.
///
/// `seed` runs exactly once per distinct key, before its first `fold`.
pub fn group_by<A, K, S, F>(
    records: &[NormalizedRecord],
    key_selector: K,
    seed: S,
    fold: F,
) -> GroupSummary<A>
where
    A: Clone,
    K: Fn(&NormalizedRecord) -> String,
    S: Fn() -> A,
    F: Fn(A, &NormalizedRecord) -> A,
{
    let mut groups: IndexMap<String, A> = IndexMap::new();

    for record in records {
        let acc = groups.entry(key_selector(record)).or_insert_with(&seed);
        *acc = fold(acc.clone(), record);
    }

    GroupSummary { groups }
}

/// An accumulator that knows its own zero and fold step.
pub trait Accumulator: Clone {
    fn seed() -> Self;
    fn fold(self, record: &NormalizedRecord) -> Self;
}

/// [`group_by`] driven by an [`Accumulator`] implementation.
pub fn group_by_accumulator<A, K>(
    records: &[NormalizedRecord],
    key_selector: K,
) -> GroupSummary<A>
where
    A: Accumulator,
    K: Fn(&NormalizedRecord) -> String,
{
    group_by(records, key_selector, A::seed, A::fold)
}

// ── Key selectors ─────────────────────────────────────────────────────────────

/// Calendar date of the purchase; all invalid dates share one key.
pub fn date_key(record: &NormalizedRecord) -> String {
    record.date_time.date_key()
}

pub fn store_key(record: &NormalizedRecord) -> String {
    record.store_name.clone()
}

pub fn product_key(record: &NormalizedRecord) -> String {
    record.product_name.clone()
}

// ── Accumulators ──────────────────────────────────────────────────────────────

/// Per-day totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTotals {
    pub total_cost: f64,
    pub quantity: f64,
    pub weight: f64,
}

impl Accumulator for DateTotals {
    fn seed() -> Self {
        Self::default()
    }

    fn fold(self, record: &NormalizedRecord) -> Self {
        Self {
            total_cost: self.total_cost + record.total_cost,
            quantity: self.quantity + record.quantity,
            weight: self.weight + record.weight,
        }
    }
}

/// Per-store spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTotals {
    pub total_cost: f64,
}

impl Accumulator for StoreTotals {
    fn seed() -> Self {
        Self::default()
    }

    fn fold(self, record: &NormalizedRecord) -> Self {
        Self {
            total_cost: self.total_cost + record.total_cost,
        }
    }
}

/// Per-product quantity, spend and purchase count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    pub quantity: f64,
    pub total_cost: f64,
    pub count: u32,
}

impl ProductTotals {
    /// Mean spend per purchase, `0.0` for an empty group.
    pub fn average_cost(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_cost / f64::from(self.count)
        }
    }
}

impl Accumulator for ProductTotals {
    fn seed() -> Self {
        Self::default()
    }

    fn fold(self, record: &NormalizedRecord) -> Self {
        Self {
            quantity: self.quantity + record.quantity,
            total_cost: self.total_cost + record.total_cost,
            count: self.count + 1,
        }
    }
}

// ── Summaries ─────────────────────────────────────────────────────────────────

/// The three summaries built for one visualisation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summaries {
    pub by_date: GroupSummary<DateTotals>,
    pub by_store: GroupSummary<StoreTotals>,
    pub by_product: GroupSummary<ProductTotals>,
}

impl Summaries {
    pub fn build(records: &[NormalizedRecord]) -> Self {
        Self {
            by_date: group_by_accumulator(records, date_key),
            by_store: group_by_accumulator(records, store_key),
            by_product: group_by_accumulator(records, product_key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty() && self.by_store.is_empty() && self.by_product.is_empty()
    }

    /// Spend across every store.
    pub fn total_cost(&self) -> f64 {
        self.by_store.total_by(|s| s.total_cost)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
