//! Status tallies and numeric aggregates over classified records.

use crate::classify::ClassifiedRecord;
use crate::schema::{AggregateSpec, EntitySchema};
use indexmap::IndexMap;

/// Running sum of the aggregate field over records that are not excluded.
///
/// The sum saturates at `±f64::MAX` so it always encodes as a JSON number.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Revenue {
    pub sum: f64,
    /// Records carrying the excluding flag (e.g. cancelled orders)
    pub excluded: u64,
}

/// Per-rule counts plus the optional numeric aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    counts: IndexMap<&'static str, u64>,
    records: u64,
    aggregate: Option<(AggregateSpec, Revenue)>,
}

impl Tally {
    /// Empty tally with every rule count at zero.
    pub fn new(schema: &EntitySchema) -> Self {
        Self {
            counts: schema.rules().iter().map(|rule| (rule.name, 0)).collect(),
            records: 0,
            aggregate: schema
                .aggregate()
                .map(|spec| (spec.clone(), Revenue::default())),
        }
    }

    pub fn observe(&mut self, record: &ClassifiedRecord) {
        self.records += 1;

        for (name, count) in self.counts.iter_mut() {
            if record.flag(name) {
                *count += 1;
            }
        }

        if let Some((spec, revenue)) = self.aggregate.as_mut() {
            if record.flag(spec.excluded_by) {
                revenue.excluded += 1;
            } else {
                let value = record.record.get_f64(spec.field).unwrap_or(0.0);
                revenue.sum = saturating_add(revenue.sum, value);
            }
        }
    }

    /// Combine two tallies of the same schema.
    pub fn merge(mut self, other: Tally) -> Tally {
        self.records += other.records;
        for (name, count) in other.counts {
            *self.counts.entry(name).or_insert(0) += count;
        }
        if let (Some((_, ours)), Some((_, theirs))) = (self.aggregate.as_mut(), other.aggregate) {
            ours.sum = saturating_add(ours.sum, theirs.sum);
            ours.excluded += theirs.excluded;
        }
        self
    }

    /// Count for a rule; unknown names are 0.
    pub fn count(&self, rule: &str) -> u64 {
        self.counts.get(rule).copied().unwrap_or(0)
    }

    /// Rule counts in declaration order.
    pub fn counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counts.iter().map(|(name, count)| (*name, *count))
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn aggregate_spec(&self) -> Option<&AggregateSpec> {
        self.aggregate.as_ref().map(|(spec, _)| spec)
    }

    pub fn revenue(&self) -> Option<&Revenue> {
        self.aggregate.as_ref().map(|(_, revenue)| revenue)
    }

    /// Sum divided by the number of non-excluded records.
    ///
    /// Zero when there are no such records.
    pub fn average(&self) -> Option<f64> {
        self.revenue().map(|revenue| {
            let included = self.records.saturating_sub(revenue.excluded);
            if included == 0 {
                0.0
            } else {
                revenue.sum / included as f64
            }
        })
    }
}

fn saturating_add(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.is_infinite() {
        f64::MAX.copysign(sum)
    } else {
        sum
    }
}

/// Fold `records` into a tally for `schema`.
pub fn aggregate<'a, I>(schema: &EntitySchema, records: I) -> Tally
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    let mut tally = Tally::new(schema);
    for record in records {
        tally.observe(record);
    }
    tracing::debug!(
        entity = schema.name(),
        records = tally.records(),
        "aggregated records"
    );
    tally
}
