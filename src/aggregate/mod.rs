//! Group-by primitives used to build every derived table.
//!
//! All functions are pure: they read rows and return fresh tables. Groups come
//! out in ascending key order with the missing key (`None`) last, and each
//! group remembers the first input row that produced it so rankings can break
//! ties by encounter order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::Datelike;

use crate::domain::{Dataset, Grouped, SalesRecord};

pub mod tables;

pub use tables::*;

/// Sum `value` per group. Missing values are skipped; an all-missing group sums to 0.
pub fn group_sum<T, K>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<Grouped<Option<K>>>
where
    K: Ord + Hash + Clone,
{
    group_fold(rows, key, || 0.0, |acc, row| {
        if let Some(v) = value(row) {
            *acc += v;
        }
    })
    .into_iter()
    .map(|(key, first_seen, value)| Grouped { key, value, first_seen })
    .collect()
}

/// Mean of `value` per group, skipping missing values.
///
/// A group with no present values has mean `None`.
pub fn group_mean<T, K>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<Grouped<Option<K>, Option<f64>>>
where
    K: Ord + Hash + Clone,
{
    group_fold(rows, key, || (0.0, 0usize), |acc, row| {
        if let Some(v) = value(row) {
            acc.0 += v;
            acc.1 += 1;
        }
    })
    .into_iter()
    .map(|(key, first_seen, (sum, n))| Grouped {
        key,
        value: (n > 0).then(|| sum / n as f64),
        first_seen,
    })
    .collect()
}

/// Number of rows per group.
pub fn group_count<T, K>(rows: &[T], key: impl Fn(&T) -> Option<K>) -> Vec<Grouped<Option<K>, usize>>
where
    K: Ord + Hash + Clone,
{
    group_fold(rows, key, || 0usize, |acc, _| *acc += 1)
        .into_iter()
        .map(|(key, first_seen, value)| Grouped { key, value, first_seen })
        .collect()
}

/// Shared fold: one accumulator per distinct key, sorted by key (missing last).
pub(crate) fn group_fold<T, K, A>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    init: impl Fn() -> A,
    step: impl Fn(&mut A, &T),
) -> Vec<(Option<K>, usize, A)>
where
    K: Ord + Hash + Clone,
{
    let mut slots: HashMap<Option<K>, usize> = HashMap::new();
    let mut groups: Vec<(Option<K>, usize, A)> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let k = key(row);
        let slot = match slots.get(&k) {
            Some(&slot) => slot,
            None => {
                groups.push((k.clone(), idx, init()));
                slots.insert(k, groups.len() - 1);
                groups.len() - 1
            }
        };
        step(&mut groups[slot].2, row);
    }

    groups.sort_by(|a, b| cmp_none_last(&a.0, &b.0));
    groups
}

/// Largest `n` groups by value, descending.
///
/// The sort is stable on first-seen order, so equal values keep the order in
/// which their groups first appeared in the input.
pub fn top_n<K: Clone>(table: &[Grouped<K>], n: usize) -> Vec<Grouped<K>> {
    let mut ranked = table.to_vec();
    ranked.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });
    ranked.truncate(n);
    ranked
}

pub(crate) fn cmp_none_last<K: Ord>(a: &Option<K>, b: &Option<K>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A base-dataset row paired with its derived order year.
#[derive(Debug, Clone, Copy)]
pub struct YearRow<'a> {
    pub year: Option<i32>,
    pub record: &'a SalesRecord,
}

/// Working copy of the dataset with the `Year` column applied.
///
/// Built once per pass from the shared dataset; the base rows are borrowed,
/// never modified.
#[derive(Debug, Clone)]
pub struct YearFrame<'a> {
    rows: Vec<YearRow<'a>>,
}

impl<'a> YearFrame<'a> {
    pub fn rows(&self) -> &[YearRow<'a>] {
        &self.rows
    }
}

/// Derive `Year` from `Order Date` for every row.
pub fn derive_years(dataset: &Dataset) -> YearFrame<'_> {
    let rows = dataset
        .records()
        .iter()
        .map(|record| YearRow {
            year: record.order_date.map(|d| d.year()),
            record,
        })
        .collect();
    YearFrame { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sub: Option<&str>, sales: Option<f64>) -> SalesRecord {
        SalesRecord {
            sub_category: sub.map(str::to_string),
            sales,
            ..SalesRecord::default()
        }
    }

    fn sub(r: &SalesRecord) -> Option<String> {
        r.sub_category.clone()
    }

    #[test]
    fn group_sum_sorts_keys_with_missing_last() {
        let rows = vec![
            rec(Some("b"), Some(1.0)),
            rec(None, Some(4.0)),
            rec(Some("a"), Some(2.0)),
            rec(Some("b"), Some(3.0)),
        ];
        let out = group_sum(&rows, sub, |r| r.sales);
        let keys: Vec<_> = out.iter().map(|g| g.key.clone()).collect();
        assert_eq!(keys, vec![Some("a".to_string()), Some("b".to_string()), None]);
        assert_eq!(out[1].value, 4.0);
        assert_eq!(out[1].first_seen, 0);
        assert_eq!(out[2].value, 4.0);
    }

    #[test]
    fn group_sum_skips_missing_values() {
        let rows = vec![rec(Some("a"), None), rec(Some("a"), Some(2.5)), rec(Some("z"), None)];
        let out = group_sum(&rows, sub, |r| r.sales);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 2.5);
        assert_eq!(out[1].value, 0.0);
    }

    #[test]
    fn group_mean_handles_all_missing_group() {
        let rows = vec![
            rec(Some("a"), Some(1.0)),
            rec(Some("a"), Some(2.0)),
            rec(Some("a"), None),
            rec(Some("b"), None),
        ];
        let out = group_mean(&rows, sub, |r| r.sales);
        assert_eq!(out[0].value, Some(1.5));
        assert_eq!(out[1].value, None);
    }

    #[test]
    fn group_count_counts_rows() {
        let rows = vec![rec(Some("a"), None), rec(Some("a"), Some(1.0)), rec(None, None)];
        let out = group_count(&rows, sub);
        assert_eq!(out.iter().map(|g| g.value).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn top_n_is_stable_on_first_seen() {
        let table = vec![
            Grouped { key: "x", value: 5.0, first_seen: 3 },
            Grouped { key: "y", value: 9.0, first_seen: 1 },
            Grouped { key: "z", value: 5.0, first_seen: 0 },
        ];
        let out = top_n(&table, 2);
        assert_eq!(out.iter().map(|g| g.key).collect::<Vec<_>>(), vec!["y", "z"]);
        assert!(top_n(&table, 0).is_empty());
        assert_eq!(top_n(&table, 10).len(), 3);
    }

    #[test]
    fn derive_years_does_not_touch_base() {
        let ds = Dataset::new(vec![
            SalesRecord {
                order_date: chrono::NaiveDate::from_ymd_opt(2014, 12, 31),
                ..SalesRecord::default()
            },
            SalesRecord::default(),
        ]);
        let before = ds.records().to_vec();
        let frame = derive_years(&ds);
        assert_eq!(frame.rows()[0].year, Some(2014));
        assert_eq!(frame.rows()[1].year, None);
        assert_eq!(ds.records(), before.as_slice());
    }
}
