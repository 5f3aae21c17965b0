// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Reshapes flat (time-bucket, category, value) rows into the wide,
//! chart-ready records the dashboard consumes: one record per bucket,
//! one column per category, buckets in ascending order.

use crate::models::MonthlyCorridorRow;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// What to do when several input rows land on the same (bucket, category)
/// cell. The source views are not uniform here, so every call site picks
/// its own mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accumulate {
    /// Last row wins. For views already unique per (bucket, category).
    Replace,
    /// Cells add up, e.g. several rail lines of one operator in one month.
    Sum,
    /// Sum divided by contribution count, e.g. many days per hour-of-day.
    Mean,
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    sum: f64,
    count: u32,
}

impl Cell {
    fn apply(&mut self, value: f64, mode: Accumulate) {
        match mode {
            Accumulate::Replace => {
                self.sum = value;
                self.count = 1;
            }
            Accumulate::Sum => {
                self.sum += value;
                self.count = 1;
            }
            Accumulate::Mean => {
                self.sum += value;
                self.count += 1;
            }
        }
    }

    fn emit(&self) -> f64 {
        if self.count > 1 {
            self.sum / f64::from(self.count)
        } else {
            self.sum
        }
    }
}

/// Wide pivot output: category column names in first-seen order plus one
/// JSON record per bucket. Columns a bucket has no data for are absent
/// (or null for the pre-seeded hourly form) — never zero.
#[derive(Clone, Debug, Serialize)]
pub struct WideTable {
    pub keys: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

pub fn format_year_month(ym: i32) -> String {
    format!("{}-{:02}", ym / 100, ym % 100)
}

/// Pivot of monthly rows into a `label` = "YYYY-MM" keyed wide table.
pub fn pivot_monthly<I>(rows: I, mode: Accumulate) -> WideTable
where
    I: IntoIterator<Item = (i32, String, f64)>,
{
    let mut buckets: BTreeMap<i32, BTreeMap<String, Cell>> = BTreeMap::new();
    let mut keys: Vec<String> = Vec::new();

    for (year_month, category, value) in rows {
        if !keys.contains(&category) {
            keys.push(category.clone());
        }
        buckets
            .entry(year_month)
            .or_default()
            .entry(category)
            .or_default()
            .apply(value, mode);
    }

    let rows = buckets
        .iter()
        .map(|(year_month, cells)| {
            let mut record = Map::new();
            record.insert(
                String::from("label"),
                json!(format_year_month(*year_month)),
            );
            for (category, cell) in cells {
                record.insert(category.clone(), json!(cell.emit()));
            }
            record
        })
        .collect();

    WideTable { keys, rows }
}

/// Hour-of-day pivot. All 24 buckets are pre-seeded so charts always get
/// a complete axis, and duplicate contributions per (hour, category) are
/// averaged. Known categories with no data in a bucket emit as null.
/// Rows with an hour outside 0..=23 are dropped rather than growing the
/// axis.
pub fn pivot_hourly<I>(rows: I) -> WideTable
where
    I: IntoIterator<Item = (i32, String, f64)>,
{
    let mut buckets: BTreeMap<i32, BTreeMap<String, Cell>> =
        (0..24).map(|hour| (hour, BTreeMap::new())).collect();
    let mut keys: Vec<String> = Vec::new();

    for (hour, category, value) in rows {
        if !(0..24).contains(&hour) {
            continue;
        }
        if !keys.contains(&category) {
            keys.push(category.clone());
        }
        buckets
            .entry(hour)
            .or_default()
            .entry(category)
            .or_default()
            .apply(value, Accumulate::Mean);
    }

    let rows = buckets
        .iter()
        .map(|(hour, cells)| {
            let mut record = Map::new();
            record.insert(String::from("hour"), json!(hour));
            for key in &keys {
                match cells.get(key) {
                    Some(cell) => record.insert(key.clone(), json!(cell.emit())),
                    None => record.insert(key.clone(), Value::Null),
                };
            }
            record
        })
        .collect();

    WideTable { keys, rows }
}

/// Per-bucket share of each category column: value / max(bucket total, 1).
/// The floor keeps all-zero buckets at all-zero shares instead of NaN.
pub fn share_rows(table: &WideTable) -> Vec<Map<String, Value>> {
    table
        .rows
        .iter()
        .map(|record| {
            let total: f64 = table
                .keys
                .iter()
                .filter_map(|key| record.get(key).and_then(Value::as_f64))
                .sum();
            let denominator = total.max(1.0);

            let mut shared = Map::new();
            for (field, value) in record {
                if table.keys.contains(field) {
                    let share = value.as_f64().unwrap_or(0.0) / denominator;
                    shared.insert(field.clone(), json!(share));
                } else {
                    shared.insert(field.clone(), value.clone());
                }
            }
            shared
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResidencyMixPoint {
    pub year_month: i32,
    pub label: String,
    pub hk_share: f64,
    pub mainland_share: f64,
    pub other_share: f64,
}

/// Monthly residency mix across the selected corridors. Sums the residency
/// breakdowns per month, then derives shares against max(total, 1).
pub fn residency_mix(rows: &[MonthlyCorridorRow]) -> Vec<ResidencyMixPoint> {
    #[derive(Default)]
    struct MonthTotals {
        hk_residents: f64,
        mainland_visitors: f64,
        other_visitors: f64,
        total: f64,
    }

    let mut months: BTreeMap<i32, MonthTotals> = BTreeMap::new();

    for row in rows {
        let totals = months.entry(row.year_month).or_default();
        totals.hk_residents += row.hk_residents.unwrap_or(0) as f64;
        totals.mainland_visitors += row.mainland_visitors.unwrap_or(0) as f64;
        totals.other_visitors += row.other_visitors.unwrap_or(0) as f64;
        totals.total += row.total_passengers.unwrap_or(0) as f64;
    }

    months
        .into_iter()
        .map(|(year_month, totals)| {
            let denominator = totals.total.max(1.0);
            ResidencyMixPoint {
                year_month,
                label: format_year_month(year_month),
                hk_share: totals.hk_residents / denominator,
                mainland_share: totals.mainland_visitors / denominator,
                other_share: totals.other_visitors / denominator,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_row(
        year_month: i32,
        corridor: &str,
        total: i64,
        hk: i64,
        mainland: i64,
        other: i64,
    ) -> MonthlyCorridorRow {
        MonthlyCorridorRow {
            year_month,
            corridor: corridor.to_string(),
            total_passengers: Some(total),
            total_arrivals: None,
            total_departures: None,
            hk_residents: Some(hk),
            mainland_visitors: Some(mainland),
            other_visitors: Some(other),
            hk_share: None,
            mainland_share: None,
            visitor_share: None,
            yoy_growth: None,
        }
    }

    #[test]
    fn monthly_buckets_are_unique_and_sorted_regardless_of_input_order() {
        let table = pivot_monthly(
            vec![
                (202403, String::from("Lo Wu"), 30.0),
                (202401, String::from("Lo Wu"), 10.0),
                (202402, String::from("Lok Ma Chau"), 25.0),
                (202401, String::from("Lok Ma Chau"), 15.0),
            ],
            Accumulate::Replace,
        );

        let labels: Vec<&str> = table
            .rows
            .iter()
            .map(|r| r.get("label").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(table.keys, vec!["Lo Wu", "Lok Ma Chau"]);

        // absent cells stay absent, not zero
        assert!(table.rows[1].get("Lo Wu").is_none());
    }

    #[test]
    fn replace_takes_last_row_and_sum_accumulates() {
        let rows = vec![
            (202401, String::from("MTR"), 100.0),
            (202401, String::from("MTR"), 40.0),
        ];

        let replaced = pivot_monthly(rows.clone(), Accumulate::Replace);
        assert_eq!(replaced.rows[0].get("MTR").unwrap().as_f64(), Some(40.0));

        let summed = pivot_monthly(rows, Accumulate::Sum);
        assert_eq!(summed.rows[0].get("MTR").unwrap().as_f64(), Some(140.0));
    }

    #[test]
    fn hourly_pivot_emits_all_24_buckets_even_for_empty_input() {
        let table = pivot_hourly(Vec::new());
        assert_eq!(table.rows.len(), 24);
        for (hour, record) in table.rows.iter().enumerate() {
            assert_eq!(record.get("hour").unwrap().as_i64(), Some(hour as i64));
        }
    }

    #[test]
    fn hourly_pivot_averages_duplicate_contributions() {
        let table = pivot_hourly(vec![
            (9, String::from("Central"), 40.0),
            (9, String::from("Central"), 60.0),
            (9, String::from("Kwun Tong"), 10.0),
        ]);

        let nine = &table.rows[9];
        assert_eq!(nine.get("Central").unwrap().as_f64(), Some(50.0));
        assert_eq!(nine.get("Kwun Tong").unwrap().as_f64(), Some(10.0));

        // hours without data carry null for known categories
        assert!(table.rows[0].get("Central").unwrap().is_null());
    }

    #[test]
    fn out_of_range_hours_are_dropped_not_added_as_buckets() {
        let table = pivot_hourly(vec![
            (24, String::from("Central"), 50.0),
            (-1, String::from("Central"), 50.0),
            (23, String::from("Central"), 30.0),
        ]);

        assert_eq!(table.rows.len(), 24);
        assert_eq!(table.rows[23].get("Central").unwrap().as_f64(), Some(30.0));
    }

    #[test]
    fn shares_of_all_zero_bucket_are_zero() {
        let table = pivot_monthly(
            vec![
                (202401, String::from("A"), 0.0),
                (202401, String::from("B"), 0.0),
                (202402, String::from("A"), 30.0),
                (202402, String::from("B"), 10.0),
            ],
            Accumulate::Replace,
        );

        let shares = share_rows(&table);
        assert_eq!(shares[0].get("A").unwrap().as_f64(), Some(0.0));
        assert_eq!(shares[0].get("B").unwrap().as_f64(), Some(0.0));
        assert_eq!(shares[1].get("A").unwrap().as_f64(), Some(0.75));
        assert_eq!(shares[1].get("B").unwrap().as_f64(), Some(0.25));
    }

    #[test]
    fn residency_mix_sums_per_month_before_deriving_shares() {
        let rows = vec![
            corridor_row(202401, "Lo Wu", 100, 40, 50, 10),
            corridor_row(202401, "Lok Ma Chau", 100, 60, 30, 10),
            corridor_row(202402, "Lo Wu", 0, 0, 0, 0),
        ];

        let mix = residency_mix(&rows);
        assert_eq!(mix.len(), 2);
        assert_eq!(mix[0].label, "2024-01");
        assert!((mix[0].hk_share - 0.5).abs() < 1e-12);
        assert!((mix[0].mainland_share - 0.4).abs() < 1e-12);

        // zero month stays zero instead of dividing by zero
        assert_eq!(mix[1].hk_share, 0.0);
        assert_eq!(mix[1].mainland_share, 0.0);
        assert_eq!(mix[1].other_share, 0.0);
    }
}
