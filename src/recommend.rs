// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Parking recommendation ranking: which metered carparks have historically
//! been easiest to park at for a given hour of day in Hong Kong.

use crate::models::MeteredHourlyPoint;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Clone, Debug, Serialize)]
pub struct RecommendationBasis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub hour_of_day_hk: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub carpark_id: String,
    pub carpark_name: Option<String>,
    pub district: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub hour: i32,
    pub vacancy_rate: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub stddev_vacancy_rate: Option<f64>,
    pub min_vacancy_rate: Option<f64>,
    pub max_vacancy_rate: Option<f64>,
    pub sample_count: Option<i64>,
    /// Expected vacancy rate for the hour, clamped to 0..=100.
    pub availability_score: f64,
    pub basis: RecommendationBasis,
}

/// Ranks the hourly-pattern rows for one HK hour of day, best availability
/// first. Historical averages can stray outside 0..100 when the upstream
/// feed misreports capacity, so scores are clamped before sorting. The
/// descending sort is stable, so equal scores keep the query's ordering.
pub fn rank_for_hour(
    rows: Vec<MeteredHourlyPoint>,
    hour: u32,
    district: Option<&str>,
    limit: usize,
) -> Vec<Recommendation> {
    let limit = limit.clamp(1, MAX_LIMIT);

    let mut ranked: Vec<Recommendation> = rows
        .into_iter()
        .filter(|row| row.hour == hour as i32)
        .filter(|row| match district {
            Some(wanted) => row.district.as_deref() == Some(wanted),
            None => true,
        })
        .map(|row| Recommendation {
            availability_score: row.avg_vacancy_rate.unwrap_or(0.0).clamp(0.0, 100.0),
            carpark_id: row.carpark_id,
            carpark_name: row.carpark_name,
            district: row.district,
            lat: row.lat,
            lon: row.lon,
            hour: row.hour,
            vacancy_rate: row.avg_vacancy_rate,
            occupancy_rate: row.occupancy_rate,
            stddev_vacancy_rate: row.stddev_vacancy_rate,
            min_vacancy_rate: row.min_vacancy_rate,
            max_vacancy_rate: row.max_vacancy_rate,
            sample_count: row.sample_count,
            basis: RecommendationBasis {
                kind: "historical-hourly",
                hour_of_day_hk: hour,
            },
        })
        .collect();

    ranked.sort_by(|a, b| b.availability_score.total_cmp(&a.availability_score));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, district: &str, hour: i32, avg: f64) -> MeteredHourlyPoint {
        MeteredHourlyPoint {
            carpark_id: id.to_string(),
            carpark_name: Some(format!("Carpark {id}")),
            district: Some(district.to_string()),
            lat: Some(22.3),
            lon: Some(114.2),
            hour,
            avg_vacancy_rate: Some(avg),
            stddev_vacancy_rate: None,
            min_vacancy_rate: None,
            max_vacancy_rate: None,
            sample_count: Some(12),
            occupancy_rate: None,
        }
    }

    #[test]
    fn ranks_descending_with_scores_clamped_to_percent_range() {
        let rows = vec![
            point("a", "Central", 9, -10.0),
            point("b", "Central", 9, 150.0),
            point("c", "Central", 9, 80.0),
        ];

        let ranked = rank_for_hour(rows, 9, None, DEFAULT_LIMIT);
        let scores: Vec<(&str, f64)> = ranked
            .iter()
            .map(|r| (r.carpark_id.as_str(), r.availability_score))
            .collect();
        assert_eq!(scores, vec![("b", 100.0), ("c", 80.0), ("a", 0.0)]);
        assert_eq!(ranked[0].basis.hour_of_day_hk, 9);
    }

    #[test]
    fn filters_by_hour_and_district_and_honors_limit_cap() {
        let rows = vec![
            point("a", "Central", 9, 50.0),
            point("b", "Kwun Tong", 9, 90.0),
            point("c", "Central", 10, 95.0),
        ];

        let ranked = rank_for_hour(rows, 9, Some("Central"), 500);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].carpark_id, "a");
    }
}
