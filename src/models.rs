// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::FromRow;

// Cross-boundary travel

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct DailyHeadline {
    pub date: NaiveDate,
    pub total_passengers: i64,
    pub rolling_7d_avg: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct TopDayRow {
    pub date: NaiveDate,
    pub total_passengers: i64,
    pub top_control_point_id: Option<String>,
    pub top_control_point_name: Option<String>,
    pub top_control_point_share: Option<f64>,
    pub holiday_period: Option<String>,
}

/// One month of one corridor, `year_month` encoded as `year * 100 + month`.
#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MonthlyCorridorRow {
    pub year_month: i32,
    pub corridor: String,
    pub total_passengers: Option<i64>,
    pub total_arrivals: Option<i64>,
    pub total_departures: Option<i64>,
    pub hk_residents: Option<i64>,
    pub mainland_visitors: Option<i64>,
    pub other_visitors: Option<i64>,
    pub hk_share: Option<f64>,
    pub mainland_share: Option<f64>,
    pub visitor_share: Option<f64>,
    pub yoy_growth: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct PatternCorridorRow {
    pub corridor: String,
    pub pattern_type: String,
    pub avg_passengers: Option<f64>,
    pub weekend_index: Option<f64>,
    pub holiday_uplift: Option<f64>,
    pub hk_share: Option<f64>,
    pub mainland_share: Option<f64>,
    pub other_share: Option<f64>,
}

// Transport patronage

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MonthlyModeRow {
    pub year_month: i32,
    pub mode: String,
    pub avg_daily_pax: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct LatestModeRow {
    pub year_month: i32,
    pub mode: String,
    pub operator_code: Option<String>,
    pub rail_line: Option<String>,
    pub avg_daily_pax: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct AnnualPtpRow {
    pub year: i32,
    pub avg_daily_ptp: Option<f64>,
    pub yoy_growth: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct OperatorTrendRow {
    pub year_month: i32,
    pub operator_code: Option<String>,
    pub rail_line: Option<String>,
    pub avg_daily_pax: Option<f64>,
}

// Parking

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MeteredCarparkInfo {
    pub carpark_id: String,
    pub name: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_spaces: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Parking5MinRow {
    pub time_bucket: DateTime<Utc>,
    pub district: Option<String>,
    pub avg_vacancy: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct ParkingHourlyRow {
    pub hour_of_day: i32,
    pub district: Option<String>,
    pub avg_vacancy: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Metered5MinRow {
    pub time_bucket: DateTime<Utc>,
    pub hour_of_day: Option<i32>,
    pub district: Option<String>,
    pub vehicle_type: Option<String>,
    pub total_spaces: Option<i64>,
    pub vacant_count: Option<i64>,
    pub vacancy_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MeteredHourlyRow {
    pub hour_of_day: i32,
    pub district: Option<String>,
    pub avg_vacancy_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct BusiestDistrictParkingRow {
    pub district: String,
    pub avg_vacancy: Option<f64>,
    pub min_vacancy: Option<f64>,
    pub max_vacancy: Option<f64>,
    pub stddev_vacancy: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct BusiestDistrictMeteredRow {
    pub district: String,
    pub avg_vacancy_rate: Option<f64>,
    pub min_vacancy_rate: Option<f64>,
    pub max_vacancy_rate: Option<f64>,
    pub stddev_vacancy_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct BusiestCarparkRow {
    pub park_id: String,
    pub park_name: Option<String>,
    pub district: Option<String>,
    pub avg_vacancy: Option<f64>,
    pub min_vacancy: Option<f64>,
    pub max_vacancy: Option<f64>,
    pub stddev_vacancy: Option<f64>,
}

/// One carpark at one hour of day, with position, for the heat layer.
#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct CarparkHourlyPoint {
    pub park_id: String,
    pub park_name: Option<String>,
    pub district: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub hour: i32,
    pub avg_vacancy: Option<f64>,
    pub stddev_vacancy: Option<f64>,
    pub min_vacancy: Option<f64>,
    pub max_vacancy: Option<f64>,
    pub sample_count: Option<i64>,
    pub occupancy_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MeteredHourlyPoint {
    pub carpark_id: String,
    pub carpark_name: Option<String>,
    pub district: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub hour: i32,
    pub avg_vacancy_rate: Option<f64>,
    pub stddev_vacancy_rate: Option<f64>,
    pub min_vacancy_rate: Option<f64>,
    pub max_vacancy_rate: Option<f64>,
    pub sample_count: Option<i64>,
    pub occupancy_rate: Option<f64>,
}

// Fleet telemetry

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct VehicleStateSummary {
    pub state: Option<String>,
    pub count: i64,
    pub total_duration_sec: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct DwellEvent {
    pub vin: String,
    pub district: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub duration_sec: f64,
    pub radius_m: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct DwellHotspot {
    pub district: String,
    pub events: i64,
    pub dwell_minutes: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct HourlyActivityRow {
    pub vin: String,
    pub hour: i32,
    pub duration_min: f64,
}

/// One GPS sample of one vehicle, ordered by `ts` within a vin.
#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct MovementSample {
    pub vin: String,
    pub ts: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub speed: Option<f64>,
}

// GTFS reference data

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct RouteSummary {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_type: Option<i32>,
    pub route_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolylinePoint {
    pub lat: f64,
    pub lon: f64,
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub direction_id: String,
    pub trip_id: Option<String>,
    pub polyline: Vec<PolylinePoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeadwayWindow {
    pub direction_id: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub headway_secs: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FareEntry {
    pub fare_id: Option<String>,
    pub price: f64,
    pub currency_type: Option<String>,
    pub payment_method: i64,
    pub transfers: i64,
    pub agency_id: Option<String>,
    pub origin_id: Option<String>,
    pub destination_id: Option<String>,
    pub contains_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteDetail {
    pub route: Option<RouteSummary>,
    pub directions: Vec<DirectionSummary>,
    pub headways: Vec<HeadwayWindow>,
    pub fares: Vec<FareEntry>,
    pub fare_count: i64,
}

fn json_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn json_f64_or_zero(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn json_i64_or_zero(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

// direction_id arrives as a number in some feeds and a string in others
fn json_direction_id(value: &Value) -> String {
    match value.get("direction_id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::from("0"),
    }
}

impl RouteDetail {
    /// Decodes the JSON document returned by the `gtfs_route_detail` stored
    /// procedure, defaulting absent numbers to zero, dropping polyline points
    /// without coordinates, and flattening the per-direction headway groups.
    pub fn from_document(doc: &Value) -> RouteDetail {
        let route = doc
            .get("route")
            .and_then(|r| serde_json::from_value::<RouteSummary>(r.clone()).ok());

        let directions = doc
            .get("directions")
            .and_then(Value::as_array)
            .map(|dirs| {
                dirs.iter()
                    .map(|d| DirectionSummary {
                        direction_id: json_direction_id(d),
                        trip_id: json_str(d, "trip_id"),
                        polyline: d
                            .get("polyline")
                            .and_then(Value::as_array)
                            .map(|points| {
                                points
                                    .iter()
                                    .filter_map(|p| {
                                        let lat = p.get("lat").and_then(Value::as_f64)?;
                                        let lon = p.get("lon").and_then(Value::as_f64)?;
                                        if lat == 0.0 || lon == 0.0 {
                                            return None;
                                        }
                                        Some(PolylinePoint {
                                            lat,
                                            lon,
                                            stop_id: json_str(p, "stop_id"),
                                            stop_name: json_str(p, "stop_name"),
                                        })
                                    })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let headways = doc
            .get("headways")
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .flat_map(|group| {
                        let direction_id = json_direction_id(group);
                        group
                            .get("items")
                            .and_then(Value::as_array)
                            .cloned()
                            .unwrap_or_default()
                            .into_iter()
                            .map(move |item| HeadwayWindow {
                                direction_id: direction_id.clone(),
                                start_time: json_str(&item, "start_time"),
                                end_time: json_str(&item, "end_time"),
                                headway_secs: json_i64_or_zero(&item, "headway_secs"),
                            })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let fares: Vec<FareEntry> = doc
            .get("fares")
            .and_then(Value::as_array)
            .map(|fares| {
                fares
                    .iter()
                    .map(|f| FareEntry {
                        fare_id: json_str(f, "fare_id"),
                        price: json_f64_or_zero(f, "price"),
                        currency_type: json_str(f, "currency_type"),
                        payment_method: json_i64_or_zero(f, "payment_method"),
                        transfers: json_i64_or_zero(f, "transfers"),
                        agency_id: json_str(f, "agency_id"),
                        origin_id: json_str(f, "origin_id"),
                        destination_id: json_str(f, "destination_id"),
                        contains_id: json_str(f, "contains_id"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let fare_count = doc
            .get("fare_count")
            .and_then(Value::as_i64)
            .unwrap_or(fares.len() as i64);

        RouteDetail {
            route,
            directions,
            headways,
            fares,
            fare_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_detail_decodes_full_document() {
        let doc = json!({
            "route": {
                "route_id": "KMB-1A",
                "agency_id": "KMB",
                "route_short_name": "1A",
                "route_long_name": null,
                "route_type": 3
            },
            "directions": [
                {
                    "direction_id": 0,
                    "trip_id": "1A-0-1",
                    "polyline": [
                        {"lat": 22.30, "lon": 114.17, "stop_id": "S1", "stop_name": "Star Ferry"},
                        {"lat": null, "lon": 114.18, "stop_id": "S2"},
                        {"lat": 0, "lon": 114.19, "stop_id": "S3"}
                    ]
                }
            ],
            "headways": [
                {
                    "direction_id": "1",
                    "items": [
                        {"start_time": "06:00:00", "end_time": "09:00:00", "headway_secs": 300},
                        {"start_time": "09:00:00", "end_time": "23:00:00"}
                    ]
                }
            ],
            "fares": [
                {"fare_id": "F1", "price": 6.8, "currency_type": "HKD"}
            ]
        });

        let detail = RouteDetail::from_document(&doc);

        assert_eq!(detail.route.as_ref().unwrap().route_id, "KMB-1A");
        assert_eq!(detail.directions.len(), 1);
        assert_eq!(detail.directions[0].direction_id, "0");
        // points with missing or zero coordinates dropped
        assert_eq!(detail.directions[0].polyline.len(), 1);

        assert_eq!(detail.headways.len(), 2);
        assert_eq!(detail.headways[0].direction_id, "1");
        assert_eq!(detail.headways[0].headway_secs, 300);
        assert_eq!(detail.headways[1].headway_secs, 0);

        assert_eq!(detail.fares.len(), 1);
        assert_eq!(detail.fares[0].payment_method, 0);
        assert_eq!(detail.fare_count, 1);
    }

    #[test]
    fn route_detail_tolerates_empty_document() {
        let detail = RouteDetail::from_document(&json!({}));
        assert!(detail.route.is_none());
        assert!(detail.directions.is_empty());
        assert!(detail.headways.is_empty());
        assert!(detail.fares.is_empty());
        assert_eq!(detail.fare_count, 0);
    }
}
