// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Normalized heat frames for the parking map: one weighted point per
//! carpark at the playback cutoff hour.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatMetric {
    /// Standard deviation of vacancy, highlighting churny carparks.
    Volatility,
    /// Occupancy rate, highlighting full carparks.
    Occupancy,
}

#[derive(Clone, Debug)]
pub struct HeatSource {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub hour: i32,
    pub volatility: f64,
    pub occupancy: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct HeatPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub hour: i32,
    /// Metric value normalized against the frame maximum, 0..=1.
    pub weight: f64,
}

/// Builds one heat frame at `cutoff_hour`: per id, the latest record with
/// hour <= cutoff wins; ids with no such record are left out entirely.
/// Weights are normalized by max(frame maximum, 1) so an all-small frame
/// stays dim instead of being stretched to full intensity.
pub fn heat_frame(sources: &[HeatSource], cutoff_hour: i32, metric: HeatMetric) -> Vec<HeatPoint> {
    let mut latest: Vec<&HeatSource> = Vec::new();

    for source in sources {
        if source.hour > cutoff_hour {
            continue;
        }
        match latest.iter().position(|kept| kept.id == source.id) {
            Some(index) => {
                if source.hour > latest[index].hour {
                    latest[index] = source;
                }
            }
            None => latest.push(source),
        }
    }

    let value_of = |source: &HeatSource| match metric {
        HeatMetric::Volatility => source.volatility,
        HeatMetric::Occupancy => source.occupancy,
    };

    let max_weight = latest
        .iter()
        .map(|source| value_of(source))
        .fold(0.0_f64, f64::max)
        .max(1.0);

    latest
        .into_iter()
        .map(|source| HeatPoint {
            id: source.id.clone(),
            lat: source.lat,
            lon: source.lon,
            hour: source.hour,
            weight: value_of(source) / max_weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, hour: i32, volatility: f64, occupancy: f64) -> HeatSource {
        HeatSource {
            id: id.to_string(),
            lat: 22.3,
            lon: 114.2,
            hour,
            volatility,
            occupancy,
        }
    }

    #[test]
    fn weights_normalize_against_the_frame_maximum() {
        let sources = vec![
            source("a", 9, 2.0, 0.0),
            source("b", 9, 4.0, 0.0),
            source("c", 9, 8.0, 0.0),
        ];

        let frame = heat_frame(&sources, 12, HeatMetric::Volatility);
        let weights: Vec<f64> = frame.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn small_frames_are_not_stretched_to_full_intensity() {
        let sources = vec![source("a", 9, 0.4, 0.0)];
        let frame = heat_frame(&sources, 12, HeatMetric::Volatility);
        assert_eq!(frame[0].weight, 0.4);
    }

    #[test]
    fn latest_hour_at_or_below_cutoff_wins_and_future_ids_drop_out() {
        let sources = vec![
            source("a", 8, 1.0, 10.0),
            source("a", 11, 1.0, 30.0),
            source("a", 14, 1.0, 90.0),
            source("b", 13, 1.0, 50.0),
        ];

        let frame = heat_frame(&sources, 12, HeatMetric::Occupancy);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].id, "a");
        assert_eq!(frame[0].hour, 11);
        assert_eq!(frame[0].weight, 1.0);
    }
}
