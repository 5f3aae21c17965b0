// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Playback clock and marker easing for the trailing-day fleet replay.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One tick advances the replay a quarter of an hour.
pub const HOURS_PER_TICK: f64 = 0.25;
pub const TICK_PERIOD: Duration = Duration::from_millis(400);
pub const EASE_DURATION: Duration = Duration::from_millis(400);

/// Replay position over the trailing 24 hours. Hour 24.0 is "now";
/// playback wraps back to the start of the window when it runs past it.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackClock {
    pub hour: f64,
    pub playing: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        PlaybackClock {
            hour: 24.0,
            playing: false,
        }
    }
}

impl PlaybackClock {
    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        self.hour += HOURS_PER_TICK;
        if self.hour > 24.0 {
            self.hour = 0.0;
        }
    }

    /// Jumping the slider pauses playback.
    pub fn scrub(&mut self, hour: f64) {
        self.hour = hour.clamp(0.0, 24.0);
        self.playing = false;
    }
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// One marker's in-flight glide between two map positions.
#[derive(Clone, Copy, Debug)]
pub struct MarkerEase {
    from: (f64, f64),
    to: (f64, f64),
    started: Instant,
}

impl MarkerEase {
    pub fn new(from: (f64, f64), to: (f64, f64), started: Instant) -> MarkerEase {
        MarkerEase { from, to, started }
    }

    pub fn position_at(&self, now: Instant) -> (f64, f64) {
        let elapsed = now.saturating_duration_since(self.started);
        let progress = if EASE_DURATION.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / EASE_DURATION.as_secs_f64()
        };
        let eased = ease_out_cubic(progress);
        (
            self.from.0 + (self.to.0 - self.from.0) * eased,
            self.from.1 + (self.to.1 - self.from.1) * eased,
        )
    }

    pub fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= EASE_DURATION
    }
}

/// Tracks one ease per vehicle. Retargeting while playing glides from the
/// marker's current eased position; while paused (scrubbing) the marker
/// snaps straight to the new position.
#[derive(Debug, Default)]
pub struct MarkerEaseSet {
    eases: HashMap<String, MarkerEase>,
}

impl MarkerEaseSet {
    pub fn retarget(&mut self, vin: &str, to: (f64, f64), smooth: bool, now: Instant) {
        if !smooth {
            self.eases
                .insert(vin.to_string(), MarkerEase::new(to, to, now));
            return;
        }
        let from = self
            .eases
            .get(vin)
            .map(|ease| ease.position_at(now))
            .unwrap_or(to);
        self.eases
            .insert(vin.to_string(), MarkerEase::new(from, to, now));
    }

    pub fn position_of(&self, vin: &str, now: Instant) -> Option<(f64, f64)> {
        self.eases.get(vin).map(|ease| ease.position_at(now))
    }

    pub fn remove(&mut self, vin: &str) {
        self.eases.remove(vin);
    }

    pub fn clear(&mut self) {
        self.eases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_a_quarter_hour_and_wraps_past_24() {
        let mut clock = PlaybackClock::default();
        clock.play();
        clock.tick();
        assert!((clock.hour - 0.0).abs() < 1e-12); // 24.0 + 0.25 wraps

        clock.tick();
        assert!((clock.hour - 0.25).abs() < 1e-12);
    }

    #[test]
    fn tick_is_inert_while_paused() {
        let mut clock = PlaybackClock::default();
        clock.tick();
        assert_eq!(clock.hour, 24.0);
    }

    #[test]
    fn scrub_clamps_and_pauses() {
        let mut clock = PlaybackClock::default();
        clock.play();
        clock.scrub(30.0);
        assert_eq!(clock.hour, 24.0);
        assert!(!clock.playing);

        clock.scrub(-3.0);
        assert_eq!(clock.hour, 0.0);
    }

    #[test]
    fn ease_out_cubic_hits_known_points() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn marker_ease_lands_on_target_after_duration() {
        let start = Instant::now();
        let ease = MarkerEase::new((22.30, 114.10), (22.40, 114.20), start);

        let at_start = ease.position_at(start);
        assert!((at_start.0 - 22.30).abs() < 1e-12);

        let done = ease.position_at(start + EASE_DURATION);
        assert!((done.0 - 22.40).abs() < 1e-12);
        assert!((done.1 - 114.20).abs() < 1e-12);
        assert!(ease.finished(start + EASE_DURATION));
    }

    #[test]
    fn retarget_without_smoothing_snaps_to_target() {
        let now = Instant::now();
        let mut set = MarkerEaseSet::default();
        set.retarget("WAUZZZ1", (22.35, 114.15), false, now);

        let pos = set.position_of("WAUZZZ1", now).unwrap();
        assert!((pos.0 - 22.35).abs() < 1e-12);
        assert!((pos.1 - 114.15).abs() < 1e-12);
    }
}
