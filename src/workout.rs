//! Logged workouts and the metrics derived from them.
//!
//! A [`Workout`] is built once from a validated [`WorkoutDraft`] and never
//! recomputed afterwards. The serialized form carries every derived value
//! (metric, description, kind tag) so a stored workout is self-sufficient.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A latitude/longitude pair, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

/// Identifier derived from the creation time: the last ten digits of the
/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    const MODULUS: i64 = 10_000_000_000;

    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self::from_millis(at.timestamp_millis())
    }

    fn from_millis(millis: i64) -> Self {
        Self(format!("{:010}", millis.rem_euclid(Self::MODULUS)))
    }

    /// The id one millisecond later. Used to break collisions.
    pub fn successor(&self) -> Self {
        let millis = self.0.parse::<i64>().unwrap_or_default();
        Self::from_millis(millis + 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityKind {
    #[default]
    Running,
    Cycling,
}

impl ActivityKind {
    /// The tag used in storage and in CSS class names.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Running => "running",
            ActivityKind::Cycling => "cycling",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Running => "Running",
            ActivityKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ActivityKind::Running => "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}",
            ActivityKind::Cycling => "\u{1F6B4}\u{200D}\u{2640}\u{FE0F}",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ActivityKind::Running),
            "cycling" => Ok(ActivityKind::Cycling),
            other => Err(format!("Unknown activity type: {}", other)),
        }
    }
}

/// Kind-specific attributes together with the metric computed for that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    Running {
        /// Steps per minute.
        cadence: f64,
        /// Minutes per kilometre.
        pace: f64,
    },
    Cycling {
        /// Metres climbed.
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// Kilometres per hour.
        speed: f64,
    },
}

impl Activity {
    fn compute(kind: ActivityKind, distance_km: f64, duration_min: f64, extra: f64) -> Self {
        match kind {
            ActivityKind::Running => Activity::Running {
                cadence: extra,
                pace: duration_min / distance_km,
            },
            ActivityKind::Cycling => Activity::Cycling {
                elevation_gain: extra,
                speed: distance_km / (duration_min / 60.0),
            },
        }
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Running { .. } => ActivityKind::Running,
            Activity::Cycling { .. } => ActivityKind::Cycling,
        }
    }
}

/// Pace for runs, speed for rides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Pace(f64),
    Speed(f64),
}

impl Metric {
    pub fn value(self) -> f64 {
        match self {
            Metric::Pace(v) | Metric::Speed(v) => v,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Pace(_) => "min/km",
            Metric::Speed(_) => "km/h",
        }
    }
}

/// Validated user input, ready to become a [`Workout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutDraft {
    pub coordinates: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    pub kind: ActivityKind,
    /// Cadence for runs, elevation gain for rides.
    pub extra: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,
    #[serde(rename = "date")]
    created_at: DateTime<Utc>,
    #[serde(rename = "coords")]
    coordinates: Coordinates,
    #[serde(rename = "distance")]
    distance_km: f64,
    #[serde(rename = "duration")]
    duration_min: f64,
    #[serde(flatten)]
    activity: Activity,
    description: String,
    #[serde(rename = "clicks", default)]
    visit_count: u32,
}

impl Workout {
    /// Build a workout created at `created_at`, computing its metric and
    /// description. The draft must already be validated.
    pub fn record(id: WorkoutId, created_at: DateTime<Local>, draft: WorkoutDraft) -> Self {
        let activity = Activity::compute(
            draft.kind,
            draft.distance_km,
            draft.duration_min,
            draft.extra,
        );
        let description = format!(
            "{} on {}",
            draft.kind.label(),
            created_at.format("%B %-d")
        );

        Self {
            id,
            created_at: created_at.with_timezone(&Utc),
            coordinates: draft.coordinates,
            distance_km: draft.distance_km,
            duration_min: draft.duration_min,
            activity,
            description,
            visit_count: 0,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn kind(&self) -> ActivityKind {
        self.activity.kind()
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn metric(&self) -> Metric {
        match self.activity {
            Activity::Running { pace, .. } => Metric::Pace(pace),
            Activity::Cycling { speed, .. } => Metric::Speed(speed),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    /// Check a workout read back from storage. Distance, duration, the
    /// kind-specific field and the stored metric must all be positive and finite.
    pub fn check_measurements(&self) -> Result<(), ValidationError> {
        let (extra, metric) = match self.activity {
            Activity::Running { cadence, pace } => (("Cadence", cadence), ("Pace", pace)),
            Activity::Cycling {
                elevation_gain,
                speed,
            } => (("Elevation gain", elevation_gain), ("Speed", speed)),
        };
        for (field, value) in [
            ("Distance", self.distance_km),
            ("Duration", self.duration_min),
            extra,
            metric,
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::NotPositive { field });
            }
        }
        Ok(())
    }

    /// Count a selection from the list. Nothing else changes.
    pub fn record_visit(&mut self) {
        self.visit_count = self.visit_count.saturating_add(1);
    }

    /// Text for the map popup, e.g. "🏃‍♂️ Running on April 14".
    pub fn popup_text(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}
