//! The application controller.
//!
//! [`Tracker`] owns the workout list and the map once it exists. The Leptos
//! views call into it on map clicks, form submits and list clicks, and read
//! the list back to render it. Every change to the list is written to the
//! [`WorkoutStore`] before the call returns.

use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::error::{StorageError, ValidationError};
use crate::map::{MapView, MarkerPopup};
use crate::storage::{KeyValueStore, WorkoutStore};
use crate::workout::{ActivityKind, Coordinates, Workout, WorkoutDraft, WorkoutId};

/// The new-workout form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FormState {
    #[default]
    Idle,
    /// Shown, anchored to the position of the map click that opened it.
    AwaitingInput { at: Coordinates },
}

impl FormState {
    pub fn is_open(self) -> bool {
        matches!(self, FormState::AwaitingInput { .. })
    }
}

/// Raw form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutInput {
    pub kind: ActivityKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
}

impl WorkoutInput {
    /// Check the fields used by the selected kind and turn them into a draft.
    ///
    /// Every field must be a finite number first; only then is positivity
    /// checked. Both the cadence of a run and the elevation gain of a ride
    /// must be strictly positive.
    pub fn validate(&self, at: Coordinates) -> Result<WorkoutDraft, ValidationError> {
        let distance_km = parse_number("Distance", &self.distance)?;
        let duration_min = parse_number("Duration", &self.duration)?;
        let extra = match self.kind {
            ActivityKind::Running => ("Cadence", parse_number("Cadence", &self.cadence)?),
            ActivityKind::Cycling => (
                "Elevation gain",
                parse_number("Elevation gain", &self.elevation_gain)?,
            ),
        };

        require_positive("Distance", distance_km)?;
        require_positive("Duration", duration_min)?;
        require_positive(extra.0, extra.1)?;

        Ok(WorkoutDraft {
            coordinates: at,
            distance_km,
            duration_min,
            kind: self.kind,
            extra: extra.1,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotANumber { field })
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

pub struct Tracker<M, S> {
    workouts: Vec<Workout>,
    map: Option<M>,
    form: FormState,
    store: WorkoutStore<S>,
    zoom: u8,
}

impl<M: MapView, S: KeyValueStore> Tracker<M, S> {
    /// Start with whatever `store` holds. The map is attached later, once
    /// the position is known.
    pub fn new(store: WorkoutStore<S>, zoom: u8) -> Self {
        let workouts = store.load();
        Self {
            workouts,
            map: None,
            form: FormState::Idle,
            store,
            zoom,
        }
    }

    /// Workouts in creation order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn form(&self) -> FormState {
        self.form
    }

    /// Take ownership of the map and draw a marker for every workout.
    pub fn attach_map(&mut self, map: M) {
        for workout in &self.workouts {
            map.add_marker(workout.coordinates(), &MarkerPopup::for_workout(workout));
        }
        self.map = Some(map);
    }

    pub fn show_form(&mut self, at: Coordinates) {
        self.form = FormState::AwaitingInput { at };
    }

    /// Validate `input` and, if it passes, record a new workout at the
    /// position the form was opened at.
    ///
    /// On error nothing changes and the form stays open.
    pub fn submit(&mut self, input: &WorkoutInput) -> Result<&Workout, ValidationError> {
        let FormState::AwaitingInput { at } = self.form else {
            return Err(ValidationError::NoPosition);
        };
        let draft = input.validate(at)?;

        let now = Local::now();
        let workout = Workout::record(self.next_id(now.with_timezone(&Utc)), now, draft);
        info!(
            "New workout {}: {} ({} km, {} min)",
            workout.id(),
            workout.description(),
            workout.distance_km(),
            workout.duration_min()
        );

        self.workouts.push(workout);
        let index = self.workouts.len() - 1;
        if let Some(map) = &self.map {
            let workout = &self.workouts[index];
            map.add_marker(workout.coordinates(), &MarkerPopup::for_workout(workout));
        }
        self.form = FormState::Idle;
        self.persist();

        Ok(&self.workouts[index])
    }

    /// Centre the map on a workout picked from the list and count the visit.
    pub fn select(&mut self, id: &WorkoutId) -> Option<&Workout> {
        let index = self.workouts.iter().position(|w| w.id() == id)?;
        if let Some(map) = &self.map {
            map.pan_to(self.workouts[index].coordinates(), self.zoom);
        }

        self.workouts[index].record_visit();
        self.persist();
        Some(&self.workouts[index])
    }

    /// Forget every workout, in memory and in storage. When storage cannot be
    /// cleared the in-memory list is kept as well.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.store.clear()?;
        self.workouts.clear();
        self.form = FormState::Idle;
        info!("Cleared all saved workouts");
        Ok(())
    }

    /// Id for a workout created at `created_at`, bumped past any existing id.
    fn next_id(&self, created_at: chrono::DateTime<Utc>) -> WorkoutId {
        let mut id = WorkoutId::from_timestamp(created_at);
        while self.workouts.iter().any(|w| w.id() == &id) {
            id = id.successor();
        }
        id
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.workouts) {
            warn!("Failed to save workouts, continuing without persistence: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::map::testing::RecordingMap;
    use crate::storage::testing::MemoryStore;
    use crate::workout::Metric;

    type TestTracker = Tracker<Rc<RecordingMap>, Rc<MemoryStore>>;

    fn here() -> Coordinates {
        Coordinates::new(39.0, -12.0)
    }

    fn setup() -> (TestTracker, Rc<RecordingMap>, Rc<MemoryStore>) {
        let backend = Rc::new(MemoryStore::default());
        let map = Rc::new(RecordingMap::default());
        let mut tracker = Tracker::new(WorkoutStore::new(backend.clone(), "workouts"), 13);
        tracker.attach_map(map.clone());
        (tracker, map, backend)
    }

    fn running(distance: &str, duration: &str, cadence: &str) -> WorkoutInput {
        WorkoutInput {
            kind: ActivityKind::Running,
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: cadence.to_string(),
            elevation_gain: String::new(),
        }
    }

    fn cycling(distance: &str, duration: &str, elevation: &str) -> WorkoutInput {
        WorkoutInput {
            kind: ActivityKind::Cycling,
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: String::new(),
            elevation_gain: elevation.to_string(),
        }
    }

    fn saved(backend: &Rc<MemoryStore>) -> Vec<Workout> {
        WorkoutStore::new(backend.clone(), "workouts").load()
    }

    #[test]
    fn test_submit_running() {
        let (mut tracker, map, backend) = setup();
        tracker.show_form(here());

        let workout = tracker
            .submit(&running("5.2", "24", "178"))
            .unwrap()
            .clone();

        assert_eq!(workout.kind(), ActivityKind::Running);
        assert_eq!(workout.coordinates(), here());
        assert_eq!(workout.metric(), Metric::Pace(24.0 / 5.2));
        assert!((workout.metric().value() - 4.615).abs() < 0.001);
        let today = Local::now().format("%B %-d").to_string();
        assert!(workout.description().contains(&format!("Running on {}", today)));

        assert_eq!(tracker.workouts().len(), 1);
        assert_eq!(tracker.form(), FormState::Idle);
        assert_eq!(map.markers.borrow().len(), 1);
        assert_eq!(map.markers.borrow()[0].1.class_name, "running-popup");
        assert_eq!(saved(&backend), vec![workout]);
    }

    #[test]
    fn test_submit_cycling() {
        let (mut tracker, map, _backend) = setup();
        tracker.show_form(here());

        let workout = tracker.submit(&cycling("5.2", "24", "178")).unwrap();

        assert_eq!(workout.metric(), Metric::Speed(13.0));
        assert!(workout.description().starts_with("Cycling on "));
        assert_eq!(map.markers.borrow()[0].1.class_name, "cycling-popup");
    }

    #[test]
    fn test_zero_distance_rejected_for_both_kinds() {
        for input in [running("0", "24", "178"), cycling("0", "24", "178")] {
            let (mut tracker, map, backend) = setup();
            tracker.show_form(here());

            let err = tracker.submit(&input).unwrap_err();

            assert_eq!(err, ValidationError::NotPositive { field: "Distance" });
            assert!(tracker.workouts().is_empty());
            assert!(tracker.form().is_open());
            assert!(map.markers.borrow().is_empty());
            assert!(backend.values.borrow().is_empty());
        }
    }

    #[test]
    fn test_empty_duration_rejected_for_both_kinds() {
        for input in [running("5", "", "178"), cycling("5", "", "178")] {
            let (mut tracker, _map, _backend) = setup();
            tracker.show_form(here());

            let err = tracker.submit(&input).unwrap_err();

            assert_eq!(err, ValidationError::NotANumber { field: "Duration" });
            assert!(tracker.workouts().is_empty());
            assert_eq!(tracker.form(), FormState::AwaitingInput { at: here() });
        }
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let (mut tracker, _map, _backend) = setup();
        tracker.show_form(here());

        for input in [
            running("inf", "24", "178"),
            running("5", "NaN", "178"),
            running("5", "24", "abc"),
        ] {
            assert!(matches!(
                tracker.submit(&input),
                Err(ValidationError::NotANumber { .. })
            ));
        }
        assert!(tracker.workouts().is_empty());
    }

    #[test]
    fn test_extra_field_must_be_positive() {
        let (mut tracker, _map, _backend) = setup();
        tracker.show_form(here());

        assert_eq!(
            tracker.submit(&running("5", "24", "-1")).unwrap_err(),
            ValidationError::NotPositive { field: "Cadence" }
        );
        assert_eq!(
            tracker.submit(&cycling("5", "24", "0")).unwrap_err(),
            ValidationError::NotPositive {
                field: "Elevation gain"
            }
        );
        assert!(tracker.workouts().is_empty());
    }

    #[test]
    fn test_unused_extra_field_is_ignored() {
        let (mut tracker, _map, _backend) = setup();
        tracker.show_form(here());

        let mut input = cycling("12", "40", "150");
        input.cadence = "not a number".to_string();
        assert!(tracker.submit(&input).is_ok());
    }

    #[test]
    fn test_submit_without_position() {
        let (mut tracker, _map, _backend) = setup();
        assert_eq!(
            tracker.submit(&running("5", "24", "178")).unwrap_err(),
            ValidationError::NoPosition
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let (mut tracker, _map, _backend) = setup();

        for _ in 0..5 {
            tracker.show_form(here());
            tracker.submit(&running("5", "24", "178")).unwrap();
        }

        let ids: HashSet<_> = tracker.workouts().iter().map(|w| w.id().clone()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_workouts_keep_creation_order() {
        let (mut tracker, _map, _backend) = setup();
        tracker.show_form(here());
        tracker.submit(&running("5", "24", "178")).unwrap();
        tracker.show_form(Coordinates::new(40.0, -8.0));
        tracker.submit(&cycling("20", "60", "300")).unwrap();

        let kinds: Vec<_> = tracker.workouts().iter().map(|w| w.kind()).collect();
        assert_eq!(kinds, vec![ActivityKind::Running, ActivityKind::Cycling]);
    }

    #[test]
    fn test_select_counts_visit_and_pans() {
        let (mut tracker, map, backend) = setup();
        tracker.show_form(here());
        let before = tracker
            .submit(&running("5.2", "24", "178"))
            .unwrap()
            .clone();

        let after = tracker.select(before.id()).unwrap().clone();

        assert_eq!(after.visit_count(), 1);
        assert_eq!(after.id(), before.id());
        assert_eq!(after.coordinates(), before.coordinates());
        assert_eq!(after.metric(), before.metric());
        assert_eq!(after.description(), before.description());
        assert_eq!(after.created_at(), before.created_at());
        assert_eq!(*map.pans.borrow(), vec![(here(), 13)]);
        assert_eq!(saved(&backend)[0].visit_count(), 1);
    }

    #[test]
    fn test_select_unknown_id() {
        let (mut tracker, map, _backend) = setup();
        tracker.show_form(here());
        tracker.submit(&running("5", "24", "178")).unwrap();
        let other = tracker.workouts()[0].id().successor();

        assert!(tracker.select(&other).is_none());
        assert!(map.pans.borrow().is_empty());
    }

    #[test]
    fn test_loads_saved_workouts_and_draws_markers() {
        let (mut tracker, _map, backend) = setup();
        tracker.show_form(here());
        tracker.submit(&running("5", "24", "178")).unwrap();
        tracker.show_form(here());
        tracker.submit(&cycling("20", "60", "300")).unwrap();

        let map = Rc::new(RecordingMap::default());
        let mut reloaded: TestTracker =
            Tracker::new(WorkoutStore::new(backend.clone(), "workouts"), 13);
        assert_eq!(reloaded.workouts(), tracker.workouts());

        reloaded.attach_map(map.clone());
        assert_eq!(map.markers.borrow().len(), 2);
    }

    #[test]
    fn test_reset_clears_storage() {
        let (mut tracker, _map, backend) = setup();
        tracker.show_form(here());
        tracker.submit(&running("5", "24", "178")).unwrap();

        tracker.reset().unwrap();

        assert!(tracker.workouts().is_empty());
        assert!(saved(&backend).is_empty());
    }

    #[test]
    fn test_reset_failure_keeps_workouts() {
        let backend = Rc::new(MemoryStore {
            failing: true,
            ..Default::default()
        });
        let mut tracker: TestTracker =
            Tracker::new(WorkoutStore::new(backend.clone(), "workouts"), 13);
        tracker.show_form(here());
        tracker.submit(&running("5", "24", "178")).unwrap();

        let err = tracker.reset().unwrap_err();

        assert!(matches!(err, StorageError::Write(_)));
        assert_eq!(tracker.workouts().len(), 1);
    }

    #[test]
    fn test_write_failure_keeps_session_usable() {
        let backend = Rc::new(MemoryStore {
            failing: true,
            ..Default::default()
        });
        let mut tracker: TestTracker =
            Tracker::new(WorkoutStore::new(backend.clone(), "workouts"), 13);
        tracker.show_form(here());

        assert!(tracker.submit(&running("5", "24", "178")).is_ok());
        assert_eq!(tracker.workouts().len(), 1);
        assert!(backend.values.borrow().is_empty());
    }

    #[test]
    fn test_map_click_reaches_handler() {
        let map = RecordingMap::default();
        let clicked = Rc::new(std::cell::Cell::new(None));
        let sink = clicked.clone();
        map.on_click(Box::new(move |at| sink.set(Some(at))));

        map.click(here());

        assert_eq!(clicked.get(), Some(here()));
    }
}
