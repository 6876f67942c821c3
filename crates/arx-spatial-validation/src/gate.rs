//! Persistence gate: the last step before an anchor update reaches storage.
//!
//! A candidate observation is validated first.  A valid candidate is only
//! written when it tells the building model something new: there is no prior
//! observation, the previous one has expired, or the position moved into a
//! different grid cell.  Everything else is jitter and is skipped.

use arx_spatial_transform::MovementFilter;
use arx_spatial_types::{LocalCoordinate, SpatialAnchor, ValidationError};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::validator::SpatialValidator;

/// Why a candidate was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReason {
    FirstObservation,
    PreviousExpired,
    CellChanged,
}

/// Outcome of [`PersistenceGate::evaluate_anchor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistDecision {
    Write(WriteReason),
    Skip,
}

impl PersistDecision {
    pub fn should_write(&self) -> bool {
        matches!(self, PersistDecision::Write(_))
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceGate {
    validator: SpatialValidator,
    filter: MovementFilter,
}

impl PersistenceGate {
    pub fn new(validator: SpatialValidator, filter: MovementFilter) -> Self {
        Self { validator, filter }
    }

    pub fn validator(&self) -> &SpatialValidator {
        &self.validator
    }

    pub fn filter(&self) -> &MovementFilter {
        &self.filter
    }

    pub fn evaluate_anchor(
        &self,
        previous: Option<&SpatialAnchor>,
        candidate: &SpatialAnchor,
    ) -> Result<PersistDecision, ValidationError> {
        self.evaluate_anchor_at(previous, candidate, Utc::now())
    }

    /// Validate `candidate` as of `now`, then decide whether it replaces
    /// `previous`.
    pub fn evaluate_anchor_at(
        &self,
        previous: Option<&SpatialAnchor>,
        candidate: &SpatialAnchor,
        now: DateTime<Utc>,
    ) -> Result<PersistDecision, ValidationError> {
        self.validator.validate_spatial_anchor_at(candidate, now)?;

        let decision = match previous {
            None => PersistDecision::Write(WriteReason::FirstObservation),
            Some(prev) if prev.is_expired_at(now, self.validator.config().max_age()) => {
                PersistDecision::Write(WriteReason::PreviousExpired)
            }
            Some(prev) => self.evaluate_position(&prev.position, &candidate.position),
        };

        debug!(anchor_id = %candidate.id, ?decision, "persistence decision");
        Ok(decision)
    }

    /// Movement-only decision for an entity that has already been validated.
    pub fn evaluate_position(&self, old: &LocalCoordinate, new: &LocalCoordinate) -> PersistDecision {
        if self.filter.is_significant(old, new) {
            PersistDecision::Write(WriteReason::CellChanged)
        } else {
            trace!("position unchanged at grid resolution");
            PersistDecision::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidatorConfig;
    use arx_spatial_transform::{CoordinateTransformer, TransformParams};
    use arx_spatial_types::{FailureClass, Platform, Wgs84Coordinate};
    use chrono::Duration;

    const ORIGIN: Wgs84Coordinate = Wgs84Coordinate {
        latitude: 40.7484,
        longitude: -73.9857,
        altitude: 0.0,
    };

    fn gate(transformer: &CoordinateTransformer) -> PersistenceGate {
        PersistenceGate::new(
            SpatialValidator::new(ValidatorConfig::default()),
            transformer.movement_filter(),
        )
    }

    fn at(position: LocalCoordinate, confidence: f64, now: DateTime<Utc>) -> SpatialAnchor {
        SpatialAnchor::capture_at("empire", position, confidence, now).with_platform(Platform::ARKit)
    }

    #[test]
    fn end_to_end_gps_fix_to_persisted_anchor() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let system = transformer.transform(&Wgs84Coordinate::new(40.7485, -73.9857, 0.0));

        assert!(system.local.x.abs() < 1e-6);
        assert!((system.local.y - 11_119.49).abs() < 0.01);
        assert_eq!(system.grid.y, 22);

        let now = Utc::now();
        let g = gate(&transformer);

        let confident = at(system.local, 0.9, now);
        assert_eq!(
            g.evaluate_anchor_at(None, &confident, now).unwrap(),
            PersistDecision::Write(WriteReason::FirstObservation)
        );

        let doubtful = at(system.local, 0.3, now);
        let err = g.evaluate_anchor_at(None, &doubtful, now).unwrap_err();
        assert!(matches!(err, ValidationError::BelowConfidence { .. }));
        assert_eq!(err.class(), FailureClass::Stale);
        assert!(err.to_string().contains("below the minimum threshold"));
    }

    #[test]
    fn jitter_within_cell_is_skipped() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let g = gate(&transformer);
        let now = Utc::now();

        let prev = at(LocalCoordinate::new(1_100.0, 2_100.0, 0.0), 0.9, now - Duration::minutes(5));
        let next = at(LocalCoordinate::new(1_300.0, 2_300.0, 0.0), 0.9, now);
        let decision = g.evaluate_anchor_at(Some(&prev), &next, now).unwrap();
        assert_eq!(decision, PersistDecision::Skip);
        assert!(!decision.should_write());
    }

    #[test]
    fn crossing_a_cell_is_written() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let g = gate(&transformer);
        let now = Utc::now();

        let prev = at(LocalCoordinate::new(1_100.0, 2_100.0, 0.0), 0.9, now - Duration::minutes(5));
        let next = at(LocalCoordinate::new(1_600.0, 2_100.0, 0.0), 0.9, now);
        assert_eq!(
            g.evaluate_anchor_at(Some(&prev), &next, now).unwrap(),
            PersistDecision::Write(WriteReason::CellChanged)
        );
    }

    #[test]
    fn floor_change_is_written() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let g = gate(&transformer);
        let old = LocalCoordinate::new(0.0, 0.0, 2_900.0);
        let new = LocalCoordinate::new(0.0, 0.0, 3_100.0);
        assert_eq!(g.evaluate_position(&old, &new), PersistDecision::Write(WriteReason::CellChanged));
    }

    #[test]
    fn expired_previous_forces_write() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let g = gate(&transformer);
        let now = Utc::now();

        let p = LocalCoordinate::new(1_100.0, 2_100.0, 0.0);
        let prev = at(p, 0.9, now - Duration::hours(30));
        let next = at(p, 0.9, now);
        assert_eq!(
            g.evaluate_anchor_at(Some(&prev), &next, now).unwrap(),
            PersistDecision::Write(WriteReason::PreviousExpired)
        );
    }

    #[test]
    fn invalid_candidate_is_never_written() {
        let transformer = CoordinateTransformer::new(TransformParams::new(ORIGIN, 0.0));
        let g = gate(&transformer);
        let now = Utc::now();

        let stale = at(LocalCoordinate::origin(), 0.9, now - Duration::hours(25));
        let err = g.evaluate_anchor_at(None, &stale, now).unwrap_err();
        assert!(matches!(err, ValidationError::Expired { .. }));
    }

    #[test]
    fn coarser_grid_absorbs_larger_moves() {
        let params = TransformParams::new(ORIGIN, 0.0).grid_scale(2.0);
        let transformer = CoordinateTransformer::new(params);
        let g = gate(&transformer);
        let old = LocalCoordinate::new(100.0, 100.0, 0.0);
        let new = LocalCoordinate::new(1_500.0, 1_900.0, 0.0);
        assert_eq!(g.evaluate_position(&old, &new), PersistDecision::Skip);
    }
}
