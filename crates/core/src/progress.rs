//! Per-customer progress transitions.
//!
//! [`ProgressState`] is the in-memory form of a customer's `current_phase`,
//! `completed_phases`, and `progress` columns. Transitions are pure; the
//! repository layer locks the customer row, applies a transition, and writes
//! the result back.
//!
//! Invariants upheld by every transition:
//! - `completed_phases` is a set and only ever grows.
//! - `progress` never decreases.
//! - `current_phase` never moves backwards.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::phase::{is_step_reached, Phase, COMPLETE_PERCENT, PHASES};

/// A customer's onboarding progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub current_phase: Phase,
    pub completed_phases: BTreeSet<Phase>,
    pub progress: u8,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::initial()
    }
}

impl ProgressState {
    /// State of a freshly registered customer.
    pub fn initial() -> Self {
        Self {
            current_phase: Phase::FIRST,
            completed_phases: BTreeSet::new(),
            progress: Phase::FIRST.percent(),
        }
    }

    /// Rebuild state from stored column values.
    ///
    /// Unknown completed-phase names are dropped and duplicates collapse.
    /// A stored `progress` below the current phase's percentage is lifted to
    /// it; values above 100 are clamped.
    pub fn from_stored(current_phase: &str, completed_phases: &[String], progress: i32) -> Self {
        let current_phase = Phase::parse_lenient(current_phase);
        let completed_phases = completed_phases
            .iter()
            .filter_map(|name| Phase::parse(name))
            .collect();
        let stored = progress.clamp(0, i32::from(COMPLETE_PERCENT)) as u8;
        Self {
            current_phase,
            completed_phases,
            progress: stored.max(current_phase.percent()),
        }
    }

    /// Move to `target`, recording its predecessor as completed.
    ///
    /// Targets at or before the current phase leave `current_phase` and
    /// `progress` unchanged; the predecessor is still recorded, which is a
    /// no-op when it is already present.
    pub fn advance_to(&self, target: Phase) -> Self {
        let mut next = self.clone();
        if let Some(prev) = target.previous() {
            next.completed_phases.insert(prev);
        }
        next.current_phase = next.current_phase.max(target);
        next.progress = next.progress.max(target.percent());
        next
    }

    /// Mark `phase` as completed and move on to the phase after it.
    ///
    /// Completing the last phase is the terminal transition: the customer
    /// stays in the last phase with progress at 100.
    pub fn complete(&self, phase: Phase) -> Self {
        match phase.next() {
            Some(successor) => self.advance_to(successor),
            None => {
                let mut next = self.clone();
                next.completed_phases.insert(phase);
                next.current_phase = next.current_phase.max(phase);
                next.progress = COMPLETE_PERCENT;
                next
            }
        }
    }

    pub fn is_completed(&self, phase: Phase) -> bool {
        self.completed_phases.contains(&phase)
    }

    /// Completed phase names in lifecycle order, for storage.
    pub fn completed_names(&self) -> Vec<String> {
        self.completed_phases
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    /// Status of every step in the lifecycle, for the dashboard stepper.
    pub fn steps(&self) -> Vec<StepStatus> {
        PHASES
            .iter()
            .map(|d| StepStatus {
                phase: d.phase,
                label: d.label,
                percent: d.percent,
                reached: is_step_reached(d.phase.ordinal(), self.current_phase.as_str()),
                completed: self.is_completed(d.phase),
            })
            .collect()
    }
}

/// One entry of the dashboard stepper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub phase: Phase,
    pub label: &'static str,
    pub percent: u8,
    pub reached: bool,
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
