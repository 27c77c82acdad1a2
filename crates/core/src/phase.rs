//! Onboarding phase model.
//!
//! A single ordered table ([`PHASES`]) is the only source for both a
//! phase's completion percentage and its ordinal position, so the two can
//! never drift apart. Lookups by name are lenient: an unrecognized or empty
//! phase name is treated as "just started" (the first phase).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Phase enumeration
// ---------------------------------------------------------------------------

/// One stage of the customer lifecycle.
///
/// Variant order matches [`PHASES`]; `Ord` therefore follows the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Onboarding,
    Landingpage,
    Ads,
    Whatsapp,
    Webinar,
}

/// Static description of a phase: its completion percentage and display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseDescriptor {
    pub phase: Phase,
    pub percent: u8,
    pub label: &'static str,
}

/// The lifecycle in order. Ordinals are 1-based positions in this table.
pub const PHASES: &[PhaseDescriptor] = &[
    PhaseDescriptor {
        phase: Phase::Onboarding,
        percent: 20,
        label: "Onboarding",
    },
    PhaseDescriptor {
        phase: Phase::Landingpage,
        percent: 40,
        label: "Landing Page",
    },
    PhaseDescriptor {
        phase: Phase::Ads,
        percent: 60,
        label: "Ads",
    },
    PhaseDescriptor {
        phase: Phase::Whatsapp,
        percent: 80,
        label: "WhatsApp",
    },
    PhaseDescriptor {
        phase: Phase::Webinar,
        percent: 100,
        label: "Webinar",
    },
];

/// Progress reported once the final phase has been completed.
pub const COMPLETE_PERCENT: u8 = 100;

impl Phase {
    /// The first phase every new customer starts in.
    pub const FIRST: Phase = Phase::Onboarding;

    /// The terminal phase of the lifecycle.
    pub const LAST: Phase = Phase::Webinar;

    /// Parse a phase name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        PHASES
            .iter()
            .map(|d| d.phase)
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    /// Parse a phase name, falling back to [`Phase::FIRST`] for anything
    /// unrecognized.
    pub fn parse_lenient(name: &str) -> Self {
        Self::parse(name).unwrap_or(Self::FIRST)
    }

    /// Parse a phase name supplied by a client, rejecting unknown values.
    pub fn parse_strict(name: &str) -> Result<Self, CoreError> {
        Self::parse(name).ok_or_else(|| {
            let valid: Vec<&str> = PHASES.iter().map(|d| d.phase.as_str()).collect();
            CoreError::Validation(format!(
                "Invalid phase '{name}'. Must be one of: {}",
                valid.join(", ")
            ))
        })
    }

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Landingpage => "landingpage",
            Self::Ads => "ads",
            Self::Whatsapp => "whatsapp",
            Self::Webinar => "webinar",
        }
    }

    pub fn descriptor(self) -> &'static PhaseDescriptor {
        &PHASES[self.index()]
    }

    /// 1-based position in the lifecycle.
    pub fn ordinal(self) -> u32 {
        self.index() as u32 + 1
    }

    pub fn percent(self) -> u8 {
        self.descriptor().percent
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    /// The phase that follows this one, or `None` for the last phase.
    pub fn next(self) -> Option<Self> {
        PHASES.get(self.index() + 1).map(|d| d.phase)
    }

    /// The phase that precedes this one, or `None` for the first phase.
    pub fn previous(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|i| PHASES.get(i))
            .map(|d| d.phase)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Name-based lookups
// ---------------------------------------------------------------------------

/// Completion percentage for a phase name. Unknown names map to the first
/// phase's percentage.
pub fn percent_for(phase_name: &str) -> u8 {
    Phase::parse_lenient(phase_name).percent()
}

/// Whether the 1-based `step_index` has been reached by a customer sitting
/// in `phase_name`. Unknown names are treated as ordinal 1.
pub fn is_step_reached(step_index: u32, phase_name: &str) -> bool {
    step_index <= Phase::parse_lenient(phase_name).ordinal()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
