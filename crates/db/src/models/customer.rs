//! Customer entity model and DTOs.

use portal_core::progress::{ProgressState, StepStatus};
use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_approved: bool,
    pub approved_at: Option<Timestamp>,
    pub current_phase: String,
    pub completed_phases: Vec<String>,
    pub progress: i32,
    pub onboarding_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Customer {
    /// The customer's progress columns as a [`ProgressState`].
    pub fn progress_state(&self) -> ProgressState {
        ProgressState::from_stored(&self.current_phase, &self.completed_phases, self.progress)
    }
}

/// DTO for creating a customer at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
}

/// Read-only projection of a customer's onboarding progress.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProgress {
    pub customer_id: DbId,
    #[serde(flatten)]
    pub state: ProgressState,
    pub onboarding_completed: bool,
    pub steps: Vec<StepStatus>,
}

impl From<&Customer> for CustomerProgress {
    fn from(customer: &Customer) -> Self {
        let state = customer.progress_state();
        Self {
            customer_id: customer.id,
            steps: state.steps(),
            state,
            onboarding_completed: customer.onboarding_completed,
        }
    }
}
