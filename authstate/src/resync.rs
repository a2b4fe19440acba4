//! Visibility resync policy.
//!
//! TRADE-OFFS
//! ==========
//! An anonymous, settled tab skips the round-trip entirely so returning to it
//! never flashes a loading state. A transport failure during refresh keeps the
//! previous user: a network blip should not sign anyone out.

#[cfg(test)]
#[path = "resync_test.rs"]
mod resync_test;

use crate::provider::ProviderError;
use crate::reconcile::Reconciliation;
use crate::state::{AuthAction, AuthState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResyncPlan {
    Skip,
    Refresh,
}

/// Decide whether a tab that just became visible needs reconciling.
#[must_use]
pub fn plan(state: &AuthState) -> ResyncPlan {
    if state.user.is_none() && !state.loading {
        ResyncPlan::Skip
    } else {
        ResyncPlan::Refresh
    }
}

/// Turn a refresh outcome into the action to apply, given the state from
/// before the refresh started.
#[must_use]
pub fn settle(previous: &AuthState, outcome: Result<Reconciliation, ProviderError>) -> AuthAction {
    match outcome {
        Ok(result) => result.into(),
        Err(_) if previous.user.is_some() => AuthAction::SetLoading(false),
        Err(_) => Reconciliation::anonymous().into(),
    }
}
