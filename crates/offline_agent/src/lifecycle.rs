//! Agent lifecycle reducer.
//!
//! The platform drives the agent through install and activation events; this module keeps
//! the resulting phase explicit so fetch handling can refuse to serve before activation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase of one agent build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerPhase {
    /// Not installed, or a previous install attempt failed.
    #[default]
    Uninstalled,
    /// Precaching the manifest.
    Installing,
    /// Precache complete; waiting to activate.
    Installed,
    /// Removing stale generations and claiming clients.
    Activating,
    /// Serving fetches and relaying shares.
    Active,
}

impl WorkerPhase {
    /// Stable kebab-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
        }
    }

    /// Returns whether fetches may be intercepted in this phase.
    pub const fn serves_fetches(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle transitions requested by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// The platform delivered the install event.
    BeginInstall,
    /// Every manifest asset was cached.
    InstallSucceeded,
    /// Precaching failed; the attempt is abandoned.
    InstallFailed,
    /// The platform delivered the activate event.
    BeginActivate,
    /// Cleanup and client claim finished.
    ActivationCompleted,
}

impl LifecycleAction {
    /// Stable snake_case name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeginInstall => "begin_install",
            Self::InstallSucceeded => "install_succeeded",
            Self::InstallFailed => "install_failed",
            Self::BeginActivate => "begin_activate",
            Self::ActivationCompleted => "activation_completed",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle reducer failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The action does not apply to the current phase.
    #[error("lifecycle action `{action}` is not allowed while {phase}")]
    InvalidTransition {
        /// Phase at dispatch time.
        phase: WorkerPhase,
        /// Rejected action.
        action: LifecycleAction,
    },
}

/// Lifecycle state owned by one agent instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleState {
    /// Current phase.
    pub phase: WorkerPhase,
    /// Install attempts seen by this instance, including failed ones.
    pub install_attempts: u32,
}

impl LifecycleState {
    /// State of an instance whose phase was observed from the platform instead of replayed.
    pub const fn resumed(phase: WorkerPhase) -> Self {
        Self {
            phase,
            install_attempts: 0,
        }
    }
}

/// Applies `action` to `state`.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTransition`] and leaves `state` untouched when the
/// action does not apply to the current phase.
pub fn reduce_lifecycle(
    state: &mut LifecycleState,
    action: LifecycleAction,
) -> Result<(), LifecycleError> {
    let next = match (state.phase, action) {
        (WorkerPhase::Uninstalled, LifecycleAction::BeginInstall) => {
            state.install_attempts = state.install_attempts.saturating_add(1);
            WorkerPhase::Installing
        }
        (WorkerPhase::Installing, LifecycleAction::InstallSucceeded) => WorkerPhase::Installed,
        (WorkerPhase::Installing, LifecycleAction::InstallFailed) => WorkerPhase::Uninstalled,
        (WorkerPhase::Installed, LifecycleAction::BeginActivate) => WorkerPhase::Activating,
        (WorkerPhase::Activating, LifecycleAction::ActivationCompleted) => WorkerPhase::Active,
        (phase, action) => return Err(LifecycleError::InvalidTransition { phase, action }),
    };
    state.phase = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(actions: &[LifecycleAction]) -> Result<LifecycleState, LifecycleError> {
        let mut state = LifecycleState::default();
        for action in actions {
            reduce_lifecycle(&mut state, *action)?;
        }
        Ok(state)
    }

    #[test]
    fn happy_path_reaches_active() {
        let state = run(&[
            LifecycleAction::BeginInstall,
            LifecycleAction::InstallSucceeded,
            LifecycleAction::BeginActivate,
            LifecycleAction::ActivationCompleted,
        ])
        .expect("valid sequence");
        assert_eq!(state.phase, WorkerPhase::Active);
        assert_eq!(state.install_attempts, 1);
        assert!(state.phase.serves_fetches());
    }

    #[test]
    fn failed_install_allows_retry() {
        let state = run(&[
            LifecycleAction::BeginInstall,
            LifecycleAction::InstallFailed,
            LifecycleAction::BeginInstall,
        ])
        .expect("retry allowed");
        assert_eq!(state.phase, WorkerPhase::Installing);
        assert_eq!(state.install_attempts, 2);
    }

    #[test]
    fn activation_before_install_is_rejected() {
        let mut state = LifecycleState::default();
        let err = reduce_lifecycle(&mut state, LifecycleAction::BeginActivate)
            .expect_err("must install first");
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                phase: WorkerPhase::Uninstalled,
                action: LifecycleAction::BeginActivate,
            }
        );
        assert_eq!(state, LifecycleState::default());
        assert_eq!(
            err.to_string(),
            "lifecycle action `begin_activate` is not allowed while uninstalled"
        );
    }

    #[test]
    fn only_active_phase_serves_fetches() {
        for phase in [
            WorkerPhase::Uninstalled,
            WorkerPhase::Installing,
            WorkerPhase::Installed,
            WorkerPhase::Activating,
        ] {
            assert!(!phase.serves_fetches(), "{phase} must not serve");
        }
    }

    #[test]
    fn resumed_active_instance_rejects_reinstall() {
        let mut state = LifecycleState::resumed(WorkerPhase::Active);
        assert!(reduce_lifecycle(&mut state, LifecycleAction::BeginInstall).is_err());
        assert_eq!(state.phase, WorkerPhase::Active);
    }
}
