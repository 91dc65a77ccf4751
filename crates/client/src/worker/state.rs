//! Worker lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Constructed, install not attempted yet.
    #[default]
    Parsed,
    /// Precache in progress.
    Installing,
    /// Precache stored; waiting to activate.
    Installed,
    /// Dropping old generations.
    Activating,
    /// Controlling clients and intercepting fetches.
    Activated,
    /// Install failed; this version never activates.
    Redundant,
}

impl WorkerState {
    pub fn can_intercept_fetch(self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// States from which `install` may run. A redundant version may retry.
    pub fn can_install(self) -> bool {
        matches!(self, WorkerState::Parsed | WorkerState::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}
