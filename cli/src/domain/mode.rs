//! Run mode selection.

use crate::domain::error::DeployError;

/// Which phases of a deploy execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Build, push, onboard, start.
    Full,
    /// Build and push, then stop.
    BuildOnly,
    /// Pull, onboard, start.
    RunOnly,
}

impl RunMode {
    /// Select the run mode from the two exclusivity flags.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ConflictingModes`] when both flags are set.
    pub fn from_flags(build_only: bool, run_only: bool) -> Result<Self, DeployError> {
        match (build_only, run_only) {
            (true, true) => Err(DeployError::ConflictingModes),
            (true, false) => Ok(Self::BuildOnly),
            (false, true) => Ok(Self::RunOnly),
            (false, false) => Ok(Self::Full),
        }
    }

    /// Whether the build phase (auth check, build, push) runs.
    #[must_use]
    pub fn builds(self) -> bool {
        self != Self::RunOnly
    }

    /// Whether the image is pulled before onboarding.
    ///
    /// Only the run-only entry point pulls; a full run uses the image it just built.
    #[must_use]
    pub fn pulls(self) -> bool {
        self == Self::RunOnly
    }

    /// Whether onboarding and start run after the build phase.
    #[must_use]
    pub fn launches(self) -> bool {
        self != Self::BuildOnly
    }
}
