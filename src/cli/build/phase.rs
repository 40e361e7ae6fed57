//! Build phase state machine.
//!
//! ```text
//! Pending -> Cleaned -> Prepared -> EntryPointsFound -> Bundled -> ManifestBuilt
//!         -> AssetsCopied -> HtmlRewritten -> ManifestWritten -> Done
//!
//! any step --error--> Failed
//! ```

use std::fmt;

use thiserror::Error;

use crate::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Pending,
    Cleaned,
    Prepared,
    EntryPointsFound,
    Bundled,
    ManifestBuilt,
    AssetsCopied,
    HtmlRewritten,
    ManifestWritten,
    Done,
    Failed,
}

impl BuildPhase {
    /// The phase reached by the next successful step.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Cleaned),
            Self::Cleaned => Some(Self::Prepared),
            Self::Prepared => Some(Self::EntryPointsFound),
            Self::EntryPointsFound => Some(Self::Bundled),
            Self::Bundled => Some(Self::ManifestBuilt),
            Self::ManifestBuilt => Some(Self::AssetsCopied),
            Self::AssetsCopied => Some(Self::HtmlRewritten),
            Self::HtmlRewritten => Some(Self::ManifestWritten),
            Self::ManifestWritten => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// What the step leading into this phase does.
    pub const fn step(self) -> &'static str {
        match self {
            Self::Pending => "starting",
            Self::Cleaned => "cleaning the output directory",
            Self::Prepared => "creating the output directory",
            Self::EntryPointsFound => "discovering entry points",
            Self::Bundled => "bundling entry points",
            Self::ManifestBuilt => "building the manifest",
            Self::AssetsCopied => "copying assets",
            Self::HtmlRewritten => "rewriting HTML documents",
            Self::ManifestWritten => "writing the manifest",
            Self::Done => "finishing",
            Self::Failed => "failing",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleaned => "cleaned",
            Self::Prepared => "prepared",
            Self::EntryPointsFound => "entry-points-found",
            Self::Bundled => "bundled",
            Self::ManifestBuilt => "manifest-built",
            Self::AssetsCopied => "assets-copied",
            Self::HtmlRewritten => "html-rewritten",
            Self::ManifestWritten => "manifest-written",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step failed; `phase` is the phase it was meant to reach.
#[derive(Debug, Error)]
#[error("build failed while {}", .phase.step())]
pub struct PhaseError {
    pub phase: BuildPhase,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

/// Drives a build through its phases in order.
#[derive(Debug)]
pub struct PhaseTracker {
    phase: BuildPhase,
}

impl PhaseTracker {
    pub const fn new() -> Self {
        Self {
            phase: BuildPhase::Pending,
        }
    }

    pub const fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Run the work leading into the next phase.
    ///
    /// On success the tracker moves forward; on error it becomes `Failed`
    /// and the error is wrapped with the phase that was not reached.
    pub fn advance<T, E>(&mut self, work: impl FnOnce() -> Result<T, E>) -> Result<T, PhaseError>
    where
        E: Into<anyhow::Error>,
    {
        let Some(target) = self.phase.next() else {
            return Err(self.fail(
                self.phase,
                anyhow::anyhow!("no step follows phase `{}`", self.phase),
            ));
        };

        match work() {
            Ok(value) => {
                debug!("build"; "{} -> {}", self.phase, target);
                self.phase = target;
                Ok(value)
            }
            Err(err) => Err(self.fail(target, err.into())),
        }
    }

    fn fail(&mut self, phase: BuildPhase, err: anyhow::Error) -> PhaseError {
        debug!("build"; "{} -> {} ({})", self.phase, BuildPhase::Failed, phase.step());
        self.phase = BuildPhase::Failed;
        PhaseError {
            phase,
            source: err.into(),
        }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
