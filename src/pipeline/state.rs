use crate::boundary::BoundaryWarning;
use crate::build::ArtifactSet;
use crate::domain::VersionSelection;
use crate::error::RelcraftError;
use std::fmt;

/// Release pipeline states; `Published`, `DryRunComplete` and `Aborted` are terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Clean,
    Built,
    Validated,
    SmokeTested,
    VersionSelected,
    Published,
    DryRunComplete,
    /// Error class of the failure, as named by `RelcraftError::kind`
    Aborted(&'static str),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Published | PipelineState::DryRunComplete | PipelineState::Aborted(_)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Clean => write!(f, "Clean"),
            PipelineState::Built => write!(f, "Built"),
            PipelineState::Validated => write!(f, "Validated"),
            PipelineState::SmokeTested => write!(f, "SmokeTested"),
            PipelineState::VersionSelected => write!(f, "VersionSelected"),
            PipelineState::Published => write!(f, "Published"),
            PipelineState::DryRunComplete => write!(f, "DryRunComplete"),
            PipelineState::Aborted(reason) => write!(f, "Aborted({})", reason),
        }
    }
}

/// What a pipeline run did, including the failure if it aborted
#[derive(Debug)]
pub struct PipelineReport {
    pub trail: Vec<PipelineState>,
    pub selection: Option<VersionSelection>,
    pub artifacts: Option<ArtifactSet>,
    pub warnings: Vec<BoundaryWarning>,
    /// File names sent to the index
    pub uploaded: Vec<String>,
    pub error: Option<RelcraftError>,
}

impl PipelineReport {
    pub(crate) fn new() -> Self {
        PipelineReport {
            trail: vec![PipelineState::Clean],
            selection: None,
            artifacts: None,
            warnings: Vec::new(),
            uploaded: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn advance(&mut self, state: PipelineState) {
        self.trail.push(state);
    }

    pub(crate) fn abort(&mut self, error: RelcraftError) {
        self.trail.push(PipelineState::Aborted(error.kind()));
        self.error = Some(error);
    }

    pub fn final_state(&self) -> &PipelineState {
        // trail always starts with Clean
        &self.trail[self.trail.len() - 1]
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.final_state(), PipelineState::Aborted(_))
    }

    /// Whether the run passed through `state`
    pub fn visited(&self, state: &PipelineState) -> bool {
        self.trail.contains(state)
    }
}
