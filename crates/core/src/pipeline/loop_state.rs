use thiserror::Error;

/// Failures that end a crop run.
///
/// None of these are retried: the remote services are assumed to be either
/// up or gone.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("error receiving frame: {0}")]
    Fetch(#[source] Box<dyn std::error::Error>),
    #[error("error decoding frame {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("error from face detector: {0}")]
    Inference(#[source] Box<dyn std::error::Error>),
}

/// Why the loop stopped.
#[derive(Debug)]
pub enum Termination {
    Cancelled,
    FrameLimitReached(u64),
    Failed(PipelineError),
}

impl Termination {
    pub fn is_failure(&self) -> bool {
        matches!(self, Termination::Failed(_))
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Cancelled => write!(f, "cancelled"),
            Termination::FrameLimitReached(n) => write!(f, "frame limit of {n} reached"),
            Termination::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// `Running` until a step produces a terminal reason; there is no way back.
#[derive(Debug)]
pub enum LoopState {
    Running,
    Terminated(Termination),
}

impl LoopState {
    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }
}
