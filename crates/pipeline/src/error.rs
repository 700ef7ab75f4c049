//! Stage Error
//!
//! Every failure surfacing from a stage is folded into one error kind that
//! remembers which stage failed and where in the source it was caught.

use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Logging,
    Ingest,
    Transform,
    Select,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Logging => "logging",
            Stage::Ingest => "ingest",
            Stage::Transform => "transform",
            Stage::Select => "select",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal pipeline failure
#[derive(Debug, Error)]
#[error("error in stage [{stage}] at {file}:{line}: {message}")]
pub struct PipelineError {
    pub stage: Stage,
    /// Message of the originating error, including its causes
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}

impl PipelineError {
    /// Wrap `err`, recording the caller's location
    #[track_caller]
    pub fn new(stage: Stage, err: impl std::error::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            // Many variants already embed their source in the message.
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::from_message(stage, message)
    }

    #[track_caller]
    pub fn from_message(stage: Stage, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            stage,
            message: message.into(),
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Attach a stage to a fallible result
pub trait StageContext<T> {
    fn in_stage(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T, E: std::error::Error> StageContext<T> for Result<T, E> {
    #[track_caller]
    fn in_stage(self, stage: Stage) -> Result<T, PipelineError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(PipelineError::new(stage, err)),
        }
    }
}
