//! Core domain models for the workflow engine.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory. The `db` crate's row structs are converted into them when a
//! workflow is loaded (see `store`), so the execution path never re-inspects
//! untyped fields.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use steps::DataContext;

// ---------------------------------------------------------------------------
// StepType
// ---------------------------------------------------------------------------

/// A step's type tag — an open-but-enumerated set.
///
/// Tags outside the built-in set round-trip through [`StepType::Other`] and
/// pass data through unchanged at execution time, so the tag space can grow
/// without breaking deployed workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    Trigger,
    Parse,
    Filter,
    Action,
    Other(String),
}

impl StepType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trigger => "trigger",
            Self::Parse => "parse",
            Self::Filter => "filter",
            Self::Action => "action",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for StepType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "trigger" => Self::Trigger,
            "parse" => Self::Parse,
            "filter" => Self::Filter,
            "action" => Self::Action,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for StepType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_owned())
    }
}

impl From<StepType> for String {
    fn from(step_type: StepType) -> Self {
        step_type.as_str().to_owned()
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One typed unit of work with free-form configuration and a position in
/// execution order. Orders are dense but not necessarily contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub name: String,
    pub step_type: StepType,
    /// Free-form JSON object; interpreted per step type by the handlers.
    pub payload: serde_json::Value,
    pub step_order: i32,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A named, ordered collection of steps with a webhook identity and an
/// active flag. The engine never deletes workflows; it only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub user_id: Option<Uuid>,
    /// Opaque token used as the external webhook trigger address.
    pub webhook_token: String,
    /// Whether scheduled execution is enabled.
    pub active: bool,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Convenience constructor for testing.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            user_id: None,
            webhook_token: Uuid::new_v4().to_string(),
            active: true,
            steps,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// InvocationSource
// ---------------------------------------------------------------------------

/// How a pipeline run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationSource {
    /// A recurring-timer tick; trigger steps are skipped because the schedule
    /// itself already fired.
    Scheduled,
    /// An inbound webhook call; trigger steps run like any other step.
    Webhook,
}

impl InvocationSource {
    /// The `trigger_type` value seeded into the data context.
    pub fn trigger_type(&self) -> &'static str {
        match self {
            Self::Scheduled => "schedule",
            Self::Webhook => "webhook",
        }
    }
}

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Outcome status of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Failure,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(format!("unknown run status: {other}")),
        }
    }
}

/// The result of one pipeline run. The runner produces this; the caller
/// (scheduler or webhook entry point) writes the execution record.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub message: String,
    pub duration: Duration,
    /// Final data context; present only on success.
    pub context: Option<DataContext>,
}

impl RunReport {
    pub fn success(message: impl Into<String>, duration: Duration, context: DataContext) -> Self {
        Self {
            status: RunStatus::Success,
            message: message.into(),
            duration,
            context: Some(context),
        }
    }

    pub fn failure(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: RunStatus::Failure,
            message: message.into(),
            duration,
            context: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
