//! `steps` crate — the `StepHandler` trait and built-in step implementations.
//!
//! Every step type — built-in and future extensions alike — is executed
//! through [`StepHandler`]. The engine crate dispatches on the step's type
//! tag via a registry of trait objects, so new step types are added without
//! touching the pipeline runner.

pub mod action;
pub mod context;
pub mod error;
pub mod filter;
pub mod mock;
pub mod parse;
pub mod traits;
pub mod trigger;

pub use action::{ActionHandler, ActionRequest, ActionSink, LogSink};
pub use context::DataContext;
pub use error::StepError;
pub use filter::{ConditionPredicate, FilterHandler};
pub use parse::{FormatParser, ParseHandler};
pub use traits::{StepHandler, StepPayload};
pub use trigger::TriggerHandler;
