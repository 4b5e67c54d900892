// trattoria/src/workflow/mod.rs

//! A small asynchronous step pipeline.
//!
//! A `Pipeline<TData, Err>` is an ordered list of named steps. Each step may carry
//! `before`, `on`, and `after` handlers that receive a shared `ContextData<TData>`.
//! Handlers return `PipelineControl` to continue or halt the run, or an `Err` to abort it.
//! Steps can be optional (no handlers is fine) and can carry a skip condition.

pub mod context_data;
pub mod control;
pub mod execution;
pub mod pipeline;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use pipeline::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
