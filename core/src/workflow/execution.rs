// trattoria/src/workflow/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their handlers.

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::pipeline::{Phase, Pipeline};
use crate::error::WorkflowError;
use tracing::{event, info_span, Instrument, Level};

/// What a single step produced.
enum StepOutcome {
  Continue,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// A non-optional step without any handler fails the run with
  /// `WorkflowError::HandlerMissing`, converted into `Err`.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(
      Level::DEBUG,
      context_type = std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
      "Pipeline execution starting."
    );

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = info_span!(
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(&ctx_data) {
          step_span.in_scope(|| event!(Level::DEBUG, "Step skipped by its skip condition."));
          continue;
        }
      }

      let has_handlers = Phase::ORDER
        .iter()
        .any(|phase| !self.handlers_for(&step_def.name, *phase).is_empty());
      if !has_handlers {
        if step_def.optional {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        step_span.in_scope(|| event!(Level::ERROR, "Non-optional step has no handlers."));
        return Err(Err::from(WorkflowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      match self
        .run_step(&step_def.name, &ctx_data)
        .instrument(step_span)
        .await?
      {
        StepOutcome::Continue => {}
        StepOutcome::Stopped => return Ok(PipelineResult::Stopped),
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_name: &str, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    for phase in Phase::ORDER {
      for handler_fn in self.handlers_for(step_name, phase) {
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, phase = phase.label(), "Pipeline stopped by a handler.");
            return Ok(StepOutcome::Stopped);
          }
          Err(e) => {
            event!(Level::WARN, phase = phase.label(), error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }
    event!(Level::DEBUG, "Step finished.");
    Ok(StepOutcome::Continue)
  }
}
