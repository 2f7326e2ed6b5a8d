//! The discovery-fill-submit loop.
//!
//! ```text
//! Scanning -> Selecting -> Synthesizing -> Filling -> Scanning ...
//!                 |
//!                 +-> Submitting -> Done
//! ```
//!
//! The page is re-scanned before every selection because filling a field can
//! reveal new ones. `max_iterations` bounds the number of fill attempts, so
//! the loop always reaches `Done`.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::FieldValue;
use crate::config::RunConfig;
use crate::driver::{FormDriver, FormElement, SUBMIT_SELECTORS};
use crate::error::{Error, Result};
use crate::interact;
use crate::scanner;
use crate::state::RunState;
use crate::synth::ValueSynthesizer;

/// Loop states. Data picked up in one phase travels to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Scanning,
    Selecting,
    Synthesizing { field_id: String },
    Filling { field_id: String, value: FieldValue },
    Submitting,
    Done,
}

pub struct Orchestrator<'a, D, S> {
    driver: &'a D,
    synthesizer: &'a S,
    form_id: String,
    settle_delay: Duration,
}

impl<'a, D: FormDriver, S: ValueSynthesizer> Orchestrator<'a, D, S> {
    pub fn new(driver: &'a D, synthesizer: &'a S, config: &RunConfig) -> Self {
        Self {
            driver,
            synthesizer,
            form_id: config.form_id.clone(),
            settle_delay: config.settle_delay,
        }
    }

    /// Drive `state` from `Scanning` to `Done`. Never fails; partial fills
    /// are reported through the returned state.
    pub async fn run(&self, mut state: RunState) -> RunState {
        let mut phase = Phase::Scanning;
        while phase != Phase::Done {
            phase = self.step(&mut state, phase).await;
        }
        info!(
            iterations = state.iteration_count,
            unfilled = state.fields.unfilled_count(),
            submitted = ?state.submission_succeeded,
            "form run finished"
        );
        state
    }

    /// Execute one phase and return the next.
    pub async fn step(&self, state: &mut RunState, phase: Phase) -> Phase {
        match phase {
            Phase::Scanning => {
                scanner::scan(self.driver, state, &self.form_id).await;
                Phase::Selecting
            }
            Phase::Selecting => self.select(state),
            Phase::Synthesizing { field_id } => {
                let Some(field) = state.fields.get(&field_id) else {
                    return Phase::Scanning;
                };
                let value = self.synthesizer.synthesize(field).await;
                debug!(field = %field.label, value = %value, "synthesized value");
                Phase::Filling { field_id, value }
            }
            Phase::Filling { field_id, value } => {
                if let Some(field) = state.fields.get_mut(&field_id) {
                    interact::apply(self.driver, field, value).await;
                }
                state.iteration_count += 1;
                Phase::Scanning
            }
            Phase::Submitting => {
                let submitted = match self.submit().await {
                    Ok(()) => {
                        info!("form submitted");
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, "form submission failed");
                        false
                    }
                };
                state.submission_attempted = true;
                state.submission_succeeded = Some(submitted);
                Phase::Done
            }
            Phase::Done => Phase::Done,
        }
    }

    fn select(&self, state: &mut RunState) -> Phase {
        if state.iterations_exhausted() {
            warn!(
                max_iterations = state.max_iterations,
                unfilled = state.fields.unfilled_count(),
                "iteration limit reached, submitting as is"
            );
            return Phase::Submitting;
        }
        if state.has_converged() {
            return Phase::Submitting;
        }
        match state.fields.first_unfilled() {
            Some(field) => {
                info!(field = %field.label, id = %field.id, "selected field");
                let field_id = field.id.clone();
                state.current_field_id = Some(field_id.clone());
                Phase::Synthesizing { field_id }
            }
            None => Phase::Submitting,
        }
    }

    /// Click the form's submit control, then let the page settle.
    async fn submit(&self) -> Result<()> {
        let form = scanner::locate_form(self.driver, &self.form_id).await?;
        let mut last_err = None;
        for selector in SUBMIT_SELECTORS {
            match form.find_all(selector).await {
                Ok(mut found) if !found.is_empty() => {
                    let button = found.remove(0);
                    button.click().await?;
                    tokio::time::sleep(self.settle_delay).await;
                    return Ok(());
                }
                Ok(_) => debug!(selector, "no submit control"),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::ElementNotFound("submit control".into())))
    }
}
