use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;

/// Mutable session record for one form-filling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub url: String,
    pub fields: FieldCatalog,
    pub current_field_id: Option<String>,
    /// Set once a submit action has been issued, whatever its outcome.
    pub submission_attempted: bool,
    /// Outcome of the submit click, once attempted.
    pub submission_succeeded: Option<bool>,
    pub iteration_count: u32,
    pub max_iterations: u32,
}

impl RunState {
    pub fn new(url: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            url: url.into(),
            fields: FieldCatalog::new(),
            current_field_id: None,
            submission_attempted: false,
            submission_succeeded: None,
            iteration_count: 0,
            max_iterations,
        }
    }

    pub fn iterations_exhausted(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }

    /// Whether the loop should stop iterating and submit.
    pub fn has_converged(&self) -> bool {
        self.fields.first_unfilled().is_none()
            || self.submission_attempted
            || self.iterations_exhausted()
    }
}
