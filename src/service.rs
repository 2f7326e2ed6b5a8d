//! "Process a form at a URL": browser lifecycle around one orchestrated run.

use serde::Serialize;
use tracing::{info, warn};

use crate::browser::AgenticBrowser;
use crate::catalog::FieldValue;
use crate::config::{BrowserConfig, RunConfig};
use crate::driver::FormDriver;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::state::RunState;
use crate::synth::ValueSynthesizer;

/// One field of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledField {
    pub label: String,
    pub value: Option<FieldValue>,
    pub filled: bool,
}

/// Outcome of a run as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormReport {
    /// The run reached `Done`. Unfilled fields do not make this false.
    pub success: bool,
    pub submission_succeeded: bool,
    pub iterations: u32,
    pub filled_fields: Vec<FilledField>,
}

impl From<&RunState> for FormReport {
    fn from(state: &RunState) -> Self {
        Self {
            success: state.submission_attempted,
            submission_succeeded: state.submission_succeeded.unwrap_or(false),
            iterations: state.iteration_count,
            filled_fields: state
                .fields
                .iter()
                .map(|f| FilledField {
                    label: f.label.clone(),
                    value: f.value.clone(),
                    filled: f.filled,
                })
                .collect(),
        }
    }
}

/// Run the loop on a driver already pointed at `url`.
pub async fn run_on<D, S>(driver: &D, synthesizer: &S, url: &str, config: &RunConfig) -> RunState
where
    D: FormDriver,
    S: ValueSynthesizer,
{
    let state = RunState::new(url, config.max_iterations);
    Orchestrator::new(driver, synthesizer, config).run(state).await
}

/// Navigate `driver` to `url`, let the page settle, and run the loop.
///
/// Navigation failure is the only error; everything after it is folded into
/// the returned state.
pub async fn process_with<D, S>(
    driver: &D,
    synthesizer: &S,
    url: &str,
    config: &RunConfig,
) -> Result<RunState>
where
    D: FormDriver,
    S: ValueSynthesizer,
{
    driver.navigate(url).await?;
    tokio::time::sleep(config.settle_delay).await;
    info!(url, "page loaded");
    Ok(run_on(driver, synthesizer, url, config).await)
}

/// Launch a browser, process the form at `url`, and close the browser on
/// every exit path.
pub async fn process_form<S: ValueSynthesizer>(
    url: &str,
    browser_config: BrowserConfig,
    synthesizer: &S,
    config: &RunConfig,
) -> Result<FormReport> {
    let browser = AgenticBrowser::launch(browser_config).await?;

    let outcome = match browser.new_page("about:blank").await {
        Ok(page) => process_with(&page, synthesizer, url, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = browser.close().await {
        warn!(error = %e, "failed to close browser");
    }

    let state = outcome?;
    Ok(FormReport::from(&state))
}
