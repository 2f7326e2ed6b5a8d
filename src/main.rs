use std::time::Duration;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use agentic_form::config::BrowserBuilder;
use agentic_form::{
    process_form, InterpreterConfig, InterpreterSynthesizer, OpenAiInterpreter, RuleSynthesizer,
    RunConfig,
};

/// Discover, fill and submit the form at a URL.
#[derive(Debug, Parser)]
#[command(name = "agentic-form", version)]
struct Cli {
    /// Page holding the form.
    url: String,

    /// Safety bound on fill attempts.
    #[arg(long, default_value_t = 30)]
    max_iterations: u32,

    /// Id of the form to drive; falls back to the first form on the page.
    #[arg(long, default_value = "myForm")]
    form_id: String,

    /// Pause after page load and submission, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,

    /// Path injected into file inputs.
    #[arg(long, default_value = "path/to/file.txt")]
    file_path: String,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,

    /// Chrome/Chromium executable.
    #[arg(long)]
    chrome_path: Option<String>,

    /// Ask an OpenAI-compatible model for values (needs OPENAI_API_KEY).
    #[arg(long)]
    ai: bool,

    /// Model used with --ai; overrides AGENTIC_FORM_MODEL.
    #[arg(long, requires = "ai")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> agentic_form::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agentic_form=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let run_config = RunConfig::default()
        .with_max_iterations(cli.max_iterations)
        .with_form_id(cli.form_id)
        .with_settle_delay(Duration::from_millis(cli.settle_ms))
        .with_file_path(cli.file_path);

    let mut browser = BrowserBuilder::new().headless(!cli.headed);
    if let Some(path) = cli.chrome_path {
        browser = browser.chrome_path(path);
    }
    let browser_config = browser.build_config();

    let rules = RuleSynthesizer::new(run_config.file_path.clone());
    let interpreter = if cli.ai {
        let config = InterpreterConfig::from_env();
        if config.is_none() {
            warn!("OPENAI_API_KEY is not set, using rule-based values");
        }
        match (config, cli.model) {
            (Some(config), Some(model)) => Some(config.model(model)),
            (config, _) => config,
        }
    } else {
        None
    };

    let report = match interpreter {
        Some(config) => {
            let synth = InterpreterSynthesizer::new(OpenAiInterpreter::new(config)?, rules);
            process_form(&cli.url, browser_config, &synth, &run_config).await?
        }
        None => process_form(&cli.url, browser_config, &rules, &run_config).await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
