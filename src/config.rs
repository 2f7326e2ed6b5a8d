use std::time::Duration;

use crate::browser::AgenticBrowser;
use crate::error::Result;

/// Chromium launch options.
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<AgenticBrowser> {
        AgenticBrowser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Knobs for one discovery-fill-submit run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Safety bound on scan-select-fill cycles.
    pub max_iterations: u32,
    /// Id of the form to drive; the page's first `<form>` is used when absent.
    pub form_id: String,
    /// Pause after page-affecting actions (initial load, submission).
    pub settle_delay: Duration,
    /// Path injected into `file` inputs.
    pub file_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            form_id: "myForm".to_string(),
            settle_delay: Duration::from_secs(2),
            file_path: "path/to/file.txt".to_string(),
        }
    }
}

impl RunConfig {
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = form_id.into();
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }
}

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_INTERPRETER_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the AI-backed value interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request bound so a stalled endpoint cannot hold the loop.
    pub timeout: Duration,
}

impl InterpreterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            timeout: DEFAULT_INTERPRETER_TIMEOUT,
        }
    }

    /// Reads `OPENAI_API_KEY` (required), `OPENAI_API_URL` and `AGENTIC_FORM_MODEL`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("OPENAI_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = std::env::var("AGENTIC_FORM_MODEL") {
            config.model = model;
        }
        Some(config)
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
