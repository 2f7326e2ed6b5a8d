pub mod browser;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod element;
pub mod error;
pub mod interact;
pub mod orchestrator;
pub mod page;
pub mod scanner;
pub mod service;
pub mod state;
pub mod synth;

pub use browser::AgenticBrowser;
pub use catalog::{Field, FieldCatalog, FieldType, FieldValue};
pub use config::{BrowserConfig, InterpreterConfig, RunConfig};
pub use driver::{FormDriver, FormElement};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, Phase};
pub use page::Page;
pub use service::{process_form, FormReport};
pub use state::RunState;
pub use synth::{InterpreterSynthesizer, OpenAiInterpreter, RuleSynthesizer, ValueSynthesizer};
