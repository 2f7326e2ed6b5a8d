//! Value Synthesis Gateway.
//!
//! [`ValueSynthesizer::synthesize`] is total: it returns a value for every
//! field, shaped by the field's type (`Flag` for checkboxes, `Choices` for
//! multiselects, `Text` otherwise). Two strategies sit behind it:
//! [`RuleSynthesizer`], a per-type table of random generators, and
//! [`InterpreterSynthesizer`], which asks an [`Interpreter`] (usually an LLM)
//! and drops back to the rule table whenever the answer is missing or does
//! not fit the field.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use crate::catalog::{Field, FieldType, FieldValue};
use crate::config::InterpreterConfig;
use crate::error::{Error, Result};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const FALLBACK_SELECT: [&str; 3] = ["Credit Card", "PayPal", "Bank Transfer"];
pub const FALLBACK_MULTISELECT: [&str; 4] = ["Feature 1", "Feature 2", "Feature 3", "Feature 4"];
pub const FALLBACK_RADIO: [&str; 3] = ["option1", "option2", "option3"];
pub const GENERIC_VALUE: &str = "default";

/// Number of options picked for a multiselect.
pub const MULTISELECT_PICKS: usize = 2;

#[async_trait]
pub trait ValueSynthesizer: Send + Sync {
    async fn synthesize(&self, field: &Field) -> FieldValue;
}

/// Deterministic-shape, random-content generator keyed by field type.
#[derive(Debug, Clone)]
pub struct RuleSynthesizer {
    file_path: String,
}

impl Default for RuleSynthesizer {
    fn default() -> Self {
        Self::new("path/to/file.txt")
    }
}

impl RuleSynthesizer {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn generate(&self, field: &Field) -> FieldValue {
        let mut rng = rand::rng();
        let text = |s: String| FieldValue::Text(s);
        match &field.r#type {
            FieldType::Text | FieldType::Search => text(random_string(&mut rng, LETTERS, 8)),
            FieldType::Email => text(format!(
                "{}@example.com",
                random_string(&mut rng, LOWERCASE, 5)
            )),
            FieldType::Password => text(random_string(&mut rng, ALPHANUMERIC, 10)),
            FieldType::Number => text(rng.random_range(1..=100u32).to_string()),
            FieldType::Tel => text(format!(
                "{}-{}-{}",
                rng.random_range(100..=999u32),
                rng.random_range(100..=999u32),
                rng.random_range(1000..=9999u32)
            )),
            FieldType::Url => text(format!(
                "https://{}.com",
                random_string(&mut rng, LOWERCASE, 5)
            )),
            FieldType::Date => text("2023-10-15".into()),
            FieldType::Time => text("12:34".into()),
            FieldType::DatetimeLocal => text("2023-10-15T12:34".into()),
            FieldType::Month => text("2023-10".into()),
            FieldType::Week => text("2023-W42".into()),
            FieldType::Color => text(format!("#{:06x}", rng.random_range(0..=0xFF_FFFFu32))),
            FieldType::Range => text(rng.random_range(0..=100u32).to_string()),
            FieldType::File => text(self.file_path.clone()),
            FieldType::Textarea => text(
                (0..3)
                    .map(|_| random_string(&mut rng, LETTERS, 5))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            FieldType::Checkbox => FieldValue::Flag(rng.random_bool(0.5)),
            FieldType::Radio => text(pick_one(&mut rng, &field.options, &FALLBACK_RADIO)),
            FieldType::Select => text(pick_one(&mut rng, &field.options, &FALLBACK_SELECT)),
            FieldType::Multiselect => {
                FieldValue::Choices(pick_some(&mut rng, &field.options, MULTISELECT_PICKS))
            }
            FieldType::Other(_) => text(GENERIC_VALUE.into()),
        }
    }
}

#[async_trait]
impl ValueSynthesizer for RuleSynthesizer {
    async fn synthesize(&self, field: &Field) -> FieldValue {
        self.generate(field)
    }
}

fn random_string<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Non-empty option labels; placeholder entries like `""` are skipped.
fn usable_options(options: &[String]) -> Vec<&str> {
    options
        .iter()
        .map(String::as_str)
        .filter(|o| !o.trim().is_empty())
        .collect()
}

fn pick_one<R: Rng + ?Sized>(rng: &mut R, options: &[String], fallback: &[&str]) -> String {
    let usable = usable_options(options);
    let pool: &[&str] = if !usable.is_empty() {
        &usable
    } else if !options.is_empty() {
        // Only placeholders exist; stay inside the option set anyway.
        return options[0].clone();
    } else {
        fallback
    };
    pool.choose(rng).copied().unwrap_or(GENERIC_VALUE).to_string()
}

/// Pick up to `amount` distinct options, kept in option order.
fn pick_some<R: Rng + ?Sized>(rng: &mut R, options: &[String], amount: usize) -> Vec<String> {
    let usable = usable_options(options);
    let pool: Vec<&str> = if !usable.is_empty() {
        usable
    } else if !options.is_empty() {
        // Only placeholders exist; stay inside the option set anyway.
        options.iter().map(String::as_str).collect()
    } else {
        FALLBACK_MULTISELECT.to_vec()
    };
    let mut picked = rand::seq::index::sample(rng, pool.len(), amount.min(pool.len())).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| pool[i].to_string()).collect()
}

/// Black-box "give me a value for this field" capability.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, label: &str, field_type: &FieldType, options: &[String])
        -> Result<String>;
}

/// Interpreter-first synthesis with a rule-table fallback.
pub struct InterpreterSynthesizer<I> {
    interpreter: I,
    rules: RuleSynthesizer,
}

impl<I: Interpreter> InterpreterSynthesizer<I> {
    pub fn new(interpreter: I, rules: RuleSynthesizer) -> Self {
        Self { interpreter, rules }
    }
}

#[async_trait]
impl<I: Interpreter> ValueSynthesizer for InterpreterSynthesizer<I> {
    async fn synthesize(&self, field: &Field) -> FieldValue {
        match self
            .interpreter
            .interpret(&field.label, &field.r#type, &field.options)
            .await
        {
            Ok(raw) => match coerce(field, &raw) {
                Some(value) => value,
                None => {
                    warn!(field = %field.label, raw = %raw, "interpreter value does not fit field, using rules");
                    self.rules.generate(field)
                }
            },
            Err(e) => {
                warn!(field = %field.label, error = %e, "interpreter failed, using rules");
                self.rules.generate(field)
            }
        }
    }
}

/// Shape a raw interpreter answer into the typed value `field` expects.
pub fn coerce(field: &Field, raw: &str) -> Option<FieldValue> {
    let raw = strip_quotes(raw.trim());
    if raw.is_empty() {
        return None;
    }
    let constrained = field.r#type.is_choice() && !field.options.is_empty();
    match &field.r#type {
        FieldType::Checkbox => parse_flag(raw).map(FieldValue::Flag),
        FieldType::Select | FieldType::Radio => {
            if constrained {
                match_option(&field.options, raw).map(FieldValue::Text)
            } else {
                Some(FieldValue::Text(raw.to_string()))
            }
        }
        FieldType::Multiselect => {
            let mut picked: Vec<String> = Vec::new();
            for part in raw.split(',').map(|p| strip_quotes(p.trim())) {
                let label = if constrained {
                    match_option(&field.options, part)
                } else {
                    (!part.is_empty()).then(|| part.to_string())
                };
                if let Some(label) = label {
                    if !picked.contains(&label) {
                        picked.push(label);
                    }
                }
            }
            (!picked.is_empty()).then_some(FieldValue::Choices(picked))
        }
        _ => Some(FieldValue::Text(raw.to_string())),
    }
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "checked" => Some(true),
        "false" | "no" | "off" | "0" | "unchecked" => Some(false),
        _ => None,
    }
}

/// Canonical option label for `raw`, exact match first, then case-insensitive.
fn match_option(options: &[String], raw: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.as_str() == raw)
        .or_else(|| options.iter().find(|o| o.trim().eq_ignore_ascii_case(raw)))
        .filter(|o| !o.trim().is_empty())
        .cloned()
}

const SYSTEM_PROMPT: &str =
    "You are a web form filling expert. Generate appropriate values based on the context.";

/// OpenAI-compatible chat-completions interpreter.
pub struct OpenAiInterpreter {
    client: reqwest::Client,
    config: InterpreterConfig,
}

impl OpenAiInterpreter {
    pub fn new(config: InterpreterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn prompt(label: &str, field_type: &FieldType, options: &[String]) -> String {
        let options = if options.is_empty() {
            "None".to_string()
        } else {
            options.join(", ")
        };
        format!(
            "Generate a valid value for this form field:\n\
             Label: {label}\n\
             Type: {field_type}\n\
             Options: {options}\n\n\
             Rules:\n\
             1. Use realistic values\n\
             2. Match format requirements\n\
             3. No placeholder text\n\
             4. For checkboxes answer true or false\n\
             5. For multiple choices answer a comma-separated list of options\n\
             6. Respond ONLY with the value"
        )
    }
}

#[async_trait]
impl Interpreter for OpenAiInterpreter {
    async fn interpret(
        &self,
        label: &str,
        field_type: &FieldType,
        options: &[String],
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "temperature": self.config.temperature,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": Self::prompt(label, field_type, options)},
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        let content = completion_content(status, &body)?;
        debug!(label, %field_type, content = %content, "interpreter answered");
        Ok(content)
    }
}

/// Pull the trimmed answer out of a chat-completions response body.
fn completion_content(status: StatusCode, body: &serde_json::Value) -> Result<String> {
    if !status.is_success() {
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("Unknown API error");
        return Err(Error::Interpreter(format!("API error ({status}): {message}")));
    }

    body["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| Error::Interpreter(format!("No content in response: {body}")))
}
