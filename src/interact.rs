//! Field Interaction Adapter: turns a (field, value) pair into DOM actions.

use tracing::{info, warn};

use crate::catalog::{Field, FieldType, FieldValue};
use crate::driver::{self, FormDriver, FormElement};
use crate::error::{Error, Result};

/// Apply `value` to `field` on the live page.
///
/// On success the field is marked filled and the value recorded. Any failure
/// leaves the field untouched and returns `false`; nothing propagates.
pub async fn apply<D: FormDriver>(driver: &D, field: &mut Field, value: FieldValue) -> bool {
    match interact(driver, field, &value).await {
        Ok(()) => {
            info!(field = %field.label, value = %value, "filled field");
            field.value = Some(value);
            field.filled = true;
            true
        }
        Err(e) => {
            warn!(field = %field.label, error = %e, "could not fill field");
            false
        }
    }
}

async fn interact<D: FormDriver>(driver: &D, field: &Field, value: &FieldValue) -> Result<()> {
    let element = driver.find_one(&driver::by_id(&field.id)).await?;
    match &field.r#type {
        FieldType::Text
        | FieldType::Email
        | FieldType::Password
        | FieldType::Number
        | FieldType::Tel
        | FieldType::Url
        | FieldType::Search
        | FieldType::Textarea
        | FieldType::Date
        | FieldType::Time
        | FieldType::DatetimeLocal
        | FieldType::Month
        | FieldType::Week
        | FieldType::Color
        | FieldType::Range => {
            let text = expect_text(field, value)?;
            element.clear().await?;
            element.send_keys(text).await
        }
        FieldType::File => element.set_file(expect_text(field, value)?).await,
        FieldType::Select => {
            let label = expect_text(field, value)?;
            if !field.options.is_empty() && !field.options.iter().any(|o| o == label) {
                return Err(mismatch(field, format!("'{label}' is not one of its options")));
            }
            element.select_by_visible_text(label).await
        }
        FieldType::Multiselect => {
            let FieldValue::Choices(labels) = value else {
                return Err(mismatch(field, "expected a list of options"));
            };
            element.deselect_all().await?;
            for label in labels {
                element.select_by_visible_text(label).await?;
            }
            Ok(())
        }
        FieldType::Checkbox => {
            let FieldValue::Flag(wanted) = value else {
                return Err(mismatch(field, "expected a boolean"));
            };
            if element.is_selected().await? != *wanted {
                element.click().await?;
            }
            Ok(())
        }
        // A radio group has one id per option; the option is found by its value.
        FieldType::Radio => {
            let target = expect_text(field, value)?;
            let radio = driver.find_one(&driver::radio_with_value(target)).await?;
            radio.click().await
        }
        // Unknown kinds (hidden, submit, ...) are recorded without touching the page.
        FieldType::Other(_) => Ok(()),
    }
}

fn expect_text<'v>(field: &Field, value: &'v FieldValue) -> Result<&'v str> {
    value
        .as_text()
        .ok_or_else(|| mismatch(field, "expected a text value"))
}

fn mismatch(field: &Field, reason: impl Into<String>) -> Error {
    Error::ValueMismatch {
        field: field.id.clone(),
        reason: reason.into(),
    }
}
