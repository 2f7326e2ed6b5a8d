//! Discovery Scanner: finds the form's inputs and merges new ones into the
//! Field Catalog.

use tracing::{debug, info, warn};

use crate::catalog::{Field, FieldType};
use crate::driver::{self, FormDriver, FormElement, FIELD_SELECTOR};
use crate::error::Result;
use crate::state::RunState;

/// Label used when neither a `<label for>` nor a `name` attribute exists.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Scan the page and append fields not seen before.
///
/// Known fields keep their fill state. A driver failure anywhere in the scan
/// leaves `state` exactly as it was. Returns the number of new fields.
pub async fn scan<D: FormDriver>(driver: &D, state: &mut RunState, form_id: &str) -> usize {
    match discover(driver, form_id).await {
        Ok(found) => {
            let added = state.fields.merge(found);
            let labels: Vec<&str> = state.fields.iter().map(|f| f.label.as_str()).collect();
            info!(total = state.fields.len(), added, ?labels, "scanned form");
            added
        }
        Err(e) => {
            warn!(error = %e, "field discovery failed, keeping previous catalog");
            0
        }
    }
}

/// Locate the target form: by id first, then the page's first `<form>`.
pub async fn locate_form<D: FormDriver>(driver: &D, form_id: &str) -> Result<D::Element> {
    match driver.find_one(&driver::by_id(form_id)).await {
        Ok(form) => Ok(form),
        Err(_) => {
            debug!(form_id, "form id not found, using first form");
            driver.find_one("form").await
        }
    }
}

/// Read every identifiable input of the form, in document order.
pub async fn discover<D: FormDriver>(driver: &D, form_id: &str) -> Result<Vec<Field>> {
    let form = locate_form(driver, form_id).await?;
    let elements = form.find_all(FIELD_SELECTOR).await?;

    let mut fields = Vec::with_capacity(elements.len());
    for element in &elements {
        if let Some(field) = describe(driver, &form, element).await? {
            fields.push(field);
        }
    }
    Ok(fields)
}

/// Build a field from one element; `None` for elements without an id.
async fn describe<D: FormDriver>(
    driver: &D,
    form: &D::Element,
    element: &D::Element,
) -> Result<Option<Field>> {
    let id = match element.get_attribute("id").await? {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Ok(None),
    };

    let tag = element.tag_name().await?;
    let type_attr = element.get_attribute("type").await?;
    let multiple = element.get_attribute("multiple").await?.is_some();
    let kind = FieldType::normalize(&tag, type_attr.as_deref(), multiple);

    let name = element.get_attribute("name").await?;
    let label = label_text(driver, &id, name.as_deref()).await?;

    let options = match kind {
        FieldType::Select | FieldType::Multiselect => element.options().await?,
        FieldType::Radio => radio_values(form, name.as_deref()).await?,
        _ => Vec::new(),
    };

    Ok(Some(Field::new(id, label, kind).with_options(options)))
}

async fn label_text<D: FormDriver>(driver: &D, id: &str, name: Option<&str>) -> Result<String> {
    let from_label = match driver.find_one(&driver::label_for(id)).await {
        Ok(label) => label.text().await?.trim().to_string(),
        Err(_) => String::new(),
    };
    if !from_label.is_empty() {
        return Ok(from_label);
    }
    Ok(name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string())
}

/// Values of every radio in the element's group, in document order.
async fn radio_values<E: FormElement>(form: &E, name: Option<&str>) -> Result<Vec<String>> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Ok(Vec::new());
    };
    let mut values = Vec::new();
    for radio in form.find_all(&driver::radio_group(name)).await? {
        if let Some(value) = radio.get_attribute("value").await? {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    Ok(values)
}
