//! Onboarding checklist payload and validation.
//!
//! The checklist is the one-time business-information form a customer fills
//! in during the onboarding phase. Nested sections are explicit structs that
//! are validated up front; validation reports every failing field, using
//! dotted paths for nested fields (e.g. `legal_info.impressum`).

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Web-design preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WebDesign {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub color_scheme: String,
    #[serde(default)]
    pub style_notes: Option<String>,
    #[serde(default)]
    pub reference_sites: Vec<String>,
}

/// Market research answers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MarketResearch {
    #[serde(default)]
    #[validate(custom(function = "non_empty_entries"))]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub unique_selling_points: Option<String>,
}

/// Legal information shown on the customer's landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LegalInfo {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub address: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub impressum: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub privacy_policy: String,
}

/// The full checklist submission.
///
/// Every field defaults when absent so that a missing field surfaces as a
/// validation error alongside all the others, rather than as a
/// deserialization failure on the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChecklistPayload {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub payment_option: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"), length(max = 64))]
    pub tax_id: String,
    #[serde(default)]
    #[validate(custom(function = "valid_domain"))]
    pub domain: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub target_audience: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub company_info: String,
    #[serde(default)]
    #[validate(nested)]
    pub web_design: WebDesign,
    #[serde(default)]
    #[validate(nested)]
    pub market_research: MarketResearch,
    #[serde(default)]
    #[validate(nested)]
    pub legal_info: LegalInfo,
    #[serde(default)]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "This field is required"));
    }
    Ok(())
}

fn non_empty_entries(values: &[String]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(error("required", "At least one entry is required"));
    }
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(error("blank_entry", "Entries must not be empty"));
    }
    Ok(())
}

fn valid_domain(value: &str) -> Result<(), ValidationError> {
    non_blank(value)?;
    let value = value.trim();
    let looks_like_domain = value.contains('.')
        && !value.starts_with('.')
        && !value.ends_with('.')
        && !value.chars().any(char::is_whitespace);
    if !looks_like_domain {
        return Err(error("invalid_domain", "Must be a domain such as example.com"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation entry points
// ---------------------------------------------------------------------------

/// Validate a checklist submission, reporting every invalid field.
pub fn validate_checklist(payload: &ChecklistPayload) -> Result<(), CoreError> {
    payload.validate().map_err(CoreError::InvalidFields)
}

/// Flatten validation errors into `path -> messages`, with nested struct
/// fields joined by `.` and list items by `[i]`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect(errors, "", &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                out.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (i, inner) in items {
                    collect(inner, &format!("{path}[{i}]"), out);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
