use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'-]{0,63}$").expect("valid name regex"));
static LOCALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'-]{0,63}$").expect("valid locality regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));
static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]{2,11}$").expect("valid zip regex"));

/// Shipping/billing profile supplied by the storefront. Passed through to
/// the commerce order after format checks; no normalization is applied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerDetails {
    #[validate(custom = "validate_person_name")]
    #[schema(example = "Asha")]
    pub first_name: String,

    #[validate(custom = "validate_person_name")]
    #[schema(example = "Patel")]
    pub last_name: String,

    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "asha.patel@example.com")]
    pub email: String,

    #[validate(custom = "validate_phone")]
    #[schema(example = "+919876543210")]
    pub phone: String,

    /// Street address line
    #[validate(length(min = 1, max = 256, message = "address is required"))]
    pub address: String,

    #[validate(custom = "validate_locality")]
    #[schema(example = "Mumbai")]
    pub city: String,

    #[validate(custom = "validate_locality")]
    #[schema(example = "Maharashtra")]
    pub state: String,

    #[validate(custom = "validate_zip")]
    #[schema(example = "400001")]
    pub zip: String,

    /// Defaults to the configured country when absent
    #[serde(default)]
    pub country: Option<String>,
}

fn regex_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_person_name(value: &str) -> Result<(), ValidationError> {
    if NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(regex_error("name", "name contains invalid characters"))
    }
}

fn validate_locality(value: &str) -> Result<(), ValidationError> {
    if LOCALITY_RE.is_match(value) {
        Ok(())
    } else {
        Err(regex_error("locality", "field contains invalid characters"))
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(regex_error("phone", "phone must be 7-15 digits"))
    }
}

fn validate_zip(value: &str) -> Result<(), ValidationError> {
    if ZIP_RE.is_match(value) {
        Ok(())
    } else {
        Err(regex_error("zip", "zip has an invalid format"))
    }
}
