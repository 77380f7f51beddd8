use thiserror::Error;
use url::Url;
use validator::ValidationError;

#[derive(Error, Debug)]
enum EndpointUrlValidationError {
    #[error("Failed to parse url: {0}")]
    InvalidUrl(String),

    #[error(
        "Unsupported url scheme: {0}. Only 'http' and 'https' are supported"
    )]
    UnsupportedScheme(String),
}

pub fn validation_error(
    code: &'static str,
    message: String,
) -> ValidationError {
    let mut validation_e = ValidationError::new(code);
    validation_e.message = Some(message.into());
    validation_e
}

/// Validates that the call-initiation endpoint is a well-formed http(s) URL.
pub fn validate_endpoint_url(url_string: &str) -> Result<(), ValidationError> {
    let url = Url::parse(url_string)
        .map_err(|e| EndpointUrlValidationError::InvalidUrl(e.to_string()))?;
    validate_endpoint_scheme(url.scheme())?;

    Ok(())
}

fn validate_endpoint_scheme(
    scheme: &str,
) -> Result<(), EndpointUrlValidationError> {
    if scheme == "http" || scheme == "https" {
        Ok(())
    } else {
        Err(EndpointUrlValidationError::UnsupportedScheme(
            scheme.to_string(),
        ))
    }
}

impl From<EndpointUrlValidationError> for ValidationError {
    fn from(value: EndpointUrlValidationError) -> Self {
        validation_error("CALL_ENDPOINT_VALIDATION_FAILED", value.to_string())
    }
}
