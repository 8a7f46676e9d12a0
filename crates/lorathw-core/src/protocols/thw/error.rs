use thiserror::Error;

/// Errors returned by TH/W payload decoding.
///
/// # Examples
/// ```
/// use lorathw_core::ThwError;
///
/// let err = ThwError::PayloadTooShort { needed: 8, actual: 3 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThwError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    PayloadTooShort { needed: usize, actual: usize },
}
