//! Path policy: declared sync paths are matched literally by the service.

use crate::error::ValidationError;

/// Characters the service would treat as literal but callers usually mean as glob syntax.
pub const WILDCARD_CHARS: [char; 4] = ['*', '?', '[', ']'];

/// Fail if `value` contains any glob metacharacter.
///
/// `field` names the policy field the value came from and is echoed in the error.
pub fn validate_no_wildcard(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.contains(WILDCARD_CHARS) {
        return Err(ValidationError::Wildcard {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validate every entry of a path list, stopping at the first offender.
pub fn validate_all<'a, I>(values: I, field: &str) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .try_for_each(|value| validate_no_wildcard(value, field))
}
