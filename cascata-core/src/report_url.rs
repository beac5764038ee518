//! Placement of an outcome code into a tracking URL.

use url::Url;

use cascata_types::{CascataError, OutcomeCode};

/// Placeholder replaced by the numeric outcome code.
pub const REASON_PLACEHOLDER: &str = "{reason}";
/// Query parameter appended when the template has no placeholder.
pub const REASON_PARAM: &str = "reason";

/// Resolve a report URL template for `code`.
///
/// A `{reason}` placeholder is substituted when present; otherwise a
/// `reason=<code>` query parameter is appended, keeping existing parameters.
///
/// # Errors
/// Returns `InvalidArg` for a blank template and `Report` if the result is not
/// an absolute URL.
pub fn outcome_url(template: &str, code: OutcomeCode) -> Result<String, CascataError> {
    let template = template.trim();
    if template.is_empty() {
        return Err(CascataError::InvalidArg("empty report url".into()));
    }
    let code_str = code.code().to_string();
    if template.contains(REASON_PLACEHOLDER) {
        let resolved = template.replace(REASON_PLACEHOLDER, &code_str);
        Url::parse(&resolved).map_err(|e| CascataError::report(&resolved, e.to_string()))?;
        return Ok(resolved);
    }
    let mut url = Url::parse(template).map_err(|e| CascataError::report(template, e.to_string()))?;
    url.query_pairs_mut().append_pair(REASON_PARAM, &code_str);
    Ok(url.into())
}
