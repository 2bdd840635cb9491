//! Message body rendering and recipient normalization for vendor providers

use std::collections::HashMap;

use cg_core::errors::SmsError;
use cg_shared::utils::{is_valid_chinese_mobile, mask_phone_number, normalize_phone_number};
use phonenumber::{Mode, PhoneNumber};

/// Render `template_id` from `templates`, substituting `{1}`..`{n}` with `args`
pub fn render_template(
    templates: &HashMap<String, String>,
    template_id: &str,
    args: &[String],
) -> Result<String, SmsError> {
    let template = templates
        .get(template_id)
        .ok_or_else(|| SmsError::invalid_request(format!("unknown template '{}'", template_id)))?;

    // Highest index first so "{1}" never eats the prefix of "{10}"
    let body = args
        .iter()
        .enumerate()
        .rev()
        .fold(template.clone(), |body, (i, arg)| {
            body.replace(&format!("{{{}}}", i + 1), arg)
        });
    Ok(body)
}

/// Normalize a recipient to E.164
///
/// Numbers without a country code are accepted only when they are mainland
/// China mobile numbers.
pub fn to_e164(phone: &str) -> Result<String, SmsError> {
    let normalized = normalize_phone_number(phone);
    let candidate = if normalized.starts_with('+') {
        normalized
    } else if is_valid_chinese_mobile(&normalized) {
        format!("+86{}", normalized)
    } else {
        return Err(SmsError::invalid_request(format!(
            "phone number {} must be in E.164 format",
            mask_phone_number(phone)
        )));
    };

    candidate
        .parse::<PhoneNumber>()
        .map(|parsed| parsed.format().mode(Mode::E164).to_string())
        .map_err(|e| {
            SmsError::invalid_request(format!(
                "invalid phone number {}: {}",
                mask_phone_number(phone),
                e
            ))
        })
}

/// Reject an empty recipient list
pub fn require_recipients(numbers: &[String]) -> Result<(), SmsError> {
    if numbers.is_empty() {
        return Err(SmsError::invalid_request("no recipients"));
    }
    Ok(())
}

/// Normalize every recipient up front, so one bad number fails the request
/// before anything is sent
pub fn recipients_e164(numbers: &[String]) -> Result<Vec<String>, SmsError> {
    require_recipients(numbers)?;
    numbers.iter().map(|number| to_e164(number)).collect()
}
