//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Chinese mobile phone number regex
static CHINA_MOBILE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid regex"));

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid regex"));

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is valid (Chinese mobile)
pub fn is_valid_chinese_mobile(phone: &str) -> bool {
    CHINA_MOBILE_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if a phone number is valid (international E.164 format)
pub fn is_valid_international_phone(phone: &str) -> bool {
    INTERNATIONAL_PHONE_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if a phone number is deliverable (either Chinese or international)
pub fn is_valid_phone(phone: &str) -> bool {
    is_valid_chinese_mobile(phone) || is_valid_international_phone(phone)
}

/// Mask a phone number for logs (e.g., 138****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Mask a list of recipients for logs
pub fn mask_phone_numbers(phones: &[String]) -> String {
    phones
        .iter()
        .map(|p| mask_phone_number(p))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("152-1234-5678"), "15212345678");
        assert_eq!(normalize_phone_number("+86 152 1234 5678"), "+8615212345678");
        assert_eq!(normalize_phone_number("(152) 1234-5678"), "15212345678");
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("15212345678"));
        assert!(is_valid_phone("+14155552671"));
        assert!(!is_valid_phone("12812345678")); // Invalid prefix, no '+'
        assert!(!is_valid_phone("152"));
        assert!(!is_valid_international_phone("+0123456789")); // Invalid country code
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("15212345678"), "152****5678");
        assert_eq!(mask_phone_number("+8615212345678"), "+86****5678");
        assert_eq!(mask_phone_number("12345"), "****");
    }

    #[test]
    fn test_mask_phone_numbers() {
        let phones = vec!["15212345678".to_string(), "152".to_string()];
        assert_eq!(mask_phone_numbers(&phones), "152****5678,****");
    }
}
