//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// E.164: leading '+', no leading zero in the country code, 8 to 15 digits total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern is valid")
});

/// Subscriber number length in the default dialing region. A bare number
/// longer than this that already starts with the default country code is
/// taken to carry it.
const NATIONAL_NUMBER_LENGTH: usize = 10;

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is already in canonical E.164 form
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Convert raw user input into the canonical E.164 identity used as a store key.
///
/// Formatting characters are stripped, a leading `+` is ensured and the
/// default country code is applied at most once when the input has none.
/// Returns `None` when the result is not a plausible E.164 number.
pub fn to_e164(raw: &str, default_country_code: &str) -> Option<String> {
    let cleaned = normalize_phone_number(raw);
    let default_country_code = default_country_code.trim_start_matches('+');

    let (has_plus, digits) = match cleaned.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    // A '+' anywhere but the front is not a formatting character
    if digits.is_empty() || digits.contains('+') {
        return None;
    }

    let candidate = if has_plus {
        format!("+{}", digits)
    } else if digits.starts_with(default_country_code)
        && digits.len() > NATIONAL_NUMBER_LENGTH
    {
        format!("+{}", digits)
    } else {
        format!("+{}{}", default_country_code, digits)
    };

    is_valid_e164(&candidate).then_some(candidate)
}

/// Mask a phone number for logging, keeping only the last 4 characters.
///
/// Works on characters, not bytes, so raw unvalidated input is safe to mask.
pub fn mask_phone_number(phone: &str) -> String {
    let visible_digits = 4;
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= visible_digits {
        return "*".repeat(chars.len());
    }

    let masked_count = chars.len() - visible_digits;
    let last_digits: String = chars[masked_count..].iter().collect();

    if phone.starts_with('+') {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}
