//! WhatsApp number mask.
//!
//! Turns whatever the client typed into `(DD) DDDDD-DDDD`. Partial input
//! degrades gracefully: one digit stays bare, the hyphen only appears once the
//! subscriber part has five digits.

/// Longest masked number: `(47) 99999-8888`.
pub const MAX_DISPLAY_LEN: usize = 15;

/// Area code plus a nine-digit mobile number.
const MAX_DIGITS: usize = 11;

const AREA_CODE_LEN: usize = 2;

/// Subscriber digits after the hyphen.
const LINE_LEN: usize = 4;

/// Mask raw phone input.
///
/// Reapplying the mask to its own output returns the same string.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();

    if digits.len() < AREA_CODE_LEN {
        return digits;
    }

    let (area, subscriber) = digits.split_at(AREA_CODE_LEN);
    let mut masked = String::with_capacity(MAX_DISPLAY_LEN);
    masked.push('(');
    masked.push_str(area);
    masked.push(')');

    if subscriber.is_empty() {
        return masked;
    }

    masked.push(' ');
    if subscriber.len() > LINE_LEN {
        let (prefix, line) = subscriber.split_at(subscriber.len() - LINE_LEN);
        masked.push_str(prefix);
        masked.push('-');
        masked.push_str(line);
    } else {
        masked.push_str(subscriber);
    }

    masked
}

/// Digits of a masked or raw number.
pub fn phone_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
