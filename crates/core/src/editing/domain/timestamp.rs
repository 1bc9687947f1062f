use super::edit_error::EditError;

const MAX_FRACTION_DIGITS: usize = 6;

/// Parses `HH:MM:SS` or `HH:MM:SS.ffffff` into seconds.
///
/// Each clock field takes one or two digits (hours 0-23, minutes and
/// seconds 0-59). The fraction takes one to six digits and is read as a
/// decimal fraction, so `.9` is 900 ms. Anything else, including
/// surrounding whitespace, is a `TimestampParse` error.
pub fn parse_timestamp(timestamp: &str) -> Result<f64, EditError> {
    let invalid = || EditError::TimestampParse {
        timestamp: timestamp.to_string(),
    };

    let (clock, fraction) = match timestamp.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (timestamp, None),
    };

    let mut fields = clock.split(':');
    let hours = parse_clock_field(fields.next(), 23).ok_or_else(invalid)?;
    let minutes = parse_clock_field(fields.next(), 59).ok_or_else(invalid)?;
    let seconds = parse_clock_field(fields.next(), 59).ok_or_else(invalid)?;
    if fields.next().is_some() {
        return Err(invalid());
    }

    let fractional = match fraction {
        Some(digits) => parse_fraction(digits).ok_or_else(invalid)?,
        None => 0.0,
    };

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + fractional)
}

/// Formats seconds as `HH:MM:SS.ffffff`, the inverse of [`parse_timestamp`]
/// for values under 24 hours.
pub fn format_timestamp(seconds: f64) -> String {
    let total_us = (seconds.max(0.0) * 1_000_000.0).round() as u64;
    let us = total_us % 1_000_000;
    let total_secs = total_us / 1_000_000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02}.{us:06}")
}

fn parse_clock_field(field: Option<&str>, max: u32) -> Option<u32> {
    let field = field?;
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = field.parse().ok()?;
    (value <= max).then_some(value)
}

fn parse_fraction(digits: &str) -> Option<f64> {
    if digits.is_empty()
        || digits.len() > MAX_FRACTION_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    Some(value as f64 / 10f64.powi(digits.len() as i32))
}
