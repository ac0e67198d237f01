//! Number formatting for rendered documents

/// Format a value as fixed-point currency with exactly two decimals
///
/// Rounding is half-up on the value's shortest decimal representation, so
/// `1.005` becomes `1.01` and `0.125` becomes `0.13`. No grouping separators
/// are inserted, and results that round to zero never carry a minus sign.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Display never uses exponent notation for f64
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|&d| d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let cents_at = digits.len() - 2;
    let whole: String = digits[..cents_at]
        .iter()
        .map(|d| char::from(b'0' + d))
        .collect();
    let cents: String = digits[cents_at..]
        .iter()
        .map(|d| char::from(b'0' + d))
        .collect();
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };

    let is_zero = whole == "0" && cents == "00";
    let sign = if value.is_sign_negative() && !is_zero {
        "-"
    } else {
        ""
    };

    format!("{sign}{whole}.{cents}")
}
