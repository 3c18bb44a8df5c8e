use log::warn;
use std::time::Duration;

/// Largest decimal exponent `fraction_to_percent` will shift by.
const MAX_FEE_EXPONENT: i32 = 64;

pub fn remove_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Render a fee fraction (`"0.00002"`, `"2E-7"`) as a percentage string
/// (`"0.002%"`, `"0.00002%"`) by shifting the decimal point, without going
/// through floating point. Returns `None` for anything that is not a plain
/// decimal number or whose exponent is beyond +/-64.
pub fn fraction_to_percent(value: &str) -> Option<String> {
    let value = value.trim();
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&unsigned[..idx], unsigned[idx + 1..].parse::<i32>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(-MAX_FEE_EXPONENT..=MAX_FEE_EXPONENT).contains(&exponent) {
        return None;
    }

    let digits = format!("{}{}", int_part, frac_part);
    // decimal point position inside `digits` after scaling by 100
    let point = i32::try_from(int_part.len())
        .ok()?
        .checked_add(exponent)?
        .checked_add(2)?;
    let (int_digits, frac_digits) = if point <= 0 {
        ("0".to_string(), format!("{}{}", "0".repeat((-point) as usize), digits))
    } else if point as usize >= digits.len() {
        let padding = "0".repeat(point as usize - digits.len());
        (format!("{}{}", digits, padding), String::new())
    } else {
        let (i, f) = digits.split_at(point as usize);
        (i.to_string(), f.to_string())
    };

    let int_digits = match int_digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let frac_digits = frac_digits.trim_end_matches('0');
    let sign = if negative && (int_digits != "0" || !frac_digits.is_empty()) {
        "-"
    } else {
        ""
    };

    Some(if frac_digits.is_empty() {
        format!("{}{}%", sign, int_digits)
    } else {
        format!("{}{}.{}%", sign, int_digits, frac_digits)
    })
}

/// Retry `f` up to `retries` extra times with exponential backoff, capped at 30s.
pub async fn retry<T, E, F, Fut>(mut retries: u32, base_delay: Duration, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if retries == 0 => return Err(e),
            Err(e) => {
                let delay = (base_delay * (1u32 << attempt.min(5))).min(Duration::from_secs(30));
                warn!(
                    "attempt {} failed ({}), retrying in {}ms",
                    attempt + 1,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                retries -= 1;
                attempt += 1;
            }
        }
    }
}
