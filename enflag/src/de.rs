//! Conversion of raw string values into field types
//!
//! Every value a load resolves — from a flag, an environment variable, or a
//! declared default — starts out as a string. [`FromEnvStr`] is the seam
//! where those strings become typed field values. The implementations here
//! cover the supported field types: `String`, `bool`, the signed and
//! unsigned integer widths, floats, [`Duration`], `Vec<T>` of any of the
//! above, and `Option<T>`.
//!
//! Conversion is all-or-nothing: a failing conversion never assigns a
//! partial value, and a failing sequence element aborts the whole sequence.

use std::fmt;
use std::time::Duration;

/// Error produced by a [`FromEnvStr`] conversion.
///
/// Carries only a message; the resolver wraps it with the field name, the
/// offending raw value, and the target type.
#[derive(Debug, Clone)]
pub struct CoerceError {
    message: String,
}

impl CoerceError {
    /// Create a conversion error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CoerceError {}

/// Conversion from a raw resolved string into a field value.
///
/// Implement this for your own types to make them usable as leaf fields:
///
/// ```rust
/// use enflag::{CoerceError, FromEnvStr};
///
/// struct Percent(u8);
///
/// impl FromEnvStr for Percent {
///     fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
///         let n = u8::from_env_str(raw)?;
///         if n > 100 {
///             return Err(CoerceError::new(format!("{n} is not a percentage")));
///         }
///         Ok(Percent(n))
///     }
/// }
/// ```
pub trait FromEnvStr: Sized {
    /// Convert `raw` into `Self`.
    fn from_env_str(raw: &str) -> Result<Self, CoerceError>;
}

impl FromEnvStr for String {
    fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_owned())
    }
}

impl FromEnvStr for bool {
    /// Accepts `1`, `t`, `true` and `0`, `f`, `false`, case-insensitively.
    fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
        if raw.eq_ignore_ascii_case("1")
            || raw.eq_ignore_ascii_case("t")
            || raw.eq_ignore_ascii_case("true")
        {
            return Ok(true);
        }
        if raw.eq_ignore_ascii_case("0")
            || raw.eq_ignore_ascii_case("f")
            || raw.eq_ignore_ascii_case("false")
        {
            return Ok(false);
        }
        Err(CoerceError::new(format!("'{raw}' is not a boolean")))
    }
}

macro_rules! impl_from_env_str_via_parse {
    ($($ty:ty),* $(,)?) => {$(
        impl FromEnvStr for $ty {
            fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
                raw.parse::<$ty>()
                    .map_err(|e| CoerceError::new(e.to_string()))
            }
        }
    )*};
}

// The stdlib parsers range-check against the exact width, so an i8 field
// given "200" fails even though 200 fits wider types.
impl_from_env_str_via_parse!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl FromEnvStr for Duration {
    /// Parses composite magnitude+unit expressions such as `"5s"`,
    /// `"2m30s"`, `"1.5h"` or `"300ms"`.
    ///
    /// Units are `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. A bare `"0"` is
    /// accepted; negative durations are not (the target is elapsed time).
    fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
        parse_duration(raw)
    }
}

impl<T: FromEnvStr> FromEnvStr for Vec<T> {
    /// Splits on `,`, trims each element and converts it independently.
    ///
    /// An empty input yields an empty vector. Any element failure aborts the
    /// whole conversion, naming the element index.
    fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',')
            .enumerate()
            .map(|(idx, part)| {
                T::from_env_str(part.trim())
                    .map_err(|e| CoerceError::new(format!("element {idx}: {e}")))
            })
            .collect()
    }
}

impl<T: FromEnvStr> FromEnvStr for Option<T> {
    fn from_env_str(raw: &str) -> Result<Self, CoerceError> {
        T::from_env_str(raw).map(Some)
    }
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60_000_000_000),
        "h" => Some(3_600_000_000_000),
        _ => None,
    }
}

fn parse_duration(raw: &str) -> Result<Duration, CoerceError> {
    if raw.starts_with('-') {
        return Err(CoerceError::new(format!("negative duration '{raw}'")));
    }
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(CoerceError::new(format!("invalid duration '{raw}'")));
    }

    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let int_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let int_digits = &rest[..int_end];
        rest = &rest[int_end..];

        let frac_digits = if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_end = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            rest = &after_dot[frac_end..];
            &after_dot[..frac_end]
        } else {
            ""
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(CoerceError::new(format!("invalid duration '{raw}'")));
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let scale = unit_nanos(unit).ok_or_else(|| {
            if unit.is_empty() {
                CoerceError::new(format!("missing unit in duration '{raw}'"))
            } else {
                CoerceError::new(format!("unknown unit '{unit}' in duration '{raw}'"))
            }
        })?;

        let int_part: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| CoerceError::new(format!("invalid duration '{raw}'")))?
        };
        nanos = int_part
            .checked_mul(u128::from(scale))
            .and_then(|n| nanos.checked_add(n))
            .ok_or_else(|| CoerceError::new(format!("duration '{raw}' out of range")))?;

        if !frac_digits.is_empty() {
            // Digits beyond 18 are below nanosecond resolution for every unit.
            let kept = &frac_digits[..frac_digits.len().min(18)];
            let frac_num: u128 = kept.parse().unwrap_or(0);
            let denom = 10u128.pow(kept.len() as u32);
            nanos = nanos
                .checked_add(frac_num * u128::from(scale) / denom)
                .ok_or_else(|| CoerceError::new(format!("duration '{raw}' out of range")))?;
        }
    }

    if nanos > u128::from(u64::MAX) {
        return Err(CoerceError::new(format!("duration '{raw}' out of range")));
    }
    Ok(Duration::from_nanos(nanos as u64))
}
