//! Conversion of raw cells into typed record fields.
//!
//! Every cell is converted according to the [`Slot`] of its destination
//! field. An empty cell always writes the zero value of the type (`""`,
//! `false`, `0`, `0.0`, `0+0i`); non-empty cells are parsed with the rules
//! below and written in place.
//!
//! | Type | Accepted literal |
//! |---|---|
//! | string | anything, optionally normalized (NFC/NFD/NFKC/NFKD) |
//! | bool | `1 t T TRUE true True 0 f F FALSE false False` |
//! | signed integers | base 10, optional sign, must fit the width |
//! | unsigned integers | base 10, no sign, must fit the width |
//! | floats | base 10; every `,` is removed first (`1,989.12`) |
//! | complex | `<re>±<im>i`, optionally wrapped in parentheses |

use std::{
    borrow::Cow,
    num::{ParseFloatError, ParseIntError},
    str::FromStr,
};

use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::{
    core::record::{Field, Slot},
    error::{DsvError, Result},
};

/// Unicode normalization form applied to string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Normalization {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl Normalization {
    /// Appends the normalized form of `raw` to `target`.
    pub fn normalize_into(self, raw: &str, target: &mut String) {
        match self {
            Normalization::Nfc => target.extend(raw.nfc()),
            Normalization::Nfd => target.extend(raw.nfd()),
            Normalization::Nfkc => target.extend(raw.nfkc()),
            Normalization::Nfkd => target.extend(raw.nfkd()),
        }
    }

    /// Returns the normalized form of `raw`.
    pub fn apply(self, raw: &str) -> String {
        let mut normalized = String::with_capacity(raw.len());
        self.normalize_into(raw, &mut normalized);
        normalized
    }
}

/// Converts `raw` into the type of `field` and writes it into `data`.
///
/// `column` is only used to locate the cell in error messages.
pub(crate) fn coerce<T>(
    field: &Field<T>,
    column: usize,
    raw: &str,
    normalization: Option<Normalization>,
    data: &mut T,
) -> Result<()> {
    let slot = field.slot();
    let fail = |reason: String| DsvError::Coercion {
        column,
        field: field.name(),
        value: raw.to_owned(),
        kind: slot.type_name(),
        reason,
    };

    match slot {
        Slot::Str(get) => {
            let target = get(data);
            target.clear();
            match normalization {
                Some(form) => form.normalize_into(raw, target),
                None => target.push_str(raw),
            }
        }
        Slot::Bool(get) => *get(data) = parse_bool(raw).map_err(fail)?,
        Slot::I8(get) => *get(data) = parse_signed(raw).map_err(fail)?,
        Slot::I16(get) => *get(data) = parse_signed(raw).map_err(fail)?,
        Slot::I32(get) => *get(data) = parse_signed(raw).map_err(fail)?,
        Slot::I64(get) => *get(data) = parse_signed(raw).map_err(fail)?,
        Slot::Isize(get) => *get(data) = parse_signed(raw).map_err(fail)?,
        Slot::U8(get) => *get(data) = parse_unsigned(raw).map_err(fail)?,
        Slot::U16(get) => *get(data) = parse_unsigned(raw).map_err(fail)?,
        Slot::U32(get) => *get(data) = parse_unsigned(raw).map_err(fail)?,
        Slot::U64(get) => *get(data) = parse_unsigned(raw).map_err(fail)?,
        Slot::Usize(get) => *get(data) = parse_unsigned(raw).map_err(fail)?,
        Slot::F32(get) => *get(data) = parse_float(raw).map_err(fail)?,
        Slot::F64(get) => *get(data) = parse_float(raw).map_err(fail)?,
        Slot::C64(get) => *get(data) = parse_complex64(raw).map_err(fail)?,
        Slot::C128(get) => *get(data) = parse_complex128(raw).map_err(fail)?,
        Slot::Unsupported(type_name) => {
            return Err(DsvError::UnsupportedType {
                field: field.name(),
                type_name,
            });
        }
    }

    Ok(())
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw {
        "" => Ok(false),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid boolean literal".to_string()),
    }
}

fn parse_signed<V>(raw: &str) -> std::result::Result<V, String>
where
    V: FromStr<Err = ParseIntError> + Default,
{
    if raw.is_empty() {
        return Ok(V::default());
    }
    raw.parse::<V>().map_err(|error| error.to_string())
}

fn parse_unsigned<V>(raw: &str) -> std::result::Result<V, String>
where
    V: FromStr<Err = ParseIntError> + Default,
{
    if raw.starts_with(['+', '-']) {
        return Err("sign not permitted in unsigned value".to_string());
    }
    parse_signed(raw)
}

trait FloatLiteral: FromStr<Err = ParseFloatError> + Default + Copy {
    fn is_infinite(self) -> bool;
}

impl FloatLiteral for f32 {
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
}

impl FloatLiteral for f64 {
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
}

fn parse_float<V: FloatLiteral>(raw: &str) -> std::result::Result<V, String> {
    if raw.is_empty() {
        return Ok(V::default());
    }

    // "1,989.12" is read as 1989.12
    let literal: Cow<'_, str> = if raw.contains(',') {
        Cow::Owned(raw.replace(',', ""))
    } else {
        Cow::Borrowed(raw)
    };

    let value = literal.parse::<V>().map_err(|error| error.to_string())?;
    if value.is_infinite() && !mentions_infinity(&literal) {
        return Err("value out of range".to_string());
    }
    Ok(value)
}

fn mentions_infinity(literal: &str) -> bool {
    literal.to_ascii_lowercase().contains("inf")
}

fn parse_complex(raw: &str) -> std::result::Result<Complex64, String> {
    let literal = raw
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(raw);
    check_complex_literal(literal)?;

    let value = Complex64::from_str(literal).map_err(|error| error.to_string())?;
    if (value.re.is_infinite() || value.im.is_infinite()) && !mentions_infinity(literal) {
        return Err("value out of range".to_string());
    }
    Ok(value)
}

/// Rejects spellings `Complex64::from_str` tolerates but `<re>±<im>i` does
/// not: blanks, a `j` unit and doubled signs.
fn check_complex_literal(literal: &str) -> std::result::Result<(), String> {
    if literal.bytes().any(|byte| byte.is_ascii_whitespace()) {
        return Err("whitespace not permitted in complex value".to_string());
    }
    if literal.ends_with(['j', 'J']) {
        return Err("imaginary unit must be i".to_string());
    }
    let doubled_sign = literal
        .as_bytes()
        .windows(2)
        .any(|pair| matches!(pair, [b'+' | b'-', b'+' | b'-']));
    if doubled_sign {
        return Err("doubled sign in complex value".to_string());
    }
    Ok(())
}

fn parse_complex128(raw: &str) -> std::result::Result<Complex64, String> {
    if raw.is_empty() {
        return Ok(Complex64::default());
    }
    parse_complex(raw)
}

fn parse_complex64(raw: &str) -> std::result::Result<Complex32, String> {
    if raw.is_empty() {
        return Ok(Complex32::default());
    }

    let wide = parse_complex(raw)?;
    let narrow = Complex32::new(wide.re as f32, wide.im as f32);
    let overflow = (narrow.re.is_infinite() && !wide.re.is_infinite())
        || (narrow.im.is_infinite() && !wide.im.is_infinite());
    if overflow {
        return Err("value out of range".to_string());
    }
    Ok(narrow)
}
