// Command-line lane values -> vector register image

use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use vecpf_core::{ByteOrder, ConversionRule, ElementKind, VectorValue, VECTOR_WIDTH_BYTES};

/// Decimal or `0x` hexadecimal, optionally negative
fn parse_integer(text: &str) -> Result<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse::<i128>(),
    }
    .with_context(|| format!("invalid integer '{}'", text))?;
    Ok(if negative { -value } else { value })
}

/// A full 128-bit value; negative numbers wrap to their two's complement
fn parse_wide(text: &str) -> Result<u128> {
    if text.starts_with('-') {
        return Ok(parse_integer(text)? as u128);
    }
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => text.parse::<u128>(),
    }
    .with_context(|| format!("invalid integer '{}'", text))
}

fn expect_count(values: &[String], count: usize, kind: ElementKind) -> Result<()> {
    if values.len() != count {
        bail!(
            "{} {} lanes expected, {} given",
            count,
            kind,
            values.len()
        );
    }
    Ok(())
}

fn int_lanes<T, const N: usize>(values: &[String], kind: ElementKind) -> Result<[T; N]>
where
    T: TryFrom<i128> + Copy + Default,
{
    expect_count(values, N, kind)?;
    let mut lanes = [T::default(); N];
    for (lane, text) in lanes.iter_mut().zip(values) {
        *lane = T::try_from(parse_integer(text)?)
            .map_err(|_| anyhow!("{} does not fit in {}", text, kind))?;
    }
    Ok(lanes)
}

fn float_lanes<T, const N: usize>(values: &[String], kind: ElementKind) -> Result<[T; N]>
where
    T: FromStr + Copy + Default,
{
    expect_count(values, N, kind)?;
    let mut lanes = [T::default(); N];
    for (lane, text) in lanes.iter_mut().zip(values) {
        *lane = text
            .parse()
            .map_err(|_| anyhow!("invalid {} '{}'", kind, text))?;
    }
    Ok(lanes)
}

/// `%vc` takes either one 16-byte string or 16 separate lanes, each a
/// single character or a byte value.
fn char_lanes(values: &[String]) -> Result<[u8; VECTOR_WIDTH_BYTES]> {
    if let [text] = values {
        return <[u8; VECTOR_WIDTH_BYTES]>::try_from(text.as_bytes()).map_err(|_| {
            anyhow!(
                "a character vector needs exactly {} bytes, '{}' has {}",
                VECTOR_WIDTH_BYTES,
                text,
                text.len()
            )
        });
    }

    expect_count(values, VECTOR_WIDTH_BYTES, ElementKind::UnsignedChar)?;
    let mut lanes = [0u8; VECTOR_WIDTH_BYTES];
    for (lane, text) in lanes.iter_mut().zip(values) {
        *lane = match text.as_bytes() {
            [byte] if !byte.is_ascii_digit() => *byte,
            _ => u8::try_from(parse_integer(text)?)
                .map_err(|_| anyhow!("{} does not fit in a byte", text))?,
        };
    }
    Ok(lanes)
}

/// Build the register image `rule` will decode, one value per lane
pub fn build_vector(rule: &ConversionRule, values: &[String], order: ByteOrder) -> Result<VectorValue> {
    let kind = rule.kind;
    let vector = match kind {
        ElementKind::UnsignedInt => VectorValue::from_u32s(int_lanes(values, kind)?, order),
        ElementKind::SignedInt => VectorValue::from_i32s(int_lanes(values, kind)?, order),
        ElementKind::UnsignedShort => VectorValue::from_u16s(int_lanes(values, kind)?, order),
        ElementKind::SignedShort => VectorValue::from_i16s(int_lanes(values, kind)?, order),
        ElementKind::UnsignedChar if rule.conversion == 'c' => {
            VectorValue::from_u8s(char_lanes(values)?)
        }
        ElementKind::UnsignedChar => VectorValue::from_u8s(int_lanes(values, kind)?),
        ElementKind::SignedChar => VectorValue::from_i8s(int_lanes(values, kind)?, order),
        ElementKind::Float => VectorValue::from_f32s(float_lanes(values, kind)?, order),
        ElementKind::Double => VectorValue::from_f64s(float_lanes(values, kind)?, order),
        ElementKind::Int128 => match values {
            [value] => VectorValue::from_u128(parse_wide(value)?, order),
            _ => bail!("a 128-bit vector takes one value, {} given", values.len()),
        },
    };
    Ok(vector)
}
