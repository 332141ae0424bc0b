// Element extraction
//
// Reinterprets the 16 bytes of a register image as typed lanes. Lanes keep
// their in-memory order; only the 128-bit path reorders (its two halves).

use crate::rules::{ConversionRule, ElementKind};
use crate::vector::{ByteOrder, VectorValue};

/// One element, already widened the way C default argument promotion would
/// widen it before it reaches a variadic formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// `int` (signed int, short and char lanes)
    Int(i32),
    /// `unsigned int` (unsigned int, short and char lanes)
    UInt(u32),
    /// `unsigned long` (one half of a 128-bit value)
    ULong(u64),
    /// `double` (float lanes are promoted)
    Double(f64),
}

fn lane<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

macro_rules! read {
    ($ty:ty, $bytes:expr, $order:expr) => {
        match $order {
            ByteOrder::Little => <$ty>::from_le_bytes(lane($bytes)),
            ByteOrder::Big => <$ty>::from_be_bytes(lane($bytes)),
        }
    };
}

fn decode(kind: ElementKind, bytes: &[u8], order: ByteOrder) -> Scalar {
    match kind {
        ElementKind::UnsignedInt => Scalar::UInt(read!(u32, bytes, order)),
        ElementKind::SignedInt => Scalar::Int(read!(i32, bytes, order)),
        ElementKind::UnsignedShort => Scalar::UInt(u32::from(read!(u16, bytes, order))),
        ElementKind::SignedShort => Scalar::Int(i32::from(read!(i16, bytes, order))),
        ElementKind::UnsignedChar => Scalar::UInt(u32::from(read!(u8, bytes, order))),
        ElementKind::SignedChar => Scalar::Int(i32::from(read!(i8, bytes, order))),
        ElementKind::Float => Scalar::Double(f64::from(read!(f32, bytes, order))),
        ElementKind::Double => Scalar::Double(read!(f64, bytes, order)),
        ElementKind::Int128 => Scalar::ULong(read!(u64, bytes, order)),
    }
}

/// Split `vector` into the elements `rule` formats, in output order.
///
/// For the 128-bit path the result is exactly two halves. On little-endian
/// images the half stored second in memory is the numerically high one and
/// comes out first; on big-endian images memory order already is high-first.
pub fn extract(vector: &VectorValue, rule: &ConversionRule, order: ByteOrder) -> Vec<Scalar> {
    let lanes = vector.as_bytes().chunks_exact(rule.kind.size());

    let mut elements: Vec<Scalar> = lanes.map(|bytes| decode(rule.kind, bytes, order)).collect();
    if rule.kind == ElementKind::Int128 && order == ByteOrder::Little {
        elements.reverse();
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierKind;
    use crate::rules::lookup;

    #[test]
    fn test_signed_bytes_sign_extend() {
        let vector = VectorValue::from_i8s(
            [-128, -1, 0, 1, 127, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            ByteOrder::native(),
        );
        let rule = lookup('d', ModifierKind::V).unwrap();
        let elements = extract(&vector, rule, ByteOrder::native());

        assert_eq!(elements.len(), 16);
        assert_eq!(&elements[..5], &[
            Scalar::Int(-128),
            Scalar::Int(-1),
            Scalar::Int(0),
            Scalar::Int(1),
            Scalar::Int(127),
        ]);
    }

    #[test]
    fn test_unsigned_view_of_signed_bytes() {
        let vector = VectorValue::from_i8s([-1; 16], ByteOrder::native());
        let rule = lookup('u', ModifierKind::V).unwrap();
        let elements = extract(&vector, rule, ByteOrder::native());
        assert!(elements.iter().all(|e| *e == Scalar::UInt(255)));
    }

    #[test]
    fn test_lanes_keep_memory_order_in_both_byte_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let vector = VectorValue::from_u16s([1, 2, 3, 4, 5, 6, 7, 0xffff], order);
            let rule = lookup('u', ModifierKind::Vh).unwrap();
            let elements = extract(&vector, rule, order);
            let expected: Vec<_> = [1, 2, 3, 4, 5, 6, 7, 0xffff]
                .into_iter()
                .map(Scalar::UInt)
                .collect();
            assert_eq!(elements, expected);
        }
    }

    #[test]
    fn test_floats_are_promoted() {
        let vector = VectorValue::from_f32s([1.5, -0.25, 0.0, 42.0], ByteOrder::native());
        let rule = lookup('f', ModifierKind::V).unwrap();
        let elements = extract(&vector, rule, ByteOrder::native());
        assert_eq!(elements[0], Scalar::Double(1.5));
        assert_eq!(elements[1], Scalar::Double(-0.25));
        assert_eq!(elements[3], Scalar::Double(42.0));
    }

    #[test]
    fn test_int128_high_half_first() {
        let value = 0xfedc_ba98_7654_3210_0123_4567_89ab_cdefu128;
        let rule = lookup('x', ModifierKind::Vz).unwrap();

        for order in [ByteOrder::Little, ByteOrder::Big] {
            let vector = VectorValue::from_u128(value, order);
            let halves = extract(&vector, rule, order);
            assert_eq!(
                halves,
                vec![
                    Scalar::ULong(0xfedc_ba98_7654_3210),
                    Scalar::ULong(0x0123_4567_89ab_cdef),
                ],
                "{:?}",
                order
            );
        }
    }
}
