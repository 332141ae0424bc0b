// Conformance self-test
//
// Runs every registered vector directive across a flag, width and precision
// matrix and compares the engine's output with the plain scalar directive
// applied to each lane in an explicit loop.

use anyhow::{Context, Result};
use log::debug;
use std::ffi::CString;
use vecpf_core::rules::all_rules;
use vecpf_core::{
    ByteOrder, ConversionRule, Directive, ElementKind, Engine, Flags, LibcFormatter, Scalar,
    VectorValue,
};

/// A directive whose vector output differs from the scalar loop
#[derive(Debug)]
pub struct Mismatch {
    pub directive: String,
    pub scalar: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub passed: usize,
    pub skipped: usize,
    pub mismatches: Vec<Mismatch>,
}

impl CheckReport {
    pub fn failed(&self) -> usize {
        self.mismatches.len()
    }
}

const FLAG_COUNT: usize = 6;

fn with_flag(mut flags: Flags, index: usize) -> Flags {
    match index {
        0 => flags.left = true,
        1 => flags.showsign = true,
        2 => flags.space = true,
        3 => flags.alt = true,
        4 => flags.group = true,
        _ => flags.zero_pad = true,
    }
    flags
}

/// No flag, every single flag and every pair of flags
fn flag_sets() -> Vec<Flags> {
    let mut sets = vec![Flags::none()];
    for a in 0..FLAG_COUNT {
        sets.push(with_flag(Flags::none(), a));
        for b in a + 1..FLAG_COUNT {
            sets.push(with_flag(with_flag(Flags::none(), a), b));
        }
    }
    sets
}

type Size = (Option<usize>, Option<usize>);

const INTEGER_SIZES: [Size; 4] = [(None, None), (None, Some(5)), (Some(12), None), (Some(15), Some(7))];
const FLOAT_SIZES: [Size; 4] = [(None, None), (None, Some(9)), (Some(20), None), (Some(25), Some(3))];

/// A test register and the lane values it was built from, in output order
struct Sample {
    vector: VectorValue,
    lanes: Vec<Scalar>,
}

fn ints<T: Copy + Into<i32>>(lanes: &[T]) -> Vec<Scalar> {
    lanes.iter().map(|&v| Scalar::Int(v.into())).collect()
}

fn uints<T: Copy + Into<u32>>(lanes: &[T]) -> Vec<Scalar> {
    lanes.iter().map(|&v| Scalar::UInt(v.into())).collect()
}

fn doubles<T: Copy + Into<f64>>(lanes: &[T]) -> Vec<Scalar> {
    lanes.iter().map(|&v| Scalar::Double(v.into())).collect()
}

const UNSIGNED_CHARS: [u8; 16] = [
    b't', b'h', b'i', b's', b' ', b's', b'p', b'a', b'c', b'e', b' ', 0, 15, 127, 128, 255,
];

/// Test register for each lane type
fn sample(rule: &ConversionRule, order: ByteOrder) -> Sample {
    let (vector, lanes) = match rule.kind {
        ElementKind::UnsignedInt => {
            let lanes = [4294967295u32, 0, 39, 2147483647];
            (VectorValue::from_u32s(lanes, order), uints(&lanes))
        }
        ElementKind::SignedInt => {
            let lanes = [i32::MIN, 0, 39, i32::MAX];
            (VectorValue::from_i32s(lanes, order), ints(&lanes))
        }
        ElementKind::UnsignedShort => {
            let lanes = [65535u16, 0, 39, 42, 101, 16384, 32767, 32768];
            (VectorValue::from_u16s(lanes, order), uints(&lanes))
        }
        ElementKind::SignedShort => {
            let lanes = [-32768i16, -127, -1, 0, 127, 256, 16384, 32767];
            (VectorValue::from_i16s(lanes, order), ints(&lanes))
        }
        ElementKind::UnsignedChar if rule.conversion == 'c' => {
            let lanes = *b"this space is fo";
            (VectorValue::from_u8s(lanes), uints(&lanes))
        }
        ElementKind::UnsignedChar => (VectorValue::from_u8s(UNSIGNED_CHARS), uints(&UNSIGNED_CHARS)),
        ElementKind::SignedChar => {
            let lanes: [i8; 16] = [-128, -120, -99, -61, -43, -38, -1, 0, 1, 19, 76, 85, 10, 123, 126, 127];
            (VectorValue::from_i8s(lanes, order), ints(&lanes))
        }
        ElementKind::Float => {
            let lanes = [-(11.0f32 / 9.0), 0.123_456_79, 42.0, 9_876_543_000.0];
            (VectorValue::from_f32s(lanes, order), doubles(&lanes))
        }
        ElementKind::Double => {
            let lanes = [f64::from(-(11.0f32 / 9.0f32)), 9_876_543_210.123_457];
            (VectorValue::from_f64s(lanes, order), doubles(&lanes))
        }
        ElementKind::Int128 => {
            let value = (((-0x0123_4567_89ab_cdefi128) << 64) + 0xfedc_ba98_7654_3210) as u128;
            // High half first, whatever the byte order
            let lanes = vec![Scalar::ULong((value >> 64) as u64), Scalar::ULong(value as u64)];
            (VectorValue::from_u128(value, order), lanes)
        }
    };
    Sample { vector, lanes }
}

/// Format each lane with the plain scalar directive, joined the same way
/// the engine joins them.
fn scalar_loop(scalar: &str, rule: &ConversionRule, lanes: &[Scalar]) -> Result<Vec<u8>> {
    let directive = CString::new(scalar).with_context(|| format!("bad directive {:?}", scalar))?;
    let separator: &[u8] = if rule.conversion == 'c' || rule.kind == ElementKind::Int128 {
        b""
    } else {
        b" "
    };

    let mut out = Vec::new();
    for (index, &value) in lanes.iter().enumerate() {
        if index > 0 {
            out.extend_from_slice(separator);
        }
        LibcFormatter.format_directive(&directive, value, &mut out)?;
    }
    Ok(out)
}

pub fn run(engine: &Engine) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    let order = engine.byte_order();
    let flag_sets = flag_sets();

    for rule in all_rules() {
        if engine.registry().bits(rule.modifier).is_none() {
            debug!("skipping %{}{}: modifier not registered", rule.modifier, rule.conversion);
            report.skipped += 1;
            continue;
        }

        let sample = sample(rule, order);
        let sizes = if rule.kind.is_float() { &FLOAT_SIZES } else { &INTEGER_SIZES };

        for flags in &flag_sets {
            for &(width, precision) in sizes {
                let directive = Directive {
                    flags: *flags,
                    width,
                    precision,
                    modifier: rule.modifier,
                    conversion: rule.conversion,
                };
                let Some(request) = directive.to_request(engine.registry()) else {
                    continue;
                };

                let scalar = directive.scalar_text(rule);
                let expected = scalar_loop(&scalar, rule, &sample.lanes)?;
                let actual = engine.format_to_vec(&request, &sample.vector)?;

                if actual == expected {
                    report.passed += 1;
                } else {
                    report.mismatches.push(Mismatch {
                        directive: directive.to_string(),
                        scalar,
                        expected: String::from_utf8_lossy(&expected).into_owned(),
                        actual: String::from_utf8_lossy(&actual).into_owned(),
                    });
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecpf_core::rules::lookup;
    use vecpf_core::{BitHost, EngineConfig, ModifierKind, INT128_SUPPORTED};

    #[test]
    fn test_flag_sets() {
        let sets = flag_sets();
        assert_eq!(sets.len(), 1 + 6 + 15);
        assert_eq!(sets[0], Flags::none());
        assert!(sets.iter().skip(1).all(|flags| *flags != Flags::none()));
    }

    #[test]
    fn test_full_matrix_passes() {
        let engine = Engine::initialize(&EngineConfig::default(), &mut BitHost::new());
        let report = run(&engine).unwrap();
        assert!(report.mismatches.is_empty(), "{:#?}", report.mismatches);
        assert_eq!(report.skipped, if INT128_SUPPORTED { 0 } else { 12 });
        assert!(report.passed > 0);
    }

    #[test]
    fn test_int128_sample_is_high_half_first() {
        let rule = lookup('x', ModifierKind::Vz).unwrap();
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let sample = sample(rule, order);
            assert_eq!(
                sample.lanes,
                vec![
                    Scalar::ULong(0xfedc_ba98_7654_3211),
                    Scalar::ULong(0xfedc_ba98_7654_3210),
                ]
            );
        }
    }

    #[test]
    fn test_expected_output_does_not_come_from_the_engine() {
        // Lanes stored in the opposite byte order decode differently, so the
        // engine output must disagree with the scalar loop.
        let rule = lookup('u', ModifierKind::Vl).unwrap();
        let sample = sample(rule, ByteOrder::Big);
        let engine = Engine::initialize(
            &EngineConfig {
                byte_order: Some(ByteOrder::Little),
                ..EngineConfig::default()
            },
            &mut BitHost::new(),
        );
        let request = engine.request('u', ModifierKind::Vl).unwrap();

        let expected = scalar_loop("%u", rule, &sample.lanes).unwrap();
        assert_eq!(expected, b"4294967295 0 39 2147483647");
        assert_ne!(engine.format_to_vec(&request, &sample.vector).unwrap(), expected);
    }

    #[test]
    fn test_disabled_modifiers_are_skipped() {
        let config = EngineConfig {
            int128: false,
            ..EngineConfig::default()
        };
        let engine = Engine::initialize(&config, &mut BitHost::new());
        let report = run(&engine).unwrap();
        assert_eq!(report.failed(), 0);
        // vz and zv rules for d i o u x X
        assert_eq!(report.skipped, 12);
    }
}
