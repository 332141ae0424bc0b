// Per-element scalar format synthesis

use crate::request::Flags;
use crate::rules::ConversionRule;
use std::ffi::CStr;
use std::fmt;

/// Longest per-element format the synthesizer may produce, excluding the
/// terminating NUL. `%# -+'0*.*hhd` is 13 bytes.
pub const SCALAR_FORMAT_MAX: usize = 16;

/// A synthesized scalar format such as `%-*.*hhd`.
///
/// Width and precision are always `*` placeholders, filled at format time
/// with the request's width and precision (or the no-precision sentinel).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ScalarFormat {
    // Always NUL terminated: the last byte is never written
    buf: [u8; SCALAR_FORMAT_MAX + 1],
    len: usize,
}

impl ScalarFormat {
    fn empty() -> Self {
        Self {
            buf: [0; SCALAR_FORMAT_MAX + 1],
            len: 0,
        }
    }

    fn push(&mut self, byte: u8) {
        match self.buf.get_mut(self.len) {
            Some(slot) if self.len < SCALAR_FORMAT_MAX => {
                *slot = byte;
                self.len += 1;
            }
            _ => unreachable!(
                "scalar format exceeds {} bytes; the rule table and SCALAR_FORMAT_MAX disagree",
                SCALAR_FORMAT_MAX
            ),
        }
    }

    fn push_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.push(byte);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.get(..self.len).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever pushed
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// NUL-terminated view for C formatters
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_until_nul(&self.buf).ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ScalarFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ScalarFormat({:?})", self.as_str())
    }
}

impl fmt::Display for ScalarFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the single-element directive equivalent to the vector directive.
///
/// Flags are emitted in the fixed order `# -+'`, followed by `0` only when
/// the output is not left-justified.
pub fn synthesize(rule: &ConversionRule, flags: &Flags) -> ScalarFormat {
    let mut format = ScalarFormat::empty();

    format.push(b'%');
    if flags.alt {
        format.push(b'#');
    }
    if flags.space {
        format.push(b' ');
    }
    if flags.left {
        format.push(b'-');
    }
    if flags.showsign {
        format.push(b'+');
    }
    if flags.group {
        format.push(b'\'');
    }
    if flags.zero_pad && !flags.left {
        format.push(b'0');
    }

    format.push_str("*.*");
    format.push_str(rule.suffix);
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierKind;
    use crate::rules::{all_rules, lookup};

    fn all_flags() -> Flags {
        Flags {
            alt: true,
            space: true,
            left: false,
            showsign: true,
            group: true,
            zero_pad: true,
        }
    }

    #[test]
    fn test_plain() {
        let rule = lookup('u', ModifierKind::Vl).unwrap();
        assert_eq!(synthesize(rule, &Flags::none()).as_str(), "%*.*u");
    }

    #[test]
    fn test_flag_order() {
        let rule = lookup('d', ModifierKind::V).unwrap();
        let flags = Flags {
            left: true,
            zero_pad: false,
            ..all_flags()
        };
        assert_eq!(synthesize(rule, &flags).as_str(), "%# -+'*.*hhd");
    }

    #[test]
    fn test_zero_pad_dropped_when_left_justified() {
        let rule = lookup('x', ModifierKind::Vh).unwrap();
        let flags = Flags {
            left: true,
            zero_pad: true,
            ..Flags::none()
        };
        assert_eq!(synthesize(rule, &flags).as_str(), "%-*.*hx");

        let flags = Flags {
            zero_pad: true,
            ..Flags::none()
        };
        assert_eq!(synthesize(rule, &flags).as_str(), "%0*.*hx");
    }

    #[test]
    fn test_every_rule_fits_with_every_flag() {
        for rule in all_rules() {
            let format = synthesize(rule, &all_flags());
            assert!(format.len() <= SCALAR_FORMAT_MAX);
            assert_eq!(format.as_c_str().unwrap().to_bytes(), format.as_bytes());
        }
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut format = ScalarFormat::empty();
        format.push_str("%# -+'0*.*hhd123");
        assert_eq!(format.len(), SCALAR_FORMAT_MAX);
        assert_eq!(format.as_c_str().unwrap().to_bytes().len(), SCALAR_FORMAT_MAX);
    }

    #[test]
    #[should_panic(expected = "scalar format exceeds")]
    fn test_overflow_panics_instead_of_truncating() {
        let mut format = ScalarFormat::empty();
        format.push_str("%# -+'0*.*hhd1234");
    }
}
