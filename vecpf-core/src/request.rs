// Structured format request handed over by the host

use crate::modifier::ModifierBits;
use std::fmt;

/// Sentinel passed to the scalar formatter for "no precision"
pub const NO_PRECISION: i32 = -1;

/// printf flag characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// `#`
    pub alt: bool,
    /// ` `
    pub space: bool,
    /// `-`
    pub left: bool,
    /// `+`
    pub showsign: bool,
    /// `'`
    pub group: bool,
    /// `0`
    pub zero_pad: bool,
}

impl Flags {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Writes the flags in the canonical order `# -+'0`
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ordered = [
            (self.alt, '#'),
            (self.space, ' '),
            (self.left, '-'),
            (self.showsign, '+'),
            (self.group, '\''),
            (self.zero_pad, '0'),
        ];
        for (set, ch) in ordered {
            if set {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

/// One vector directive as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRequest {
    pub conversion: char,
    pub modifier_bits: ModifierBits,
    pub flags: Flags,
    pub width: Option<usize>,
    /// `Some(0)` and `None` differ: an absent precision keeps the integer
    /// zero-padding defaults
    pub precision: Option<usize>,
}

impl FormatRequest {
    pub fn new(conversion: char, modifier_bits: ModifierBits) -> Self {
        Self {
            conversion,
            modifier_bits,
            flags: Flags::none(),
            width: None,
            precision: None,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Width as passed to the `*` of the scalar format
    pub fn width_arg(&self) -> i32 {
        self.width
            .map_or(0, |w| i32::try_from(w).unwrap_or(i32::MAX))
    }

    /// Precision as passed to the `.*` of the scalar format
    pub fn precision_arg(&self) -> i32 {
        self.precision
            .map_or(NO_PRECISION, |p| i32::try_from(p).unwrap_or(i32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_display_order() {
        let flags = Flags {
            alt: true,
            space: true,
            left: true,
            showsign: true,
            group: true,
            zero_pad: true,
        };
        assert_eq!(flags.to_string(), "# -+'0");
        assert_eq!(Flags::none().to_string(), "");
    }

    #[test]
    fn test_runtime_arguments() {
        let request = FormatRequest::new('d', 1);
        assert_eq!(request.width_arg(), 0);
        assert_eq!(request.precision_arg(), NO_PRECISION);

        let request = request.with_width(12).with_precision(0);
        assert_eq!(request.width_arg(), 12);
        assert_eq!(request.precision_arg(), 0);
    }
}
