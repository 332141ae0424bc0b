// glibc `struct printf_info` mirror

use libc::{c_int, wchar_t};
use vecpf_core::{Flags, FormatRequest, ModifierBits};

/// Layout of glibc's `struct printf_info`.
///
/// The sixteen one-bit fields share the storage unit that follows `spec`;
/// `user` carries the modifier bits the host matched in the directive.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintfInfo {
    pub prec: c_int,
    pub width: c_int,
    pub spec: wchar_t,
    bits: u16,
    pub user: u16,
    pub pad: wchar_t,
}

/// Bit positions inside the bitfield storage, counted from the first field
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
enum InfoBit {
    Alt = 3,
    Space = 4,
    Left = 5,
    ShowSign = 6,
    Group = 7,
}

impl InfoBit {
    // GCC allocates bitfields from the most significant end on big-endian
    fn mask(self) -> u16 {
        if cfg!(target_endian = "little") {
            1 << (self as u8)
        } else {
            1 << (15 - self as u8)
        }
    }
}

impl PrintfInfo {
    pub fn new(spec: char) -> Self {
        Self {
            prec: -1,
            spec: spec as wchar_t,
            pad: ' ' as wchar_t,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: ModifierBits) -> Self {
        self.user = user;
        self
    }

    pub fn with_width(mut self, width: c_int) -> Self {
        self.width = width;
        self
    }

    pub fn with_prec(mut self, prec: c_int) -> Self {
        self.prec = prec;
        self
    }

    pub fn with_pad(mut self, pad: char) -> Self {
        self.pad = pad as wchar_t;
        self
    }

    pub fn with_flags(mut self, flags: &Flags) -> Self {
        let pairs = [
            (flags.alt, InfoBit::Alt),
            (flags.space, InfoBit::Space),
            (flags.left, InfoBit::Left),
            (flags.showsign, InfoBit::ShowSign),
            (flags.group, InfoBit::Group),
        ];
        for (set, bit) in pairs {
            if set {
                self.bits |= bit.mask();
            }
        }
        if flags.zero_pad {
            self.pad = '0' as wchar_t;
        }
        self
    }

    fn has(&self, bit: InfoBit) -> bool {
        self.bits & bit.mask() != 0
    }

    /// Conversion character, or `None` if `spec` is not a valid char
    pub fn conversion(&self) -> Option<char> {
        u32::try_from(self.spec).ok().and_then(char::from_u32)
    }

    pub fn flags(&self) -> Flags {
        Flags {
            alt: self.has(InfoBit::Alt),
            space: self.has(InfoBit::Space),
            left: self.has(InfoBit::Left),
            showsign: self.has(InfoBit::ShowSign),
            group: self.has(InfoBit::Group),
            zero_pad: self.pad == '0' as wchar_t,
        }
    }

    /// Request the engine understands. glibc reports an absent width as 0
    /// and an absent precision as -1.
    pub fn to_request(&self) -> Option<FormatRequest> {
        let mut request = FormatRequest::new(self.conversion()?, self.user).with_flags(self.flags());
        if let Ok(width) = usize::try_from(self.width) {
            if width > 0 {
                request = request.with_width(width);
            }
        }
        if let Ok(precision) = usize::try_from(self.prec) {
            request = request.with_precision(precision);
        }
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_glibc() {
        assert_eq!(std::mem::size_of::<PrintfInfo>(), 20);
        assert_eq!(std::mem::align_of::<PrintfInfo>(), 4);
    }

    #[test]
    fn test_plain_directive() {
        let request = PrintfInfo::new('u').with_user(0x4).to_request().unwrap();
        assert_eq!(request.conversion, 'u');
        assert_eq!(request.modifier_bits, 0x4);
        assert_eq!(request.flags, Flags::none());
        assert_eq!(request.width, None);
        assert_eq!(request.precision, None);
    }

    #[test]
    fn test_flags_width_precision() {
        let flags = Flags {
            alt: true,
            left: true,
            group: true,
            ..Flags::none()
        };
        let info = PrintfInfo::new('x')
            .with_flags(&flags)
            .with_width(12)
            .with_prec(0);
        let request = info.to_request().unwrap();

        assert_eq!(request.flags, flags);
        assert_eq!(request.width, Some(12));
        assert_eq!(request.precision, Some(0));
    }

    #[test]
    fn test_zero_pad_comes_from_pad_character() {
        let info = PrintfInfo::new('d').with_pad('0');
        assert!(info.flags().zero_pad);
        assert!(!PrintfInfo::new('d').flags().zero_pad);
    }
}
