// Conversion rule tables
//
// One table for integer conversions and one for floating-point conversions.
// Each entry names the conversion, the modifier it applies to, the element
// layout and the scalar suffix appended to the synthesized per-element format.
// Aliased modifiers (vl/lv, vh/hv, vz/zv) are physically duplicated entries.

use crate::modifier::{ModifierBits, ModifierKind, ModifierRegistry};
use crate::vector::VECTOR_WIDTH_BYTES;
use log::debug;
use std::fmt;

/// Conversion family; each family has its own table and dispatch path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Integer,
    Float,
}

/// Integer conversions registered with the host
pub const INTEGER_CONVERSIONS: [char; 7] = ['d', 'i', 'o', 'u', 'x', 'X', 'c'];

/// Floating-point conversions registered with the host
pub const FLOAT_CONVERSIONS: [char; 8] = ['f', 'F', 'e', 'E', 'g', 'G', 'a', 'A'];

impl Family {
    pub fn of(conversion: char) -> Option<Family> {
        if INTEGER_CONVERSIONS.contains(&conversion) {
            Some(Family::Integer)
        } else if FLOAT_CONVERSIONS.contains(&conversion) {
            Some(Family::Float)
        } else {
            None
        }
    }

    pub fn rules(self) -> &'static [ConversionRule] {
        match self {
            Family::Integer => INT_RULES,
            Family::Float => FLOAT_RULES,
        }
    }

    pub fn conversions(self) -> &'static [char] {
        match self {
            Family::Integer => &INTEGER_CONVERSIONS,
            Family::Float => &FLOAT_CONVERSIONS,
        }
    }
}

/// How a lane of the vector is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    UnsignedInt,
    SignedInt,
    UnsignedShort,
    SignedShort,
    UnsignedChar,
    SignedChar,
    Float,
    Double,
    /// One 128-bit integer, formatted as two 64-bit halves
    Int128,
}

impl ElementKind {
    /// Lane size in bytes (the half size for `Int128`)
    pub fn size(self) -> usize {
        match self {
            ElementKind::UnsignedChar | ElementKind::SignedChar => 1,
            ElementKind::UnsignedShort | ElementKind::SignedShort => 2,
            ElementKind::UnsignedInt | ElementKind::SignedInt | ElementKind::Float => 4,
            ElementKind::Double | ElementKind::Int128 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementKind::Float | ElementKind::Double)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElementKind::UnsignedInt => "unsigned int",
            ElementKind::SignedInt => "signed int",
            ElementKind::UnsignedShort => "unsigned short",
            ElementKind::SignedShort => "signed short",
            ElementKind::UnsignedChar => "unsigned char",
            ElementKind::SignedChar => "signed char",
            ElementKind::Float => "float",
            ElementKind::Double => "double",
            ElementKind::Int128 => "int128",
        };
        f.write_str(name)
    }
}

/// One legal (conversion, modifier) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub conversion: char,
    pub modifier: ModifierKind,
    pub element_size: usize,
    pub kind: ElementKind,
    /// Length modifier and conversion letter of the per-element directive
    pub suffix: &'static str,
}

impl ConversionRule {
    const fn new(
        conversion: char,
        modifier: ModifierKind,
        suffix: &'static str,
        element_size: usize,
        kind: ElementKind,
    ) -> Self {
        Self {
            conversion,
            modifier,
            element_size,
            kind,
            suffix,
        }
    }

    /// Number of scalar outputs produced for one vector
    pub fn element_count(&self) -> usize {
        match self.kind {
            ElementKind::Int128 => 2,
            _ => VECTOR_WIDTH_BYTES / self.element_size,
        }
    }

    /// Separator written between consecutive outputs.
    ///
    /// Character vectors read as a contiguous string and the two halves of a
    /// 128-bit value form one number, so neither gets a separator.
    pub fn separator(&self) -> Option<u8> {
        if self.conversion == 'c' || self.kind == ElementKind::Int128 {
            None
        } else {
            Some(b' ')
        }
    }

    pub fn family(&self) -> Family {
        if self.kind.is_float() {
            Family::Float
        } else {
            Family::Integer
        }
    }
}

use ElementKind::*;
use ModifierKind::{Hv, Lv, Vh, Vl, Vv, Vz, Zv, V};

const fn rule(
    conversion: char,
    modifier: ModifierKind,
    suffix: &'static str,
    element_size: usize,
    kind: ElementKind,
) -> ConversionRule {
    ConversionRule::new(conversion, modifier, suffix, element_size, kind)
}

pub static INT_RULES: &[ConversionRule] = &[
    rule('d', Vl, "d", 4, SignedInt),
    rule('d', Lv, "d", 4, SignedInt),
    rule('d', Vh, "hd", 2, SignedShort),
    rule('d', Hv, "hd", 2, SignedShort),
    rule('d', V, "hhd", 1, SignedChar),
    //
    rule('i', Vl, "i", 4, SignedInt),
    rule('i', Lv, "i", 4, SignedInt),
    rule('i', Vh, "hi", 2, SignedShort),
    rule('i', Hv, "hi", 2, SignedShort),
    rule('i', V, "hhi", 1, SignedChar),
    //
    rule('o', Vl, "o", 4, UnsignedInt),
    rule('o', Lv, "o", 4, UnsignedInt),
    rule('o', Vh, "ho", 2, UnsignedShort),
    rule('o', Hv, "ho", 2, UnsignedShort),
    rule('o', V, "hho", 1, UnsignedChar),
    //
    rule('u', Vl, "u", 4, UnsignedInt),
    rule('u', Lv, "u", 4, UnsignedInt),
    rule('u', Vh, "hu", 2, UnsignedShort),
    rule('u', Hv, "hu", 2, UnsignedShort),
    rule('u', V, "hhu", 1, UnsignedChar),
    //
    rule('x', Vl, "x", 4, UnsignedInt),
    rule('x', Lv, "x", 4, UnsignedInt),
    rule('x', Vh, "hx", 2, UnsignedShort),
    rule('x', Hv, "hx", 2, UnsignedShort),
    rule('x', V, "hhx", 1, UnsignedChar),
    //
    rule('X', Vl, "X", 4, UnsignedInt),
    rule('X', Lv, "X", 4, UnsignedInt),
    rule('X', Vh, "hX", 2, UnsignedShort),
    rule('X', Hv, "hX", 2, UnsignedShort),
    rule('X', V, "hhX", 1, UnsignedChar),
    //
    rule('c', V, "c", 1, UnsignedChar),
    // 128-bit integers, printed as two 64-bit halves
    rule('d', Vz, "ld", 8, Int128),
    rule('d', Zv, "ld", 8, Int128),
    rule('i', Vz, "li", 8, Int128),
    rule('i', Zv, "li", 8, Int128),
    rule('o', Vz, "lo", 8, Int128),
    rule('o', Zv, "lo", 8, Int128),
    rule('u', Vz, "lu", 8, Int128),
    rule('u', Zv, "lu", 8, Int128),
    rule('x', Vz, "lx", 8, Int128),
    rule('x', Zv, "lx", 8, Int128),
    rule('X', Vz, "lX", 8, Int128),
    rule('X', Zv, "lX", 8, Int128),
];

pub static FLOAT_RULES: &[ConversionRule] = &[
    rule('f', V, "f", 4, Float),
    rule('F', V, "F", 4, Float),
    rule('e', V, "e", 4, Float),
    rule('E', V, "E", 4, Float),
    rule('g', V, "g", 4, Float),
    rule('G', V, "G", 4, Float),
    rule('a', V, "a", 4, Float),
    rule('A', V, "A", 4, Float),
    //
    rule('f', Vv, "f", 8, Double),
    rule('F', Vv, "F", 8, Double),
    rule('e', Vv, "e", 8, Double),
    rule('E', Vv, "E", 8, Double),
    rule('g', Vv, "g", 8, Double),
    rule('G', Vv, "G", 8, Double),
    rule('a', Vv, "a", 8, Double),
    rule('A', Vv, "A", 8, Double),
];

/// Find the rule for a host request: first entry of the conversion's family
/// table whose modifier handle is present in `bits`.
pub fn resolve(
    conversion: char,
    bits: ModifierBits,
    registry: &ModifierRegistry,
) -> Option<&'static ConversionRule> {
    let family = Family::of(conversion)?;
    let found = family
        .rules()
        .iter()
        .find(|rule| rule.conversion == conversion && registry.matches(rule.modifier, bits));

    match found {
        Some(rule) => debug!(
            "resolved %{}{} -> {} x{} ({})",
            rule.modifier,
            conversion,
            rule.kind,
            rule.element_count(),
            rule.suffix
        ),
        None => debug!("no vector rule for '{}' with bits {:#06x}", conversion, bits),
    }

    found
}

/// Find the rule for a typed modifier, bypassing host handles
pub fn lookup(conversion: char, modifier: ModifierKind) -> Option<&'static ConversionRule> {
    let family = Family::of(conversion)?;
    family
        .rules()
        .iter()
        .find(|rule| rule.conversion == conversion && rule.modifier == modifier)
}

/// Every rule, integer table first
pub fn all_rules() -> impl Iterator<Item = &'static ConversionRule> {
    INT_RULES.iter().chain(FLOAT_RULES.iter())
}
