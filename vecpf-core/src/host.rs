// Host plugin ABI seam
//
// The engine never talks to a printf implementation directly. Registration
// goes through `PrintfHost`, which is implemented by the glibc shim in
// vecpf-runtime and by `BitHost` for in-process use.

use crate::modifier::ModifierBits;
use crate::rules::Family;

/// Argument type handle returned by the host for the vector type
pub type ArgType = i32;

/// Registration surface of a printf-family host.
pub trait PrintfHost {
    /// Register the 16-byte vector argument type and its copy callback.
    /// Returns `None` when the host refuses the type.
    fn register_vector_type(&mut self) -> Option<ArgType>;

    /// Register a size modifier token. The returned handle is the bit the
    /// host will set in a request's modifier mask when the token is present.
    fn register_modifier(&mut self, token: &str) -> Option<ModifierBits>;

    /// Register the dispatch callback for one conversion character.
    fn register_specifier(&mut self, conversion: char, family: Family) -> bool;
}

/// First argument type number available to user types (glibc's `PA_LAST`)
pub const FIRST_USER_TYPE: ArgType = 8;

/// In-process host handing out one bit per modifier, in registration order,
/// the way glibc's modifier table does.
#[derive(Debug, Default)]
pub struct BitHost {
    next_bit: u32,
    next_type: Option<ArgType>,
    modifiers: Vec<(String, ModifierBits)>,
    specifiers: Vec<(char, Family)>,
    refused: Vec<String>,
}

impl BitHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that refuses the given modifier tokens
    pub fn refusing(tokens: &[&str]) -> Self {
        Self {
            refused: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn modifiers(&self) -> &[(String, ModifierBits)] {
        &self.modifiers
    }

    pub fn specifiers(&self) -> &[(char, Family)] {
        &self.specifiers
    }
}

impl PrintfHost for BitHost {
    fn register_vector_type(&mut self) -> Option<ArgType> {
        let arg_type = self.next_type.unwrap_or(FIRST_USER_TYPE);
        self.next_type = Some(arg_type + 1);
        Some(arg_type)
    }

    fn register_modifier(&mut self, token: &str) -> Option<ModifierBits> {
        if self.refused.iter().any(|t| t == token) {
            return None;
        }
        if self.next_bit >= ModifierBits::BITS {
            return None;
        }

        let bits: ModifierBits = 1 << self.next_bit;
        self.next_bit += 1;
        self.modifiers.push((token.to_string(), bits));
        Some(bits)
    }

    fn register_specifier(&mut self, conversion: char, family: Family) -> bool {
        self.specifiers.push((conversion, family));
        true
    }
}
