// Modifier registry
//
// The token set is closed. Every token gets one handle from the host at
// initialization; after that the registry is read-only.

use crate::config::{EngineConfig, INT128_SUPPORTED};
use crate::host::PrintfHost;
use log::{debug, warn};
use std::fmt;

/// Modifier mask as delivered by the host (glibc's `printf_info::user`)
pub type ModifierBits = u16;

/// Vector size modifiers.
///
/// `Vl`/`Lv`, `Vh`/`Hv` and `Vz`/`Zv` are aliases. They stay distinct kinds so
/// each one can carry its own host handle; the rule table duplicates their
/// entries instead of folding them at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    /// Vector of 4-byte integers
    Vl,
    Lv,
    /// Vector of 2-byte integers
    Vh,
    Hv,
    /// Vector of bytes, or of single precision floats
    V,
    /// Vector of double precision floats
    Vv,
    /// Vector holding one 128-bit integer
    Vz,
    Zv,
}

impl ModifierKind {
    /// Registration order
    pub const ALL: [ModifierKind; 8] = [
        ModifierKind::Vl,
        ModifierKind::Lv,
        ModifierKind::Vh,
        ModifierKind::Hv,
        ModifierKind::V,
        ModifierKind::Vv,
        ModifierKind::Vz,
        ModifierKind::Zv,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ModifierKind::Vl => "vl",
            ModifierKind::Lv => "lv",
            ModifierKind::Vh => "vh",
            ModifierKind::Hv => "hv",
            ModifierKind::V => "v",
            ModifierKind::Vv => "vv",
            ModifierKind::Vz => "vz",
            ModifierKind::Zv => "zv",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// The spelling this kind is an alias of (itself for canonical kinds)
    pub fn canonical(self) -> Self {
        match self {
            ModifierKind::Lv => ModifierKind::Vl,
            ModifierKind::Hv => ModifierKind::Vh,
            ModifierKind::Zv => ModifierKind::Vz,
            other => other,
        }
    }

    /// Whether the configured capabilities allow this modifier
    fn enabled(self, config: &EngineConfig) -> bool {
        match self {
            ModifierKind::Vv => config.vector_double,
            ModifierKind::Vz | ModifierKind::Zv => config.int128 && INT128_SUPPORTED,
            _ => true,
        }
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One registered modifier and the handle the host assigned to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierEntry {
    pub kind: ModifierKind,
    /// `None` if the host refused the token
    pub bits: Option<ModifierBits>,
}

impl ModifierEntry {
    pub fn token(&self) -> &'static str {
        self.kind.token()
    }
}

/// Table of registered modifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierRegistry {
    entries: Vec<ModifierEntry>,
}

impl ModifierRegistry {
    /// Register every enabled modifier with the host, in table order.
    ///
    /// A refused registration is not an error: the modifier simply stays
    /// unrecognized and directives using it are declined.
    pub fn register<H: PrintfHost + ?Sized>(host: &mut H, config: &EngineConfig) -> Self {
        let entries = ModifierKind::ALL
            .into_iter()
            .filter(|kind| kind.enabled(config))
            .map(|kind| {
                let bits = host.register_modifier(kind.token());
                match bits {
                    Some(bits) => debug!("registered modifier '{}' as {:#06x}", kind, bits),
                    None => warn!("host refused modifier '{}'; it will not be recognized", kind),
                }
                ModifierEntry { kind, bits }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ModifierEntry] {
        &self.entries
    }

    /// Handle assigned to `kind`, if it was registered
    pub fn bits(&self, kind: ModifierKind) -> Option<ModifierBits> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .and_then(|entry| entry.bits)
    }

    /// Does the request mask carry `kind`?
    pub fn matches(&self, kind: ModifierKind, bits: ModifierBits) -> bool {
        self.bits(kind).is_some_and(|handle| bits & handle != 0)
    }

    /// Does the request mask carry any registered modifier?
    pub fn claims(&self, bits: ModifierBits) -> bool {
        self.entries
            .iter()
            .filter_map(|entry| entry.bits)
            .any(|handle| bits & handle != 0)
    }
}
