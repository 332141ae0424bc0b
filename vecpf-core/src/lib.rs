//! vecpf-core - Vector printf dispatch engine
//!
//! This crate provides:
//! - The modifier registry (`v`, `vl`/`lv`, `vh`/`hv`, `vv`, `vz`/`zv`)
//! - The conversion rule tables for integer and floating-point conversions
//! - Per-element scalar format synthesis and element extraction
//! - The iteration engine that joins formatted elements into a bounded sink
//!
//! Scalar digit generation is delegated to a [`ScalarFormatter`]; the default
//! [`LibcFormatter`] forwards every element to the C library's `snprintf`.

use thiserror::Error;

pub mod config;
pub mod directive;
pub mod engine;
pub mod extract;
pub mod host;
pub mod modifier;
pub mod request;
pub mod rules;
pub mod scalar;
pub mod sink;
pub mod synth;
pub mod vector;

pub use config::{ConfigError, EngineConfig, INT128_SUPPORTED};
pub use directive::{Directive, DirectiveError};
pub use engine::Engine;
pub use extract::{extract, Scalar};
pub use host::{ArgType, BitHost, PrintfHost};
pub use modifier::{ModifierBits, ModifierEntry, ModifierKind, ModifierRegistry};
pub use request::{Flags, FormatRequest};
pub use rules::{ConversionRule, ElementKind, Family};
pub use scalar::{LibcFormatter, ScalarFormatter};
pub use sink::{Sink, SizedWriter};
pub use synth::{synthesize, ScalarFormat, SCALAR_FORMAT_MAX};
pub use vector::{ByteOrder, VectorValue, VECTOR_WIDTH_BYTES};

/// Errors reported by a single formatting call.
///
/// None of these affect the engine's tables; a failed call can be followed
/// by any other call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The conversion has no vector rule for the modifiers in the request.
    /// The host should fall back to its own handling of the directive.
    #[error("no vector rule for conversion '{conversion}' with modifier bits {modifier_bits:#06x}")]
    Declined {
        conversion: char,
        modifier_bits: ModifierBits,
    },

    #[error("output overflow: {needed} bytes needed, sink capacity is {capacity}")]
    OutputOverflow { needed: usize, capacity: usize },

    #[error("scalar formatter failed: {0}")]
    Scalar(String),
}
