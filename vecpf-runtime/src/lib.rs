//! vecpf-runtime - Process-wide installation of the vector printf engine
//!
//! This crate provides:
//! - `PrintfInfo`, the mirror of glibc's `struct printf_info`
//! - With feature `glibc-printf`: the `register_printf_*` host, the dispatch
//!   and arginfo callbacks, and `install()` / `vecpf_install()`

use thiserror::Error;
use vecpf_core::ConfigError;

pub mod info;

#[cfg(feature = "glibc-printf")]
pub mod glibc;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("C library refused the vector argument type")]
    VectorTypeRefused,

    #[error("C library refused every vector modifier")]
    NoModifiers,

    #[error("snprintf failed with {0}")]
    Printf(i32),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
}

pub use info::PrintfInfo;

#[cfg(feature = "glibc-printf")]
pub use glibc::{install, install_from_dir, installed, snprintf_vector, vecpf_install, GlibcHost};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RuntimeError::VectorTypeRefused.to_string(),
            "C library refused the vector argument type"
        );
        assert_eq!(RuntimeError::Printf(-1).to_string(), "snprintf failed with -1");
    }
}
