// Scalar formatter seam
//
// Digit generation for one element is not the engine's job. The engine hands
// a synthesized `%...*.*<suffix>` format, the runtime width and precision, and
// one promoted element to a `ScalarFormatter`.

use crate::extract::Scalar;
use crate::synth::ScalarFormat;
use crate::FormatError;
use libc::{c_char, c_double, c_int, c_uint, c_ulong};
use std::ffi::CStr;

/// Renders one scalar with a C-style format.
pub trait ScalarFormatter {
    /// Append the rendering of `value` to `out` and return the number of
    /// bytes appended.
    fn format_scalar(
        &self,
        format: &ScalarFormat,
        width: i32,
        precision: i32,
        value: Scalar,
        out: &mut Vec<u8>,
    ) -> Result<usize, FormatError>;
}

/// Most elements fit; longer renderings (huge widths, `%f` of 1e38) retry
/// with an exactly sized heap buffer.
const STACK_BUFFER: usize = 128;

/// Formats through the C library's `snprintf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibcFormatter;

impl LibcFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format one value with a complete directive that carries no `*`
    /// placeholders (e.g. `%-12.5hhd`). This is the plain scalar path the
    /// vector path is checked against.
    pub fn format_directive(
        &self,
        directive: &CStr,
        value: Scalar,
        out: &mut Vec<u8>,
    ) -> Result<usize, FormatError> {
        render(out, |buf, len| unsafe { snprintf_plain(buf, len, directive, value) })
    }
}

impl ScalarFormatter for LibcFormatter {
    fn format_scalar(
        &self,
        format: &ScalarFormat,
        width: i32,
        precision: i32,
        value: Scalar,
        out: &mut Vec<u8>,
    ) -> Result<usize, FormatError> {
        let directive = format
            .as_c_str()
            .ok_or_else(|| FormatError::Scalar(format!("unterminated format {:?}", format)))?;

        render(out, |buf, len| unsafe {
            snprintf_starred(buf, len, directive, width, precision, value)
        })
    }
}

/// Run `call` into a stack buffer, retrying on the heap when the rendering
/// is longer, and append the result to `out`.
fn render<F>(out: &mut Vec<u8>, call: F) -> Result<usize, FormatError>
where
    F: Fn(*mut c_char, usize) -> c_int,
{
    let mut stack = [0u8; STACK_BUFFER];
    let written = call(stack.as_mut_ptr().cast(), stack.len());
    let written =
        usize::try_from(written).map_err(|_| FormatError::Scalar("snprintf failed".to_string()))?;

    if let Some(rendered) = stack.get(..written).filter(|_| written < STACK_BUFFER) {
        out.extend_from_slice(rendered);
        return Ok(written);
    }

    let mut heap = vec![0u8; written + 1];
    let rewritten = call(heap.as_mut_ptr().cast(), heap.len());
    if usize::try_from(rewritten).ok() != Some(written) {
        return Err(FormatError::Scalar(
            "snprintf output changed between calls".to_string(),
        ));
    }
    heap.truncate(written);
    out.extend_from_slice(&heap);
    Ok(written)
}

/// # Safety
/// `buf` must be valid for `len` bytes and `format` must consume `*`, `.*`
/// and one argument of the promoted type of `value`.
unsafe fn snprintf_starred(
    buf: *mut c_char,
    len: usize,
    format: &CStr,
    width: c_int,
    precision: c_int,
    value: Scalar,
) -> c_int {
    let format = format.as_ptr();
    match value {
        Scalar::Int(v) => libc::snprintf(buf, len, format, width, precision, v as c_int),
        Scalar::UInt(v) => libc::snprintf(buf, len, format, width, precision, v as c_uint),
        Scalar::ULong(v) => libc::snprintf(buf, len, format, width, precision, v as c_ulong),
        Scalar::Double(v) => libc::snprintf(buf, len, format, width, precision, v as c_double),
    }
}

/// # Safety
/// As [`snprintf_starred`], for a directive without `*` placeholders.
unsafe fn snprintf_plain(buf: *mut c_char, len: usize, format: &CStr, value: Scalar) -> c_int {
    let format = format.as_ptr();
    match value {
        Scalar::Int(v) => libc::snprintf(buf, len, format, v as c_int),
        Scalar::UInt(v) => libc::snprintf(buf, len, format, v as c_uint),
        Scalar::ULong(v) => libc::snprintf(buf, len, format, v as c_ulong),
        Scalar::Double(v) => libc::snprintf(buf, len, format, v as c_double),
    }
}
