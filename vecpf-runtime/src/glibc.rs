// vecpf-runtime: glibc printf plugin bindings
// Installs the vector engine behind register_printf_specifier so that
// printf("%vlu", v) works in the whole process.

use crate::info::PrintfInfo;
use crate::RuntimeError;
use libc::{c_int, c_void, wchar_t, FILE};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::OnceLock;
use vecpf_core::{
    ArgType, Engine, EngineConfig, Family, FormatError, ModifierBits, PrintfHost, VectorValue,
    VECTOR_WIDTH_BYTES,
};

// ============================================================================
// glibc printf extension ABI
// ============================================================================

type PrintfFunction =
    unsafe extern "C" fn(stream: *mut FILE, info: *const PrintfInfo, args: *const *const c_void) -> c_int;
type ArginfoFunction = unsafe extern "C" fn(
    info: *const PrintfInfo,
    n: usize,
    argtypes: *mut c_int,
    size: *mut c_int,
) -> c_int;
type VaArgFunction = unsafe extern "C" fn(mem: *mut c_void, ap: *mut c_void);

extern "C" {
    fn register_printf_specifier(
        spec: c_int,
        func: PrintfFunction,
        arginfo: ArginfoFunction,
    ) -> c_int;
    fn register_printf_modifier(modifier: *const wchar_t) -> c_int;
    fn register_printf_type(fct: VaArgFunction) -> c_int;
}

// c/vecpf_va.c
extern "C" {
    fn vecpf_va_vector(mem: *mut c_void, ap: *mut c_void);
    fn vecpf_snprintf_vector(
        buf: *mut libc::c_char,
        len: usize,
        fmt: *const libc::c_char,
        bytes: *const u8,
    ) -> c_int;
}

/// glibc's "handle this directive yourself" status
const DECLINED: c_int = -2;

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Registration surface backed by the C library
#[derive(Debug, Default)]
pub struct GlibcHost;

impl GlibcHost {
    pub fn new() -> Self {
        Self
    }
}

impl PrintfHost for GlibcHost {
    fn register_vector_type(&mut self) -> Option<ArgType> {
        let handle = unsafe { register_printf_type(vecpf_va_vector) };
        (handle >= 0).then_some(handle)
    }

    fn register_modifier(&mut self, token: &str) -> Option<ModifierBits> {
        let wide: Vec<wchar_t> = token
            .chars()
            .map(|c| c as wchar_t)
            .chain(std::iter::once(0))
            .collect();
        let bits = unsafe { register_printf_modifier(wide.as_ptr()) };
        ModifierBits::try_from(bits).ok().filter(|&bits| bits != 0)
    }

    fn register_specifier(&mut self, conversion: char, family: Family) -> bool {
        debug!("registering %{} for {:?} vectors", conversion, family);
        let status =
            unsafe { register_printf_specifier(conversion as c_int, vecpf_dispatch, vecpf_arginfo) };
        status == 0
    }
}

// ============================================================================
// Installation
// ============================================================================

/// Install the engine into the C library's printf family.
///
/// Registration happens on the first call only; later calls return the
/// engine installed by the first one, whatever `config` they pass.
pub fn install(config: &EngineConfig) -> Result<&'static Engine, RuntimeError> {
    let engine = ENGINE.get_or_init(|| {
        info!("installing vector printf handlers");
        Engine::initialize(config, &mut GlibcHost::new())
    });

    if engine.vector_type().is_none() {
        return Err(RuntimeError::VectorTypeRefused);
    }
    if engine.registry().entries().iter().all(|entry| entry.bits.is_none()) {
        return Err(RuntimeError::NoModifiers);
    }
    Ok(engine)
}

/// Install with the `vecpf.json` found from `dir` upward, or the defaults
pub fn install_from_dir<P: AsRef<Path>>(dir: P) -> Result<&'static Engine, RuntimeError> {
    let config = EngineConfig::from_dir(dir)?;
    install(&config)
}

/// The installed engine, if any
pub fn installed() -> Option<&'static Engine> {
    ENGINE.get()
}

/// C entry point: install from the working directory's configuration.
/// Returns 0 on success, -1 on failure.
#[no_mangle]
pub extern "C" fn vecpf_install() -> c_int {
    match install_from_dir(".") {
        Ok(_) => 0,
        Err(e) => {
            warn!("vecpf_install failed: {}", e);
            -1
        }
    }
}

/// Format one vector through the C library's `snprintf`.
///
/// `directive` may contain other text and directives as long as the vector
/// is its only argument. Returns what `snprintf` returned.
pub fn snprintf_vector(
    buf: &mut [u8],
    directive: &std::ffi::CStr,
    vector: &VectorValue,
) -> Result<usize, RuntimeError> {
    let written = unsafe {
        vecpf_snprintf_vector(
            buf.as_mut_ptr().cast(),
            buf.len(),
            directive.as_ptr(),
            vector.as_bytes().as_ptr(),
        )
    };
    usize::try_from(written).map_err(|_| RuntimeError::Printf(written))
}

// ============================================================================
// Callbacks
// ============================================================================

/// printf_arginfo_size_function: claim one vector argument when the
/// directive carries one of our modifiers.
unsafe extern "C" fn vecpf_arginfo(
    info: *const PrintfInfo,
    n: usize,
    argtypes: *mut c_int,
    size: *mut c_int,
) -> c_int {
    let (Some(engine), Some(info)) = (ENGINE.get(), info.as_ref()) else {
        return -1;
    };
    let Some(vector_type) = engine.vector_type() else {
        return -1;
    };

    if n > 0 && !argtypes.is_null() && engine.registry().claims(info.user) {
        *argtypes = vector_type;
        if !size.is_null() {
            *size = VECTOR_WIDTH_BYTES as c_int;
        }
        return 1;
    }
    -1
}

/// printf_function: render the vector and write it to `stream` in one go.
/// Returns the number of bytes written, -2 when declined and -1 on error.
unsafe extern "C" fn vecpf_dispatch(
    stream: *mut FILE,
    info: *const PrintfInfo,
    args: *const *const c_void,
) -> c_int {
    let (Some(engine), Some(info)) = (ENGINE.get(), info.as_ref()) else {
        return DECLINED;
    };
    let Some(request) = info.to_request() else {
        return DECLINED;
    };
    if engine.resolve(&request).is_err() || args.is_null() {
        return DECLINED;
    }

    // args[0] points at glibc's argument slot, which holds a pointer to the
    // memory vecpf_va_vector copied the vector into
    let slot = (*args).cast::<*const u8>();
    if slot.is_null() || (*slot).is_null() {
        return -1;
    }
    let bytes = std::ptr::read_unaligned((*slot).cast::<[u8; VECTOR_WIDTH_BYTES]>());
    let vector = VectorValue::from_bytes(bytes);

    match engine.format_to_vec(&request, &vector) {
        Ok(rendered) => {
            let written = libc::fwrite(rendered.as_ptr().cast(), 1, rendered.len(), stream);
            if written != rendered.len() {
                return -1;
            }
            c_int::try_from(written).unwrap_or(c_int::MAX)
        }
        Err(FormatError::Declined { .. }) => DECLINED,
        Err(e) => {
            warn!("vector directive %{} failed: {}", request.conversion, e);
            -1
        }
    }
}
