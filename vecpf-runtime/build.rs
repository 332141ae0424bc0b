// Build script for vecpf-runtime
// Compiles the C va_arg helper used by the glibc printf shim

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "glibc-printf")]
    build_va_helper()?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

#[cfg(feature = "glibc-printf")]
fn build_va_helper() -> Result<(), Box<dyn std::error::Error>> {
    use std::env;
    use std::path::PathBuf;

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map_err(|e| format!("Failed to get CARGO_MANIFEST_DIR: {}", e))?;
    let c_dir = PathBuf::from(&manifest_dir).join("c");

    // register_printf_specifier and friends are GNU extensions
    let target_env = env::var("CARGO_CFG_TARGET_ENV")
        .map_err(|e| format!("Failed to get CARGO_CFG_TARGET_ENV: {}", e))?;
    if target_env != "gnu" {
        return Err(format!(
            "feature glibc-printf needs a glibc target, found target_env '{}'",
            target_env
        )
        .into());
    }

    cc::Build::new()
        .file(c_dir.join("vecpf_va.c"))
        .warnings(true)
        .extra_warnings(true)
        .flag("-std=gnu11")
        .define("_GNU_SOURCE", None)
        .compile("vecpf_va");

    println!("cargo:rerun-if-changed=c/vecpf_va.c");
    Ok(())
}
