//! Build script: embeds the git hash and pre-checks GPU toolkits.
//!
//! When a GPU feature is enabled, verify the toolkit is installed before
//! whisper-rs-sys tries to compile against it.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        require_tool("nvcc", "--version", "CUDA toolkit", "https://developer.nvidia.com/cuda-downloads");
    }
    if cfg!(feature = "vulkan") {
        require_tool("vulkaninfo", "--summary", "Vulkan SDK", "https://vulkan.lunarg.com/");
    }
    if cfg!(feature = "hipblas") {
        require_tool("rocminfo", "--version", "ROCm", "https://rocm.docs.amd.com/");
    }
    if cfg!(feature = "openblas") {
        check_openblas();
    }
}

/// Panic with install guidance when a required toolchain binary is missing.
fn require_tool(binary: &str, probe_arg: &str, toolkit: &str, install_url: &str) {
    if Command::new(binary).arg(probe_arg).output().is_err() {
        panic!(
            "\n`{binary}` not found: {toolkit} is not installed.\n\
             Install: {install_url}\n\
             Or build without GPU support: cargo build --release\n",
        );
    }
    println!("cargo::warning={toolkit} detected");
}

fn check_openblas() {
    let pkg_config_ok = Command::new("pkg-config")
        .args(["--exists", "openblas"])
        .status()
        .is_ok_and(|s| s.success());

    if !pkg_config_ok {
        let lib_exists = std::path::Path::new("/usr/lib/x86_64-linux-gnu/libopenblas.so").exists()
            || std::path::Path::new("/usr/lib/libopenblas.so").exists()
            || std::path::Path::new("/usr/lib64/libopenblas.so").exists();

        if !lib_exists {
            panic!(
                "\nOpenBLAS not found.\n\
                 Install: sudo apt install libopenblas-dev\n\
                 Or build without OpenBLAS: cargo build --release\n",
            );
        }
    }
    println!("cargo::warning=OpenBLAS detected");
}
