//! Build script for cxxview-core
//!
//! Checks the toolchain before compilation. The string printer walks invalid
//! UTF-8 with `<[u8]>::utf8_chunks`, which was stabilized in Rust 1.79.

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    let Ok(rustc_version) = rustc_version::version() else {
        // Some build environments hide rustc; just warn
        println!("cargo:warning=could not verify Rust version");
        return;
    };

    let min_rust_version = rustc_version::Version::new(1, 79, 0);
    if rustc_version < min_rust_version {
        panic!("cxxview-core requires Rust {min_rust_version} or newer, found {rustc_version}");
    }
}
