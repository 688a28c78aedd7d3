//! Build script for sjtwo-firmware
//!
//! - Puts memory.x and device.x on the linker search path
//! - Adds the cortex-m-rt and defmt linker scripts

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    setup_linker();
}

/// Copy linker fragments into OUT_DIR and pass the linker scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    for (name, contents) in [
        ("memory.x", include_bytes!("memory.x").as_slice()),
        ("device.x", include_bytes!("device.x").as_slice()),
    ] {
        let mut f = File::create(out_dir.join(name)).expect("create linker fragment");
        f.write_all(contents).expect("write linker fragment");
    }

    // Tell rustc where to find memory.x and device.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=device.x");
    println!("cargo:rerun-if-changed=build.rs");
}
