// Copies the static site (index.html, style.css, pkg/) into `dist/`.
use std::process::Command;
use std::{env, fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    // Only run the heavy wasm-pack build when targeting wasm32.
    let target = env::var("TARGET").unwrap_or_default();
    if target == "wasm32-unknown-unknown" {
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status();

        match status {
            Ok(st) if !st.success() => println!("cargo:warning=wasm-pack build failed"),
            Ok(_) => {}
            Err(_) => println!("cargo:warning=wasm-pack not installed, skipping"),
        }
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }
    let opts = CopyOptions::new().content_only(true);
    if let Err(e) = fs::create_dir_all(out_dir).map_err(|e| e.to_string()).and_then(|_| {
        copy(static_dir, out_dir, &opts)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }) {
        println!("cargo:warning=could not copy static/ to dist/: {e}");
    }
}
