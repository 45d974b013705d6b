//! Regenerates `include/httpssni.h` from the `extern "C"` surface.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let header = crate_dir.join("include").join("httpssni.h");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HTTPSSNI_H")
        .with_documentation(true)
        .generate();

    match bindings {
        Ok(bindings) => {
            if let Err(err) = std::fs::create_dir_all(crate_dir.join("include")) {
                println!("cargo:warning=cannot create include dir: {err}");
                return;
            }
            bindings.write_to_file(header);
        }
        Err(err) => println!("cargo:warning=cbindgen failed, header not regenerated: {err}"),
    }
}
