// build.rs
//! Build script for compiling Protocol Buffer definitions

use std::io::Result;

fn main() -> Result<()> {
    std::fs::create_dir_all("src/generated")?;

    // Supply a protoc binary when one is not installed on the system so the
    // build is self-contained. Does not change the generated output.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    // Compile protobuf files
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/generated")
        .file_descriptor_set_path("src/generated/fabric_descriptor.bin")
        .compile(&["proto/fabric.proto"], &["proto"])?;

    // Recompile if proto files change
    println!("cargo:rerun-if-changed=proto/fabric.proto");

    Ok(())
}
