//! Compiles the chat gRPC contract.
//!
//! Generated code lands in `$OUT_DIR/chat.v1.rs` and is pulled in by
//! `src/presentation/grpc/mod.rs`. The encoded descriptor set is written
//! next to it for the reflection service.
//!
//! Requires `protoc` on the build host.

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?).join("proto");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("chat_descriptor.bin"))
        .compile_protos(&[proto_root.join("chat/v1/chat.proto")], &[&proto_root])?;

    println!("cargo:rerun-if-changed={}", proto_root.display());
    Ok(())
}
