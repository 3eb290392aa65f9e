fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the proto file for the scoring client. When protoc is not
    // available (e.g. offline builds), fall back to the checked-in generated
    // code, which matches tonic-build's output for proto/scoring.proto.
    match tonic_build::compile_protos("../../proto/scoring.proto") {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("protoc") => {
            let out_dir = std::env::var("OUT_DIR")?;
            std::fs::copy(
                "src/generated/scoring.rs",
                std::path::Path::new(&out_dir).join("scoring.rs"),
            )?;
            println!("cargo:rerun-if-changed=src/generated/scoring.rs");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
