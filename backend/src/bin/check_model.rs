//! Diagnostic check for the classifier artifact.
//!
//! Run with `cargo run --bin check_model`. Reports whether the artifact is
//! where the server expects it and suggests next steps when it is not.
//! Exits 0 when the artifact is present, 1 when it is missing.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Same resolution as the server: the crate dir in dev, the image's
    // install dir otherwise.
    let install_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        PathBuf::from(manifest_dir)
    } else {
        PathBuf::from("/usr/src/app")
    };
    let model_path = install_dir.join("models/final_model.pt");

    println!("{}", "=".repeat(60));
    println!("Model Artifact Diagnostic Check");
    println!("{}", "=".repeat(60));
    println!("Application directory: {}", install_dir.display());
    println!("Expected model path: {}", model_path.display());
    println!("Model file exists: {}", model_path.exists());
    println!();

    let code = if model_path.exists() {
        report_present(&model_path);
        ExitCode::SUCCESS
    } else {
        report_missing(&install_dir, &model_path);
        ExitCode::FAILURE
    };

    println!("{}", "=".repeat(60));
    code
}

fn report_present(model_path: &Path) {
    match std::fs::metadata(model_path) {
        Ok(meta) => {
            println!("Model file found.");
            println!("  File size: {:.2} MB", meta.len() as f64 / (1024.0 * 1024.0));
        }
        Err(e) => println!("Model file found but unreadable: {e}"),
    }
    println!();
    println!("If predictions still fail, check the server logs for");
    println!("TorchScript loading errors.");
}

fn report_missing(install_dir: &Path, model_path: &Path) {
    println!("Model file NOT found.");
    println!();
    println!("The artifact '{}' is missing.", model_path.display());
    println!();
    println!("Next steps:");
    println!("1. Locate your exported TorchScript model (final_model.pt)");
    println!("2. Copy it to: {}", model_path.display());
    println!("3. If deploying, make sure the artifact ships with the image");
    println!();

    println!("Checking for similar files...");
    let models_dir = model_path.parent().unwrap_or(install_dir);
    let mut similar = Vec::new();
    for dir in [models_dir, install_dir] {
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(".pt") || name.ends_with(".h5") || name.ends_with(".hdf5") {
                    similar.push(name);
                }
            }
        }
    }
    if similar.is_empty() {
        println!("No .pt or .h5 files found near the expected location.");
    } else {
        println!("Found similar files: {}", similar.join(", "));
        println!("You might want to rename one of these to final_model.pt");
    }
}
