use std::path::{Path, PathBuf};

use mimicry::extract::SourceSet;
use mimicry::generate::generate_mocks;

pub fn run(
    sources: &[PathBuf],
    contracts: &[String],
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = SourceSet::load(sources)?;
    let result = generate_mocks(&set, contracts, output_dir)?;

    println!(
        "Generated {} file(s) in {}:",
        result.files.len(),
        output_dir.display()
    );
    for f in &result.files {
        println!("  {} ({}, {} bytes)", f.relative_path, f.contract, f.bytes);
    }

    Ok(())
}
