use std::path::PathBuf;

use mimicry::extract::{self, SourceSet};

pub fn run(sources: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let set = SourceSet::load(sources)?;
    let names = set.trait_names();

    if names.is_empty() {
        println!("No trait declarations found.");
        return Ok(());
    }

    for name in &names {
        match extract::extract_contract(&set, name) {
            Ok(contract) => {
                let flat = extract::flatten(&contract)?;
                let embedded: Vec<String> = contract
                    .embedded
                    .iter()
                    .map(|e| e.descriptor.name.clone())
                    .collect();
                if embedded.is_empty() {
                    println!("{name} ({} methods)", flat.len());
                } else {
                    println!("{name} ({} methods, embeds {})", flat.len(), embedded.join(", "));
                }
            }
            Err(e) => println!("{name} (not mockable: {e})"),
        }
    }

    Ok(())
}
