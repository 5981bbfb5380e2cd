use std::path::PathBuf;

use mimicry::extract::{self, SourceSet};
use mimicry::model;

pub fn run(sources: &[PathBuf], contracts: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let set = SourceSet::load(sources)?;

    let extracted = if contracts.is_empty() {
        extract::extract_all(&set)?
    } else {
        contracts
            .iter()
            .map(|name| extract::extract_contract(&set, name))
            .collect::<Result<Vec<_>, _>>()?
    };

    println!("{}", model::to_json(&extracted)?);
    Ok(())
}
