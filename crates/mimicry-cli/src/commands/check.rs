use std::path::PathBuf;

use mimicry::check::check_source;
use mimicry::error::Severity;
use mimicry::extract::SourceSet;

pub fn run(sources: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let set = SourceSet::load(sources)?;
    let violations = check_source(&set);

    let errors = violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .count();
    let warnings = violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .count();

    for v in &violations {
        println!("{v}");
    }

    println!("\n{errors} error(s), {warnings} warning(s)");

    if errors == 0 {
        println!("All contracts are mockable.");
        Ok(())
    } else {
        Err(format!("{errors} contract(s) cannot be mocked").into())
    }
}
