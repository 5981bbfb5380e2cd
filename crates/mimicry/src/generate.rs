//! File-level generation: extracting contracts, emitting their mocks,
//! and writing one source file per contract.
//!
//! Generation is all-or-nothing. Every requested contract is extracted
//! and emitted in memory before the first byte touches disk, so a
//! failing contract never leaves a partially-written output directory
//! behind. Output order and content are deterministic; regenerating
//! from unchanged declarations rewrites identical files.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::emit;
use crate::error::ExtractError;
use crate::extract::{self, SourceSet};

/// One file written by a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// The contract the file was generated for.
    pub contract: String,
    /// File name within the output directory.
    pub relative_path: String,
    /// Full path of the written file.
    pub absolute_path: PathBuf,
    /// Size of the written content.
    pub bytes: usize,
}

/// Manifest of a generation run, in file-name order.
#[derive(Debug, Clone, Default)]
pub struct GeneratedFiles {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedFiles {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// Generate mock files for `contracts` into `out_dir`, creating the
/// directory if needed. An empty request means every trait in the
/// set. Each requested contract brings its embedded closure along, so
/// every embedded contract also gets its standalone mock.
pub fn generate_mocks(
    set: &SourceSet,
    contracts: &[String],
    out_dir: &Path,
) -> Result<GeneratedFiles, ExtractError> {
    let mut queue = if contracts.is_empty() {
        set.trait_names()
    } else {
        contracts.to_vec()
    };

    let mut seen = BTreeSet::new();
    let mut units: BTreeMap<String, (String, String)> = BTreeMap::new();
    while let Some(name) = queue.pop() {
        let contract = extract::extract_contract(set, &name)?;
        if !seen.insert(contract.name.clone()) {
            continue;
        }
        for emb in extract::embedded_closure(&contract)? {
            if !seen.contains(&emb.name) {
                queue.push(emb.name);
            }
        }
        let code = emit::emit_mock(&contract)?;
        tracing::debug!(
            contract = %contract.name,
            bytes = code.len(),
            "emitted mock unit"
        );
        units.insert(emit::mock_file_name(&contract), (contract.name, code));
    }

    fs::create_dir_all(out_dir)?;
    let mut manifest = GeneratedFiles::default();
    for (file_name, (contract, code)) in units {
        let path = out_dir.join(&file_name);
        fs::write(&path, &code)?;
        tracing::debug!(path = %path.display(), "wrote mock file");
        manifest.files.push(GeneratedFile {
            contract,
            relative_path: file_name,
            absolute_path: path,
            bytes: code.len(),
        });
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
    pub trait Pinger { fn ping(&self, host: &str) -> bool; }
    pub trait KeyValueStore {
        fn get(&self, key: &str) -> Option<String>;
        fn put(&mut self, key: &str, value: String) -> bool;
    }
    "#;

    #[test]
    fn generates_one_file_per_contract() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(SOURCE).unwrap();
        let manifest = generate_mocks(&set, &[], dir.path()).unwrap();

        let names: Vec<&str> = manifest
            .files
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect();
        assert_eq!(names, ["key_value_store_mock.rs", "pinger_mock.rs"]);
        for file in &manifest.files {
            let written = fs::read_to_string(&file.absolute_path).unwrap();
            assert_eq!(written.len(), file.bytes);
            assert!(written.contains("Mock"));
        }
        assert_eq!(
            manifest.total_bytes(),
            manifest.files.iter().map(|f| f.bytes).sum::<usize>()
        );
    }

    #[test]
    fn selecting_a_plain_contract_generates_only_it() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(SOURCE).unwrap();
        let manifest = generate_mocks(&set, &["Pinger".to_string()], dir.path()).unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.files[0].contract, "Pinger");
        assert!(!dir.path().join("key_value_store_mock.rs").exists());
    }

    #[test]
    fn selecting_a_contract_brings_its_embedded_closure() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(
            r#"
            trait Closer { fn close(&mut self); }
            trait KeyValueStore { fn get(&self, key: &str) -> Option<String>; }
            trait Store: KeyValueStore + Closer { fn flush(&mut self) -> usize; }
            trait Unrelated { fn nope(&self); }
            "#,
        )
        .unwrap();
        let manifest = generate_mocks(&set, &["Store".to_string()], dir.path()).unwrap();

        // Every embedded contract gets its own standalone mock.
        let names: Vec<&str> = manifest
            .files
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect();
        assert_eq!(
            names,
            ["closer_mock.rs", "key_value_store_mock.rs", "store_mock.rs"]
        );
        assert!(dir.path().join("closer_mock.rs").exists());
        assert!(!dir.path().join("unrelated_mock.rs").exists());
    }

    #[test]
    fn closure_expansion_writes_each_contract_once() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(
            r#"
            trait Base { fn b(&self); }
            trait Left: Base { fn l(&self); }
            trait Right: Base { fn r(&self); }
            "#,
        )
        .unwrap();
        let manifest = generate_mocks(
            &set,
            &["Left".to_string(), "Right".to_string()],
            dir.path(),
        )
        .unwrap();
        let names: Vec<&str> = manifest
            .files
            .iter()
            .map(|f| f.contract.as_str())
            .collect();
        assert_eq!(names, ["Base", "Left", "Right"]);
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(SOURCE).unwrap();
        generate_mocks(&set, &[], dir.path()).unwrap();
        let first = fs::read_to_string(dir.path().join("pinger_mock.rs")).unwrap();
        generate_mocks(&set, &[], dir.path()).unwrap();
        let second = fs::read_to_string(dir.path().join("pinger_mock.rs")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_contract_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let set = SourceSet::from_source(
            "trait Good { fn go(&self); } trait Bad { async fn no(&self); }",
        )
        .unwrap();
        let err = generate_mocks(&set, &[], &out).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedConstruct { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn unknown_contract_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let set = SourceSet::from_source(SOURCE).unwrap();
        let err = generate_mocks(&set, &["Missing".to_string()], dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::UnresolvedReference { .. }));
    }
}
