use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: syn::Error,
    },

    #[error("contract `{contract}` references `{reference}`, which cannot be resolved in the provided sources")]
    UnresolvedReference { contract: String, reference: String },

    #[error("contract `{contract}`: method `{method}` is declared with incompatible signatures")]
    SignatureConflict { contract: String, method: String },

    #[error("contract `{contract}`, {location}: unsupported construct: {construct}")]
    UnsupportedConstruct {
        contract: String,
        location: String,
        construct: String,
    },
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(f, "[{prefix}] {}: {}", self.rule, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {location})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_warning() {
        let v = Violation {
            severity: Severity::Warning,
            rule: "CONTRACT-002".to_string(),
            message: "shadowed method".to_string(),
            location: Some("Store::close".to_string()),
        };
        let s = v.to_string();
        assert!(s.contains("[WARN]"));
        assert!(s.contains("CONTRACT-002"));
        assert!(s.contains("shadowed method"));
    }

    #[test]
    fn violation_display_info() {
        let v = Violation {
            severity: Severity::Info,
            rule: "CONTRACT-003".to_string(),
            message: "unnamed parameter".to_string(),
            location: None,
        };
        assert!(v.to_string().contains("[INFO]"));
    }

    #[test]
    fn unresolved_reference_names_both_sides() {
        let err = ExtractError::UnresolvedReference {
            contract: "Store".to_string(),
            reference: "Closer".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("Store"));
        assert!(s.contains("Closer"));
    }

    #[test]
    fn signature_conflict_names_method() {
        let err = ExtractError::SignatureConflict {
            contract: "Store".to_string(),
            method: "close".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("Store"));
        assert!(s.contains("close"));
    }

    #[test]
    fn unsupported_construct_names_location() {
        let err = ExtractError::UnsupportedConstruct {
            contract: "Fetcher".to_string(),
            location: "method `fetch`".to_string(),
            construct: "async method".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("Fetcher"));
        assert!(s.contains("fetch"));
        assert!(s.contains("async method"));
    }
}
