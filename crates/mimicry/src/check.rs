//! Contract diagnostics.
//!
//! A lightweight lint pass over extracted contracts, reporting
//! conditions that generate valid but easily-misused mocks. Each rule
//! has a stable code so output can be filtered or asserted on.
//!
//! Rules:
//! - `CONTRACT-000` (error): the contract cannot be extracted or
//!   flattened at all.
//! - `CONTRACT-001` (warning): the contract has no methods; its mock
//!   can only ever report misses.
//! - `CONTRACT-002` (warning): an outer method shadows an embedded
//!   one; calls through the embedded trait path always miss.
//! - `CONTRACT-003` (info): a parameter has no name; the generated
//!   proxy uses a positional placeholder.

use crate::error::{Severity, Violation};
use crate::extract::{self, SourceSet};
use crate::model::ContractDescriptor;

/// Check every trait in the source set, in name order.
pub fn check_source(set: &SourceSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    for name in set.trait_names() {
        match extract::extract_contract(set, &name) {
            Ok(contract) => violations.extend(check_contract(&contract)),
            Err(e) => violations.push(Violation {
                severity: Severity::Error,
                rule: "CONTRACT-000".to_string(),
                message: e.to_string(),
                location: Some(name.clone()),
            }),
        }
    }
    violations
}

/// Check one extracted contract against every rule.
pub fn check_contract(contract: &ContractDescriptor) -> Vec<Violation> {
    let mut violations = Vec::new();

    let flattened = match extract::flatten(contract) {
        Ok(flattened) => flattened,
        Err(e) => {
            return vec![Violation {
                severity: Severity::Error,
                rule: "CONTRACT-000".to_string(),
                message: e.to_string(),
                location: Some(contract.name.clone()),
            }];
        }
    };

    if flattened.is_empty() {
        violations.push(Violation {
            severity: Severity::Warning,
            rule: "CONTRACT-001".to_string(),
            message: "contract declares no methods".to_string(),
            location: Some(contract.name.clone()),
        });
    }

    let closure = match extract::embedded_closure(contract) {
        Ok(closure) => closure,
        Err(e) => {
            return vec![Violation {
                severity: Severity::Error,
                rule: "CONTRACT-000".to_string(),
                message: e.to_string(),
                location: Some(contract.name.clone()),
            }];
        }
    };
    for emb in &closure {
        for method in &emb.methods {
            if contract.declares(&method.name) {
                violations.push(Violation {
                    severity: Severity::Warning,
                    rule: "CONTRACT-002".to_string(),
                    message: format!(
                        "method `{}` shadows the declaration inherited from `{}`; \
                         calls through `{}` will always miss and can consume a \
                         pending `{}` sequence stub",
                        method.name, emb.name, emb.name, method.name
                    ),
                    location: Some(format!("{}::{}", contract.name, method.name)),
                });
            }
        }
    }

    for method in &flattened {
        for (i, param) in method.params.iter().enumerate() {
            if param.name.is_none() {
                violations.push(Violation {
                    severity: Severity::Info,
                    rule: "CONTRACT-003".to_string(),
                    message: format!("parameter {i} has no name"),
                    location: Some(format!("{}::{}", contract.name, method.name)),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> Vec<Violation> {
        let set = SourceSet::from_source(source).unwrap();
        check_source(&set)
    }

    #[test]
    fn clean_contract_produces_no_violations() {
        let violations = check("trait Pinger { fn ping(&self, host: &str) -> bool; }");
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn unextractable_contract_reports_error() {
        let violations = check("trait Fetcher { async fn fetch(&self); }");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "CONTRACT-000");
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn empty_contract_warns() {
        let violations = check("trait Marker {}");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "CONTRACT-001");
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn shadowed_method_warns_on_the_outer_contract() {
        let violations = check(
            r#"
            trait Closer { fn close(&mut self); }
            trait Store: Closer { fn close(&mut self) -> bool; }
            "#,
        );
        let shadow: Vec<_> = violations.iter().filter(|v| v.rule == "CONTRACT-002").collect();
        assert_eq!(shadow.len(), 1);
        assert_eq!(shadow[0].location.as_deref(), Some("Store::close"));
        assert!(shadow[0].message.contains("Closer"));
        assert!(shadow[0].message.contains("consume"));
    }

    #[test]
    fn unnamed_parameter_is_informational() {
        let violations = check("trait Sink { fn push(&mut self, _: u8); }");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "CONTRACT-003");
        assert_eq!(violations[0].severity, Severity::Info);
        assert_eq!(violations[0].location.as_deref(), Some("Sink::push"));
    }
}
