//! The contract model extractor.
//!
//! A [`SourceSet`] holds the parsed closure of Rust sources a
//! contract may reference; [`extract_contract`] turns one trait
//! declaration inside it into a flat [`ContractDescriptor`],
//! resolving supertrait embedding transitively and preserving
//! type-parameter lists verbatim.

pub mod flatten;
pub mod lower;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use flatten::{embedded_closure, flatten, EmbeddedImpl};
pub use lower::lower_type;

use crate::error::ExtractError;
use crate::model::{ContractDescriptor, EmbeddedContract, TypeParam};
use lower::{lower_method, tokens_text};

/// The parsed source closure, indexed by trait name.
#[derive(Default)]
pub struct SourceSet {
    traits: BTreeMap<String, syn::ItemTrait>,
    ambiguous: BTreeSet<String>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `.rs` file reachable from the given paths
    /// (directories are walked recursively, in sorted order).
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ExtractError> {
        let mut set = Self::new();
        for path in paths {
            set.load_path(path.as_ref())?;
        }
        Ok(set)
    }

    fn load_path(&mut self, path: &Path) -> Result<(), ExtractError> {
        if path.is_dir() {
            let mut entries: Vec<_> = std::fs::read_dir(path)?
                .collect::<Result<Vec<_>, _>>()?
                .iter()
                .map(|e| e.path())
                .collect();
            entries.sort();
            for entry in entries {
                if entry.is_dir() {
                    self.load_path(&entry)?;
                } else if entry.extension().is_some_and(|ext| ext == "rs") {
                    self.load_file(&entry)?;
                }
            }
            Ok(())
        } else {
            self.load_file(path)
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<(), ExtractError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_named(&content, &path.display().to_string())
    }

    /// Add an in-memory compilation unit to the closure.
    pub fn parse_source(&mut self, source: &str) -> Result<(), ExtractError> {
        self.parse_named(source, "<input>")
    }

    /// Build a set from a single in-memory compilation unit.
    pub fn from_source(source: &str) -> Result<Self, ExtractError> {
        let mut set = Self::new();
        set.parse_source(source)?;
        Ok(set)
    }

    fn parse_named(&mut self, source: &str, path: &str) -> Result<(), ExtractError> {
        let file = syn::parse_file(source).map_err(|source| ExtractError::Parse {
            path: path.to_string(),
            source,
        })?;
        self.index_items(&file.items);
        Ok(())
    }

    fn index_items(&mut self, items: &[syn::Item]) {
        for item in items {
            match item {
                syn::Item::Trait(t) => {
                    let name = t.ident.to_string();
                    tracing::debug!(contract = %name, "indexed trait declaration");
                    match self.traits.get(&name) {
                        Some(existing) if existing == t => {}
                        Some(_) => {
                            self.ambiguous.insert(name);
                        }
                        None => {
                            self.traits.insert(name, t.clone());
                        }
                    }
                }
                syn::Item::Mod(m) => {
                    if let Some((_, items)) = &m.content {
                        self.index_items(items);
                    }
                }
                _ => {}
            }
        }
    }

    /// Names of every indexed trait, sorted.
    pub fn trait_names(&self) -> Vec<String> {
        self.traits.keys().cloned().collect()
    }

    /// Resolve a reference (`Name`, `path::to::Name`, `Name<T>`) to
    /// its declaration. Ambiguous names — two distinct declarations
    /// sharing an identifier anywhere in the closure — do not
    /// resolve.
    fn resolve(&self, contract: &str, reference: &str) -> Result<&syn::ItemTrait, ExtractError> {
        let base = reference.split('<').next().unwrap_or(reference).trim();
        let name = base.rsplit("::").next().unwrap_or(base).trim();
        if self.ambiguous.contains(name) {
            return Err(ExtractError::UnresolvedReference {
                contract: contract.to_string(),
                reference: reference.to_string(),
            });
        }
        self.traits
            .get(name)
            .ok_or_else(|| ExtractError::UnresolvedReference {
                contract: contract.to_string(),
                reference: reference.to_string(),
            })
    }
}

/// Extract one contract (by name or qualified reference) from the
/// source closure.
pub fn extract_contract(set: &SourceSet, name: &str) -> Result<ContractDescriptor, ExtractError> {
    let mut visiting = Vec::new();
    build_descriptor(set, name, name, &mut visiting)
}

/// Extract every contract declared in the closure, sorted by name.
pub fn extract_all(set: &SourceSet) -> Result<Vec<ContractDescriptor>, ExtractError> {
    set.trait_names()
        .iter()
        .map(|name| extract_contract(set, name))
        .collect()
}

fn build_descriptor(
    set: &SourceSet,
    reference: &str,
    from: &str,
    visiting: &mut Vec<String>,
) -> Result<ContractDescriptor, ExtractError> {
    let item = set.resolve(from, reference)?;
    let name = item.ident.to_string();
    if visiting.contains(&name) {
        return Err(ExtractError::UnsupportedConstruct {
            contract: name,
            location: "supertraits".to_string(),
            construct: "cyclic contract embedding".to_string(),
        });
    }
    if item.unsafety.is_some() || item.auto_token.is_some() {
        return Err(ExtractError::UnsupportedConstruct {
            contract: name,
            location: "declaration".to_string(),
            construct: "unsafe or auto trait".to_string(),
        });
    }
    visiting.push(name.clone());
    let descriptor = build_body(set, item, &name, visiting);
    visiting.pop();
    let descriptor = descriptor?;
    // Surface flattening conflicts at extraction time, not at emit.
    flatten(&descriptor)?;
    Ok(descriptor)
}

fn build_body(
    set: &SourceSet,
    item: &syn::ItemTrait,
    name: &str,
    visiting: &mut Vec<String>,
) -> Result<ContractDescriptor, ExtractError> {
    let unsupported = |location: &str, construct: String| ExtractError::UnsupportedConstruct {
        contract: name.to_string(),
        location: location.to_string(),
        construct,
    };

    // Type parameters, constraints carried verbatim.
    let mut type_params = Vec::new();
    let mut param_names = BTreeSet::new();
    for gp in &item.generics.params {
        match gp {
            syn::GenericParam::Type(tp) => {
                let constraint = if tp.bounds.is_empty() {
                    None
                } else {
                    Some(bounds_text(&tp.bounds))
                };
                param_names.insert(tp.ident.to_string());
                type_params.push(TypeParam {
                    name: tp.ident.to_string(),
                    constraint,
                });
            }
            syn::GenericParam::Lifetime(_) => {
                return Err(unsupported("generics", "lifetime parameter".to_string()));
            }
            syn::GenericParam::Const(_) => {
                return Err(unsupported("generics", "const parameter".to_string()));
            }
        }
    }

    // Fold `where T: Bound` predicates into the matching parameter's
    // constraint; anything richer cannot be re-serialized faithfully.
    if let Some(wc) = &item.generics.where_clause {
        for pred in &wc.predicates {
            let folded = match pred {
                syn::WherePredicate::Type(pt) if pt.lifetimes.is_none() => {
                    plain_param_name(&pt.bounded_ty, &param_names).map(|pname| {
                        let text = bounds_text(&pt.bounds);
                        (pname, text)
                    })
                }
                _ => None,
            };
            let Some((pname, text)) = folded else {
                return Err(unsupported(
                    "where clause",
                    format!("predicate `{}`", tokens_text(pred)),
                ));
            };
            if let Some(tp) = type_params.iter_mut().find(|tp| tp.name == pname) {
                tp.constraint = Some(match tp.constraint.take() {
                    Some(existing) => format!("{existing} + {text}"),
                    None => text,
                });
            }
        }
    }

    // Own methods, in declaration order.
    let mut methods = Vec::new();
    for ti in &item.items {
        match ti {
            syn::TraitItem::Fn(f) => {
                let location = format!("method `{}`", f.sig.ident);
                let sig = lower_method(f, &param_names)
                    .map_err(|u| unsupported(&location, u.to_string()))?;
                methods.push(sig);
            }
            syn::TraitItem::Type(t) => {
                return Err(unsupported(
                    &format!("associated type `{}`", t.ident),
                    "associated type".to_string(),
                ));
            }
            syn::TraitItem::Const(c) => {
                return Err(unsupported(
                    &format!("associated const `{}`", c.ident),
                    "associated const".to_string(),
                ));
            }
            other => {
                return Err(unsupported("body", format!("item `{}`", tokens_text(other))));
            }
        }
    }

    // Embedded contracts (supertraits), resolved transitively.
    let mut embedded = Vec::new();
    for bound in &item.supertraits {
        match bound {
            syn::TypeParamBound::Trait(tb) => {
                if !matches!(tb.modifier, syn::TraitBoundModifier::None) {
                    continue;
                }
                let reference = tokens_text(&tb.path);
                let args = supertrait_args(tb, &param_names)
                    .map_err(|u| unsupported(&format!("supertrait `{reference}`"), u.to_string()))?;
                let descriptor = build_descriptor(set, &reference, name, visiting)?;
                embedded.push(EmbeddedContract { descriptor, args });
            }
            // Lifetime bounds carry no methods.
            syn::TypeParamBound::Lifetime(_) => {}
            other => {
                return Err(unsupported(
                    "supertraits",
                    format!("bound `{}`", tokens_text(other)),
                ));
            }
        }
    }

    Ok(ContractDescriptor {
        name: name.to_string(),
        type_params,
        methods,
        embedded,
    })
}

fn supertrait_args(
    tb: &syn::TraitBound,
    params: &BTreeSet<String>,
) -> Result<Vec<crate::model::TypeDescriptor>, lower::Unsupported> {
    let Some(last) = tb.path.segments.last() else {
        return Ok(Vec::new());
    };
    match &last.arguments {
        syn::PathArguments::None => Ok(Vec::new()),
        syn::PathArguments::AngleBracketed(ab) => ab
            .args
            .iter()
            .map(|arg| match arg {
                syn::GenericArgument::Type(ty) => lower_type(ty, params),
                other => Err(lower::Unsupported(format!(
                    "supertrait argument `{}`",
                    tokens_text(other)
                ))),
            })
            .collect(),
        syn::PathArguments::Parenthesized(_) => Err(lower::Unsupported(
            "parenthesized supertrait arguments".to_string(),
        )),
    }
}

fn bounds_text(
    bounds: &syn::punctuated::Punctuated<syn::TypeParamBound, syn::Token![+]>,
) -> String {
    bounds
        .iter()
        .map(|b| tokens_text(b))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// If `ty` is a bare identifier naming a declared type parameter,
/// return that name.
fn plain_param_name(ty: &syn::Type, params: &BTreeSet<String>) -> Option<String> {
    if let syn::Type::Path(tp) = ty {
        if tp.qself.is_none() && tp.path.leading_colon.is_none() && tp.path.segments.len() == 1 {
            let seg = &tp.path.segments[0];
            if matches!(seg.arguments, syn::PathArguments::None) {
                let name = seg.ident.to_string();
                if params.contains(&name) {
                    return Some(name);
                }
            }
        }
    }
    None
}
