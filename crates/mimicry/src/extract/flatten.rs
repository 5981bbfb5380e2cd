//! Embedding resolution: flattening a contract's effective method set
//! and collecting the embedded closure a mock must also satisfy.
//!
//! The shadow rule is deterministic: a method declared by the outer
//! contract wins over any same-name method contributed by an embedded
//! contract. Two embedded contracts may contribute the same method
//! only if their flattened signatures agree exactly.

use std::collections::BTreeMap;

use crate::error::ExtractError;
use crate::model::{
    ContractDescriptor, MethodSignature, ParamDescriptor, PathSegment, ResultDescriptor,
    TypeDescriptor,
};

/// The effective method set of a contract: own methods first, then
/// embedded contributions in declaration order, shadow rule applied.
pub fn flatten(contract: &ContractDescriptor) -> Result<Vec<MethodSignature>, ExtractError> {
    let mut methods = contract.methods.clone();
    for emb in &contract.embedded {
        let inherited = flatten(&emb.descriptor)?;
        let map = substitution_map(&contract.name, &emb.descriptor, &emb.args)?;
        for method in inherited {
            let method = substitute_method(&method, &map);
            if contract.declares(&method.name) {
                // Outer declaration shadows the embedded one.
                continue;
            }
            if let Some(existing) = methods.iter().find(|m| m.name == method.name) {
                if existing.compatible(&method) {
                    continue;
                }
                return Err(ExtractError::SignatureConflict {
                    contract: contract.name.clone(),
                    method: method.name,
                });
            }
            methods.push(method);
        }
    }
    Ok(methods)
}

/// One embedded contract a generated mock must additionally
/// implement, with generic arguments and methods rewritten into the
/// outermost contract's parameter namespace.
#[derive(Debug, Clone)]
pub struct EmbeddedImpl {
    pub name: String,
    pub args: Vec<TypeDescriptor>,
    pub methods: Vec<MethodSignature>,
}

/// The transitive embedded closure of a contract, depth-first in
/// declaration order, deduplicated by contract name.
pub fn embedded_closure(contract: &ContractDescriptor) -> Result<Vec<EmbeddedImpl>, ExtractError> {
    let mut out = Vec::new();
    collect(&contract.name, contract, &BTreeMap::new(), &mut out)?;
    Ok(out)
}

fn collect(
    root: &str,
    contract: &ContractDescriptor,
    outer_map: &BTreeMap<String, TypeDescriptor>,
    out: &mut Vec<EmbeddedImpl>,
) -> Result<(), ExtractError> {
    for emb in &contract.embedded {
        if out.iter().any(|e| e.name == emb.descriptor.name) {
            continue;
        }
        let args: Vec<TypeDescriptor> = emb
            .args
            .iter()
            .map(|a| substitute_type(a, outer_map))
            .collect();
        let map = substitution_map(root, &emb.descriptor, &args)?;
        let methods = emb
            .descriptor
            .methods
            .iter()
            .map(|m| substitute_method(m, &map))
            .collect();
        out.push(EmbeddedImpl {
            name: emb.descriptor.name.clone(),
            args,
            methods,
        });
        collect(root, &emb.descriptor, &map, out)?;
    }
    Ok(())
}

fn substitution_map(
    root: &str,
    embedded: &ContractDescriptor,
    args: &[TypeDescriptor],
) -> Result<BTreeMap<String, TypeDescriptor>, ExtractError> {
    if args.is_empty() {
        return Ok(BTreeMap::new());
    }
    if args.len() != embedded.type_params.len() {
        return Err(ExtractError::UnsupportedConstruct {
            contract: root.to_string(),
            location: format!("embedded `{}`", embedded.name),
            construct: "generic argument arity mismatch".to_string(),
        });
    }
    Ok(embedded
        .type_params
        .iter()
        .zip(args)
        .map(|(p, a)| (p.name.clone(), a.clone()))
        .collect())
}

fn substitute_method(
    method: &MethodSignature,
    map: &BTreeMap<String, TypeDescriptor>,
) -> MethodSignature {
    if map.is_empty() {
        return method.clone();
    }
    MethodSignature {
        name: method.name.clone(),
        receiver: method.receiver,
        params: method
            .params
            .iter()
            .map(|p| ParamDescriptor {
                name: p.name.clone(),
                ty: substitute_type(&p.ty, map),
                variadic: p.variadic,
            })
            .collect(),
        results: method
            .results
            .iter()
            .map(|r| ResultDescriptor {
                name: r.name.clone(),
                ty: substitute_type(&r.ty, map),
            })
            .collect(),
    }
}

fn substitute_type(ty: &TypeDescriptor, map: &BTreeMap<String, TypeDescriptor>) -> TypeDescriptor {
    match ty {
        TypeDescriptor::Param(name) => map.get(name).cloned().unwrap_or_else(|| ty.clone()),
        TypeDescriptor::Path { segments } => TypeDescriptor::Path {
            segments: segments
                .iter()
                .map(|seg| PathSegment {
                    name: seg.name.clone(),
                    args: seg.args.iter().map(|a| substitute_type(a, map)).collect(),
                })
                .collect(),
        },
        TypeDescriptor::Reference {
            lifetime,
            mutable,
            inner,
        } => TypeDescriptor::Reference {
            lifetime: lifetime.clone(),
            mutable: *mutable,
            inner: Box::new(substitute_type(inner, map)),
        },
        TypeDescriptor::RawPointer { mutable, inner } => TypeDescriptor::RawPointer {
            mutable: *mutable,
            inner: Box::new(substitute_type(inner, map)),
        },
        TypeDescriptor::Slice(inner) => {
            TypeDescriptor::Slice(Box::new(substitute_type(inner, map)))
        }
        TypeDescriptor::Array { elem, len } => TypeDescriptor::Array {
            elem: Box::new(substitute_type(elem, map)),
            len: len.clone(),
        },
        TypeDescriptor::Tuple(elems) => {
            TypeDescriptor::Tuple(elems.iter().map(|e| substitute_type(e, map)).collect())
        }
        TypeDescriptor::BareFn { params, output } => TypeDescriptor::BareFn {
            params: params.iter().map(|p| substitute_type(p, map)).collect(),
            output: output
                .as_ref()
                .map(|o| Box::new(substitute_type(o, map))),
        },
        // Bound text is opaque; embedded contracts passing renamed
        // parameters through trait-object bounds are not rewritten.
        TypeDescriptor::TraitObject { .. } | TypeDescriptor::Lifetime(_) => ty.clone(),
    }
}
