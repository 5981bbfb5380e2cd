//! Lowering of `syn` signatures into the descriptor model.
//!
//! Constructs the model cannot represent without loss (and that the
//! emitter could therefore not re-serialize) are rejected with an
//! [`Unsupported`] description; the caller wraps that into an
//! `ExtractError::UnsupportedConstruct` with contract context.

use std::collections::BTreeSet;

use quote::ToTokens;

use crate::model::render::tidy;
use crate::model::{
    MethodSignature, ParamDescriptor, PathSegment, Receiver, ResultDescriptor, TypeDescriptor,
};

/// A construct the descriptor model cannot carry.
#[derive(Debug)]
pub struct Unsupported(pub String);

impl std::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render any `syn` node as normalized source text.
pub(crate) fn tokens_text<T: ToTokens>(node: &T) -> String {
    tidy(&node.to_token_stream().to_string())
}

/// Lower a `syn::Type` into a [`TypeDescriptor`]. `params` is the set
/// of type-parameter names in scope; a bare matching identifier
/// becomes [`TypeDescriptor::Param`] rather than a named type.
pub fn lower_type(
    ty: &syn::Type,
    params: &BTreeSet<String>,
) -> Result<TypeDescriptor, Unsupported> {
    match ty {
        syn::Type::Path(tp) => {
            if tp.qself.is_some() {
                return Err(Unsupported("qualified self type".to_string()));
            }
            if tp.path.leading_colon.is_none() && tp.path.segments.len() == 1 {
                let seg = &tp.path.segments[0];
                if matches!(seg.arguments, syn::PathArguments::None)
                    && params.contains(&seg.ident.to_string())
                {
                    return Ok(TypeDescriptor::Param(seg.ident.to_string()));
                }
            }
            let mut segments = Vec::new();
            for seg in &tp.path.segments {
                let mut args = Vec::new();
                match &seg.arguments {
                    syn::PathArguments::None => {}
                    syn::PathArguments::AngleBracketed(ab) => {
                        for arg in &ab.args {
                            match arg {
                                syn::GenericArgument::Type(inner) => {
                                    args.push(lower_type(inner, params)?);
                                }
                                syn::GenericArgument::Lifetime(lt) => {
                                    args.push(TypeDescriptor::Lifetime(format!("'{}", lt.ident)));
                                }
                                other => {
                                    return Err(Unsupported(format!(
                                        "generic argument `{}`",
                                        tokens_text(other)
                                    )));
                                }
                            }
                        }
                    }
                    syn::PathArguments::Parenthesized(_) => {
                        return Err(Unsupported(
                            "parenthesized path arguments outside a trait object".to_string(),
                        ));
                    }
                }
                segments.push(PathSegment {
                    name: seg.ident.to_string(),
                    args,
                });
            }
            Ok(TypeDescriptor::Path { segments })
        }
        syn::Type::Reference(r) => Ok(TypeDescriptor::Reference {
            lifetime: r.lifetime.as_ref().map(|lt| format!("'{}", lt.ident)),
            mutable: r.mutability.is_some(),
            inner: Box::new(lower_type(&r.elem, params)?),
        }),
        syn::Type::Ptr(p) => Ok(TypeDescriptor::RawPointer {
            mutable: p.mutability.is_some(),
            inner: Box::new(lower_type(&p.elem, params)?),
        }),
        syn::Type::Slice(s) => Ok(TypeDescriptor::Slice(Box::new(lower_type(
            &s.elem, params,
        )?))),
        syn::Type::Array(a) => Ok(TypeDescriptor::Array {
            elem: Box::new(lower_type(&a.elem, params)?),
            len: tokens_text(&a.len),
        }),
        syn::Type::Tuple(t) => {
            let elems = t
                .elems
                .iter()
                .map(|e| lower_type(e, params))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeDescriptor::Tuple(elems))
        }
        syn::Type::BareFn(f) => {
            if f.unsafety.is_some() {
                return Err(Unsupported("unsafe function type".to_string()));
            }
            if f.abi.is_some() {
                return Err(Unsupported("extern function type".to_string()));
            }
            if f.variadic.is_some() {
                return Err(Unsupported("C-variadic function type".to_string()));
            }
            if f.lifetimes.is_some() {
                return Err(Unsupported(
                    "explicit higher-ranked function type".to_string(),
                ));
            }
            let inputs = f
                .inputs
                .iter()
                .map(|arg| lower_type(&arg.ty, params))
                .collect::<Result<Vec<_>, _>>()?;
            let output = match &f.output {
                syn::ReturnType::Default => None,
                syn::ReturnType::Type(_, ty) => Some(Box::new(lower_type(ty, params)?)),
            };
            Ok(TypeDescriptor::BareFn {
                params: inputs,
                output,
            })
        }
        syn::Type::TraitObject(to) => {
            let mut bounds = Vec::new();
            for bound in &to.bounds {
                match bound {
                    syn::TypeParamBound::Trait(tb) => {
                        if !matches!(tb.modifier, syn::TraitBoundModifier::None) {
                            return Err(Unsupported("relaxed trait-object bound".to_string()));
                        }
                        bounds.push(tokens_text(tb));
                    }
                    syn::TypeParamBound::Lifetime(lt) => {
                        bounds.push(format!("'{}", lt.ident));
                    }
                    other => {
                        return Err(Unsupported(format!(
                            "trait-object bound `{}`",
                            tokens_text(other)
                        )));
                    }
                }
            }
            Ok(TypeDescriptor::TraitObject { bounds })
        }
        syn::Type::Paren(p) => lower_type(&p.elem, params),
        syn::Type::Group(g) => lower_type(&g.elem, params),
        other => Err(Unsupported(format!("type `{}`", tokens_text(other)))),
    }
}

/// Lower a trait method into a [`MethodSignature`].
pub(crate) fn lower_method(
    item: &syn::TraitItemFn,
    params: &BTreeSet<String>,
) -> Result<MethodSignature, Unsupported> {
    let sig = &item.sig;
    if sig.asyncness.is_some() {
        return Err(Unsupported("async method".to_string()));
    }
    if sig.unsafety.is_some() {
        return Err(Unsupported("unsafe method".to_string()));
    }
    if sig.abi.is_some() {
        return Err(Unsupported("extern method".to_string()));
    }
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(Unsupported("method-level generics".to_string()));
    }
    if sig.variadic.is_some() {
        return Err(Unsupported("C-variadic signature".to_string()));
    }

    let mut inputs = sig.inputs.iter();
    let receiver = match inputs.next() {
        Some(syn::FnArg::Receiver(r)) => {
            if r.colon_token.is_some() {
                return Err(Unsupported("explicitly typed receiver".to_string()));
            }
            match (&r.reference, &r.mutability) {
                (Some(_), Some(_)) => Receiver::RefMut,
                (Some(_), None) => Receiver::Ref,
                (None, _) => Receiver::Owned,
            }
        }
        _ => {
            return Err(Unsupported(
                "associated function without a receiver".to_string(),
            ));
        }
    };

    let mut lowered = Vec::new();
    for arg in inputs {
        match arg {
            syn::FnArg::Typed(pt) => {
                let name = match &*pt.pat {
                    syn::Pat::Ident(pi) => Some(pi.ident.to_string()),
                    _ => None,
                };
                lowered.push(ParamDescriptor {
                    name,
                    ty: lower_type(&pt.ty, params)?,
                    variadic: false,
                });
            }
            syn::FnArg::Receiver(_) => {
                return Err(Unsupported("misplaced receiver".to_string()));
            }
        }
    }

    let results = match &sig.output {
        syn::ReturnType::Default => Vec::new(),
        syn::ReturnType::Type(_, ty) => match lower_type(ty, params)? {
            TypeDescriptor::Tuple(elems) if elems.is_empty() => Vec::new(),
            TypeDescriptor::Tuple(elems) if elems.len() >= 2 => elems
                .into_iter()
                .map(|ty| ResultDescriptor { name: None, ty })
                .collect(),
            ty => vec![ResultDescriptor { name: None, ty }],
        },
    };

    Ok(MethodSignature {
        name: sig.ident.to_string(),
        receiver,
        params: lowered,
        results,
    })
}
