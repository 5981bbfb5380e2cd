//! Rendering of descriptors back to Rust source text.
//!
//! This is the serialization half of the round-trip invariant: every
//! descriptor the extractor produces must render to syntactically
//! valid Rust, structurally identical to what was parsed.

use crate::model::types::{ParamDescriptor, ResultDescriptor, TypeDescriptor};

impl TypeDescriptor {
    /// Render this descriptor as canonical Rust source text.
    pub fn render(&self) -> String {
        match self {
            Self::Path { segments } => segments
                .iter()
                .map(|seg| {
                    if seg.args.is_empty() {
                        seg.name.clone()
                    } else {
                        let args: Vec<String> = seg.args.iter().map(Self::render).collect();
                        format!("{}<{}>", seg.name, args.join(", "))
                    }
                })
                .collect::<Vec<_>>()
                .join("::"),
            Self::Param(name) => name.clone(),
            Self::Lifetime(lt) => lt.clone(),
            Self::Reference {
                lifetime,
                mutable,
                inner,
            } => {
                let lt = lifetime
                    .as_ref()
                    .map(|l| format!("{l} "))
                    .unwrap_or_default();
                let m = if *mutable { "mut " } else { "" };
                format!("&{lt}{m}{}", inner.render())
            }
            Self::RawPointer { mutable, inner } => {
                let m = if *mutable { "mut" } else { "const" };
                format!("*{m} {}", inner.render())
            }
            Self::Slice(inner) => format!("[{}]", inner.render()),
            Self::Array { elem, len } => format!("[{}; {len}]", elem.render()),
            Self::Tuple(elems) => match elems.len() {
                0 => "()".to_string(),
                1 => format!("({},)", elems[0].render()),
                _ => {
                    let parts: Vec<String> = elems.iter().map(Self::render).collect();
                    format!("({})", parts.join(", "))
                }
            },
            Self::BareFn { params, output } => {
                let parts: Vec<String> = params.iter().map(Self::render).collect();
                match output {
                    Some(out) => format!("fn({}) -> {}", parts.join(", "), out.render()),
                    None => format!("fn({})", parts.join(", ")),
                }
            }
            Self::TraitObject { bounds } => format!("dyn {}", bounds.join(" + ")),
        }
    }
}

/// Render the type of one parameter. A variadic tail renders as a
/// slice of the element type, forwarded whole by generated proxies.
pub fn render_param_type(param: &ParamDescriptor) -> String {
    if param.variadic {
        format!("&[{}]", param.ty.render())
    } else {
        param.ty.render()
    }
}

/// Render a result list as a return type: `None` for no results,
/// the bare type for one, a tuple for several.
pub fn render_results(results: &[ResultDescriptor]) -> Option<String> {
    match results.len() {
        0 => None,
        1 => Some(results[0].ty.render()),
        _ => {
            let parts: Vec<String> = results.iter().map(|r| r.ty.render()).collect();
            Some(format!("({})", parts.join(", ")))
        }
    }
}

/// Normalize token-stream text (as produced by `quote`) into readable
/// source text. Used for the fragments the model keeps as strings:
/// constraint expressions, trait-object bounds, array lengths.
pub(crate) fn tidy(raw: &str) -> String {
    let mut s = raw.trim().to_string();
    let rules = [
        (" ::", "::"),
        (":: ", "::"),
        (" <", "<"),
        ("< ", "<"),
        (" >", ">"),
        (" ,", ","),
        (" ;", ";"),
        ("& ", "&"),
        (" (", "("),
        ("( ", "("),
        (" )", ")"),
        (" [", "["),
        ("[ ", "["),
        (" ]", "]"),
        ("* ", "*"),
    ];
    loop {
        let before = s.clone();
        for (from, to) in rules {
            s = s.replace(from, to);
        }
        if s == before {
            break;
        }
    }
    s = s.replace("->", " -> ");
    while s.contains("  ") {
        s = s.replace("  ", " ");
    }
    s.trim().to_string()
}
