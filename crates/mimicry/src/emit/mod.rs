//! The proxy emitter.
//!
//! Renders one generated source unit per contract: a mock struct
//! owning a [`Dispatcher`](crate::dispatch::Dispatcher), an
//! `add_m`/`set_m` registration pair per flattened method, and one
//! trait impl per contract in the embedded closure, each proxy method
//! delegating to the dispatcher by method name.
//!
//! Output is fully deterministic: regenerating from an unchanged
//! declaration produces byte-identical text.

use crate::error::ExtractError;
use crate::extract::{embedded_closure, flatten};
use crate::model::{render_param_type, render_results, ContractDescriptor, MethodSignature};

/// Render the complete generated source unit for one contract.
pub fn emit_mock(contract: &ContractDescriptor) -> Result<String, ExtractError> {
    let flattened = flatten(contract)?;
    let closure = embedded_closure(contract)?;
    let mock = mock_name(contract);
    let decl = generics_decl(contract);
    let usage = generics_use(contract);

    tracing::debug!(contract = %contract.name, methods = flattened.len(), "emitting mock");

    let mut out = String::new();
    out.push_str(&format!(
        "// Code generated by mimicry; regenerate with `mim generate`. DO NOT EDIT.\n\
         //\n\
         // Declare this file as a sibling module of the one declaring\n\
         // `{}` so that `use super::*;` resolves the contract and every\n\
         // type its signatures mention.\n\n",
        contract.name
    ));
    out.push_str("use std::cell::RefCell;\n");
    if !contract.type_params.is_empty() {
        out.push_str("use std::marker::PhantomData;\n");
    }
    out.push_str("use std::rc::Rc;\n\n");
    out.push_str("use mimicry::dispatch::Dispatcher;\n\n");
    out.push_str("#[allow(unused_imports)]\nuse super::*;\n\n");

    // Mock struct.
    out.push_str(&format!(
        "/// Generated test double for the `{}` contract.\n",
        contract.name
    ));
    out.push_str(&format!("pub struct {mock}{decl} {{\n"));
    out.push_str("    core: RefCell<Dispatcher>,\n");
    if !contract.type_params.is_empty() {
        out.push_str(&format!(
            "    _contract: PhantomData<fn() -> {}>,\n",
            params_tuple(contract)
        ));
    }
    out.push_str("}\n\n");

    // Inherent impl: constructor, registration pairs, shared surface.
    out.push_str(&format!("impl{decl} {mock}{usage} {{\n"));
    out.push_str("    /// A mock with no stubs registered.\n");
    out.push_str("    pub fn new() -> Self {\n        Self {\n");
    out.push_str("            core: RefCell::new(Dispatcher::new()),\n");
    if !contract.type_params.is_empty() {
        out.push_str("            _contract: PhantomData,\n");
    }
    out.push_str("        }\n    }\n");
    for sig in &flattened {
        push_registration_pair(&mut out, sig);
    }
    out.push_str("\n    /// True while any sequence stub remains unconsumed.\n");
    out.push_str("    pub fn has_more(&self) -> bool {\n");
    out.push_str("        self.core.borrow().has_more()\n    }\n");
    out.push_str("\n    /// Method names invoked without an available stub, in call order.\n");
    out.push_str("    pub fn misses(&self) -> Vec<String> {\n");
    out.push_str("        self.core.borrow().misses().to_vec()\n    }\n");
    out.push_str("}\n\n");

    out.push_str(&format!("impl{decl} Default for {mock}{usage} {{\n"));
    out.push_str("    fn default() -> Self {\n        Self::new()\n    }\n}\n\n");

    // The contract's own trait impl.
    push_trait_impl(
        &mut out,
        &decl,
        &format!("{}{usage}", contract.name),
        &format!("{mock}{usage}"),
        &contract.methods,
    );

    // One independent impl per embedded contract, so the mock also
    // satisfies every capability the contract composes.
    for emb in &closure {
        let trait_ref = if emb.args.is_empty() {
            emb.name.clone()
        } else {
            let args: Vec<String> = emb.args.iter().map(|a| a.render()).collect();
            format!("{}<{}>", emb.name, args.join(", "))
        };
        push_trait_impl(
            &mut out,
            &decl,
            &trait_ref,
            &format!("{mock}{usage}"),
            &emb.methods,
        );
    }

    Ok(out)
}

/// `{Name}Mock`
pub fn mock_name(contract: &ContractDescriptor) -> String {
    format!("{}Mock", contract.name)
}

/// The generated file name for a contract: `{snake_name}_mock.rs`.
pub fn mock_file_name(contract: &ContractDescriptor) -> String {
    format!("{}_mock.rs", snake_case(&contract.name))
}

fn push_registration_pair(out: &mut String, sig: &MethodSignature) {
    let stub_bound = stub_bound(sig);
    let stub_ty = stub_type(sig);
    out.push_str(&format!(
        "\n    /// Append a single-use stub for `{}` to the call sequence.\n",
        sig.name
    ));
    out.push_str(&format!(
        "    pub fn add_{}(&self, stub: {stub_bound}) {{\n",
        sig.name
    ));
    out.push_str(&format!("        let stub: {stub_ty} = Rc::new(stub);\n"));
    out.push_str(&format!(
        "        self.core.borrow_mut().add(\"{}\", Rc::new(stub));\n    }}\n",
        sig.name
    ));
    out.push_str(&format!(
        "\n    /// Install the permanent fallback stub for `{}`.\n",
        sig.name
    ));
    out.push_str(&format!(
        "    pub fn set_{}(&self, stub: {stub_bound}) {{\n",
        sig.name
    ));
    out.push_str(&format!("        let stub: {stub_ty} = Rc::new(stub);\n"));
    out.push_str(&format!(
        "        self.core.borrow_mut().set(\"{}\", Rc::new(stub));\n    }}\n",
        sig.name
    ));
}

fn push_trait_impl(
    out: &mut String,
    decl: &str,
    trait_ref: &str,
    mock_ref: &str,
    methods: &[MethodSignature],
) {
    out.push_str(&format!("impl{decl} {trait_ref} for {mock_ref} {{\n"));
    for (i, sig) in methods.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_proxy_method(out, sig);
    }
    out.push_str("}\n\n");
}

fn push_proxy_method(out: &mut String, sig: &MethodSignature) {
    let params = fn_params(sig);
    let ret = render_results(&sig.results)
        .map(|r| format!(" -> {r}"))
        .unwrap_or_default();
    let stub_ty = stub_type(sig);
    let args = fn_args(sig);
    out.push_str(&format!(
        "    fn {}({params}){ret} {{\n",
        sig.name
    ));
    out.push_str(&format!(
        "        let __stub = self.core.borrow_mut().next(\"{}\");\n",
        sig.name
    ));
    out.push_str(&format!(
        "        match __stub.and_then(|s| s.downcast::<{stub_ty}>().ok()) {{\n"
    ));
    out.push_str(&format!("            Some(__call) => (*__call)({args}),\n"));
    out.push_str("            None => {\n");
    out.push_str(&format!(
        "                self.core.borrow_mut().record_miss(\"{}\");\n",
        sig.name
    ));
    out.push_str("                Default::default()\n            }\n        }\n    }\n");
}

/// `impl Fn(params…) -> results + 'static`, the registration bound.
fn stub_bound(sig: &MethodSignature) -> String {
    let tys: Vec<String> = sig.params.iter().map(render_param_type).collect();
    match render_results(&sig.results) {
        Some(ret) => format!("impl Fn({}) -> {ret} + 'static", tys.join(", ")),
        None => format!("impl Fn({}) + 'static", tys.join(", ")),
    }
}

/// `Rc<dyn Fn(params…) -> results>`, the erased stub type the proxy
/// casts back to after retrieval.
fn stub_type(sig: &MethodSignature) -> String {
    let tys: Vec<String> = sig.params.iter().map(render_param_type).collect();
    match render_results(&sig.results) {
        Some(ret) => format!("Rc<dyn Fn({}) -> {ret}>", tys.join(", ")),
        None => format!("Rc<dyn Fn({})>", tys.join(", ")),
    }
}

fn fn_params(sig: &MethodSignature) -> String {
    let mut parts = vec![sig.receiver.render().to_string()];
    for (i, p) in sig.params.iter().enumerate() {
        parts.push(format!("{}: {}", param_name(sig, i), render_param_type(p)));
    }
    parts.join(", ")
}

fn fn_args(sig: &MethodSignature) -> String {
    (0..sig.params.len())
        .map(|i| param_name(sig, i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn param_name(sig: &MethodSignature, i: usize) -> String {
    match &sig.params[i].name {
        Some(name) => name.clone(),
        None if sig.params[i].variadic => "args".to_string(),
        None => format!("arg{i}"),
    }
}

/// `<K: Eq + 'static, V: 'static>`, or empty for plain contracts. The
/// `'static` bound is what the type-erased stub cast requires; the
/// user's own constraints are carried verbatim in front of it.
fn generics_decl(contract: &ContractDescriptor) -> String {
    if contract.type_params.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = contract
        .type_params
        .iter()
        .map(|tp| match &tp.constraint {
            Some(c) if c.contains("'static") => format!("{}: {c}", tp.name),
            Some(c) => format!("{}: {c} + 'static", tp.name),
            None => format!("{}: 'static", tp.name),
        })
        .collect();
    format!("<{}>", parts.join(", "))
}

/// `<K, V>`, or empty.
fn generics_use(contract: &ContractDescriptor) -> String {
    if contract.type_params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = contract.type_params.iter().map(|tp| tp.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

/// Tuple of the contract's parameters, for the `PhantomData` anchor.
fn params_tuple(contract: &ContractDescriptor) -> String {
    let names: Vec<&str> = contract.type_params.iter().map(|tp| tp.name.as_str()).collect();
    if names.len() == 1 {
        format!("({},)", names[0])
    } else {
        format!("({})", names.join(", "))
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
