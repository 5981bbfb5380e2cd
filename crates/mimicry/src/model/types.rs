use serde::{Deserialize, Serialize};

/// A language-neutral description of a type as it appears in a
/// contract signature.
///
/// The invariant carried by this enum is that [`render`] produces
/// syntactically valid Rust for every value, with no loss of
/// structure — see the round-trip tests in `tests/render_roundtrip.rs`.
///
/// [`render`]: TypeDescriptor::render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDescriptor {
    /// A named type, possibly qualified (`std::io::Error`) and
    /// possibly carrying generic arguments (`Vec<T>`). The qualifying
    /// path is retained exactly as written in the source; no aliases
    /// are invented.
    Path { segments: Vec<PathSegment> },
    /// A reference to a type parameter declared by the contract.
    Param(String),
    /// A lifetime, legal only as a generic argument of a path segment
    /// (`Cow<'a, str>`).
    Lifetime(String),
    /// `&T`, `&'a T`, `&mut T`.
    Reference {
        lifetime: Option<String>,
        mutable: bool,
        inner: Box<TypeDescriptor>,
    },
    /// `*const T` / `*mut T`.
    RawPointer {
        mutable: bool,
        inner: Box<TypeDescriptor>,
    },
    /// `[T]`.
    Slice(Box<TypeDescriptor>),
    /// `[T; N]`. The length expression is kept as source text.
    Array {
        elem: Box<TypeDescriptor>,
        len: String,
    },
    /// `(A, B)`; the empty tuple is the unit type.
    Tuple(Vec<TypeDescriptor>),
    /// An anonymous function type: `fn(A, B) -> R`.
    BareFn {
        params: Vec<TypeDescriptor>,
        output: Option<Box<TypeDescriptor>>,
    },
    /// An anonymous capability contract: `dyn Trait + Send`. Bounds
    /// are kept as source text since they carry no further structure
    /// the emitter needs.
    TraitObject { bounds: Vec<String> },
}

/// One segment of a qualified path, with its generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeDescriptor>,
}

impl PathSegment {
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }
}

impl TypeDescriptor {
    /// Shorthand for an unqualified, argument-free named type.
    pub fn named(name: &str) -> Self {
        Self::Path {
            segments: vec![PathSegment::plain(name)],
        }
    }

    /// The unit type, used for methods without results.
    pub fn unit() -> Self {
        Self::Tuple(Vec::new())
    }
}

/// How a contract method receives its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
    /// `self`
    Owned,
}

impl Receiver {
    pub fn render(self) -> &'static str {
        match self {
            Self::Ref => "&self",
            Self::RefMut => "&mut self",
            Self::Owned => "self",
        }
    }
}

/// One method parameter. The name is optional; the emitter assigns
/// positional names where the source left a parameter unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    pub ty: TypeDescriptor,
    /// Legal only on the last parameter. When set, `ty` is the
    /// element type and the parameter is rendered and forwarded as a
    /// single `&[T]` slice, never enumerated.
    #[serde(default)]
    pub variadic: bool,
}

/// One method result. Names are optional and ignored for signature
/// equality; only order and type matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    pub ty: TypeDescriptor,
}

/// A single contract method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub receiver: Receiver,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default)]
    pub results: Vec<ResultDescriptor>,
}

impl MethodSignature {
    /// Signature compatibility: same name, same parameter types in
    /// order (including the variadic flag), same result types in
    /// order. Parameter and result names do not participate.
    pub fn compatible(&self, other: &MethodSignature) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self.results.len() == other.results.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty && a.variadic == b.variadic)
            && self
                .results
                .iter()
                .zip(&other.results)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// A type parameter declared by a contract, with the constraint text
/// carried verbatim from the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub constraint: Option<String>,
}

/// A contract embedded (in Rust terms: a supertrait) by another
/// contract, together with the generic arguments supplied at the
/// embedding site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedContract {
    pub descriptor: ContractDescriptor,
    #[serde(default)]
    pub args: Vec<TypeDescriptor>,
}

/// A capability contract: a named set of method signatures, possibly
/// composed from embedded contracts and parameterized by type
/// variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
    #[serde(default)]
    pub embedded: Vec<EmbeddedContract>,
}

impl ContractDescriptor {
    /// Whether this contract declares a method with the given name,
    /// not counting embedded contributions.
    pub fn declares(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.name == method)
    }
}
