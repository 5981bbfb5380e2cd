//! The flattened, language-neutral contract model.
//!
//! [`types`] holds the descriptor structures the extractor produces
//! and the emitter consumes; [`render`] turns descriptors back into
//! Rust source text. The whole model is serde-serializable so a
//! flattened contract can be dumped as JSON (`mim model`) and loaded
//! back.

pub mod render;
pub mod types;

pub use render::{render_param_type, render_results};
pub use types::{
    ContractDescriptor, EmbeddedContract, MethodSignature, ParamDescriptor, PathSegment, Receiver,
    ResultDescriptor, TypeDescriptor, TypeParam,
};

/// Serialize a set of contract descriptors as pretty-printed JSON.
pub fn to_json(contracts: &[ContractDescriptor]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(contracts)
}
