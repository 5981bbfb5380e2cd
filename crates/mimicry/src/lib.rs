//! # mimicry
//!
//! Trait declarations to test doubles.
//!
//! A Rust library that extracts capability contracts from trait
//! declarations, flattens supertrait embedding, and generates mock
//! implementations whose call dispatch asserts a strict global
//! stubbing order.
//!
//! ## Modules
//!
//! - [`extract`] — Parse sources and build flat contract descriptors
//! - [`model`] — The contract descriptor model and its renderer
//! - [`dispatch`] — The call-dispatch core linked into generated mocks
//! - [`emit`] — Render one mock source unit per contract
//! - [`generate`] — End-to-end codegen to disk
//! - [`check`] — Lint extracted contracts for misuse-prone shapes
//! - [`error`] — Extraction errors and diagnostic violations

pub mod check;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod extract;
pub mod generate;
pub mod model;

pub use error::{ExtractError, Severity, Violation};
