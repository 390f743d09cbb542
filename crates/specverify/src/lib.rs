//! specverify - Verify spec documents against code
//!
//! Two checks are available:
//!
//! - **verification**: each spec under `specs_dir` is paired with the code
//!   it describes and an LLM judge scores how well the code implements it
//!   ([`verifier::Verifier`])
//! - **coverage**: routes are extracted from OpenAPI documents or framework
//!   code and matched against the route paths declared by specs
//!   ([`reconcile::reconcile`])
//!
//! The engine pieces live in `specverify-core`; the LLM providers live in
//! `specverify-judge`.

pub mod cli;
pub mod config;
pub mod extract;
pub mod logging;
pub mod output;
pub mod reconcile;
pub mod verifier;

pub use config::Config;
pub use extract::RouteExtractor;
pub use verifier::{CancelHandle, CancelSignal, Verifier, VerifierOptions};
