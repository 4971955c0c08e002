//! # Error catalogue generation for errz
//!
//! Error definitions live in JSON files, one object per file keyed by error
//! code. This crate validates them against a JSON Schema, merges them into a
//! single catalogue, and emits a Rust source file of constants plus one
//! Markdown reference page per domain.
//!
//! ## Usage
//!
//! The `errz-gen` binary runs the whole pipeline:
//!
//! ```bash
//! cargo run -p errz-codegen --bin errz-gen -- \
//!     -s ./schema/error_schema.json \
//!     -i ./definitions \
//!     -o ./src/errz_gen.rs \
//!     -d ./docs
//! ```
//!
//! Paths can also come from `errz.kdl` in the working directory; flags win.
//!
//! ## Modules
//!
//! - [`definition`] - Error definition records and the merged catalogue
//! - [`schema`] - JSON Schema validation of definition files
//! - [`loader`] - Concurrent loading and merging of a definitions directory
//! - [`codegen`] - Rust constant generation
//! - [`docs`] - Per-domain Markdown pages
//! - [`output`] - Writing generated artifacts
//! - [`pipeline`] - The end-to-end run
//! - [`config`] - `errz.kdl` configuration

pub mod cli;
pub mod codegen;
pub mod config;
pub mod definition;
pub mod docs;
pub mod error;
pub mod fs;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod schema;

pub use definition::{DefinitionSet, ErrorDefinition};
pub use error::{CodegenError, Result};
pub use pipeline::{Generator, GeneratorOps, Summary};
