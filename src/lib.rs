//! # Xode Core
//!
//! A front end for XPP-style ODE model files.
//!
//! This library provides:
//! - A line preprocessor handling comments, bracket checks and array expansion
//! - An Aho-Corasick keyword trie used for classification and substitution
//! - Extraction of every statement into a per-category symbol table
//! - Inlining of constants, temporaries, numbers and user function calls
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`trie`] - Multi-pattern matching automaton
//! - [`dsl`] - Preprocessing and definition extraction
//! - [`expand`] - Substitution engine and operand validation
//! - [`model`] - The expanded model
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! xode model.ode          # print a summary of the expanded model
//! xode --json model.ode   # dump the expanded symbol table as JSON
//! ```
//!
//! ### Library
//!
//! ```
//! use xode_core::{dsl, Model};
//!
//! let parsed = dsl::parse("!k=2\npar a=1\nx'=-k*a*x\ninit x=1").unwrap();
//! let model = Model::from_ast(parsed).unwrap();
//! assert_eq!(model.expression("x"), Some("-2*a*x"));
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmOdeModel } from 'xode_core';
//!
//! const model = new WasmOdeModel(source);
//! console.log(model.summary());
//! ```

pub mod dsl;
pub mod error;
pub mod expand;
pub mod model;
pub mod trie;

// Re-export main types for convenience
pub use dsl::{ParseConfig, ParsedModel, SymbolTable};
pub use error::{Result, XodeError};
pub use model::{Model, ModelConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmOdeModel;
