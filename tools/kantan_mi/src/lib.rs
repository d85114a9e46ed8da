//! Machine-interface schema for the Kantan compiler.
//!
//! With `--mi` the compiler prints a single JSON document to stdout:
//!
//! ```text
//! {
//!   "errors":  [ Diagnostic ],      // always present
//!   "modules": [ AST module ],      // --dump-ast
//!   "ir":      [ CompiledUnit ],    // --dump-ir
//!   "config":  { ... }              // --dump-config
//! }
//! ```
//!
//! This crate owns the typed view of that document and the decoder that
//! turns captured stdout into it. Ordering inside every array is part of the
//! contract and is preserved as emitted.
//!
//! # Schema variants
//!
//! The compiler's output evolves. Fields such as `mangled_name`, `temp`,
//! `declared_in` or an expression's `ty` come and go between revisions, so
//! they are modelled as `Option` and their absence is never an error.
//! Unknown keys are ignored by the typed layer; exact snapshot comparison
//! goes through the raw JSON kept on [`Output`].

pub mod ast;
pub mod config;
pub mod decode;
pub mod diagnostic;
pub mod ir;

pub use ast::AstNode;
pub use config::CompilerConfig;
pub use decode::{decode, DecodeFault, DecodeFaultKind, DecodeMode, Decoded, Output, PlainOutput};
pub use diagnostic::{Diagnostic, Severity};
pub use ir::{
    BasicBlock, CompiledUnit, ConstValue, FunctionIr, FunctionKind, LocalSlot, Location, Operand,
    Projection, Statement, SwitchCase, Terminator,
};
