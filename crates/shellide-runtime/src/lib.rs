//! `shellide-runtime` - simulated script state for the ShellIDE debugger.
//!
//! Nothing in this crate executes PowerShell. The debugger walks a script
//! line by line and asks this crate what a line *looks like* it does:
//! assignments, `New-Object` constructions, property writes and `Add` calls
//! are inferred by pattern classification and applied to an in-memory
//! variable table. It is a deliberately limited simulation, not language
//! semantics.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Line effect classification and application.
pub mod effects;
/// Literal shape classification.
pub mod literal;
/// Simulated values and the variable table.
pub mod value;

pub use effects::{apply_line_effects, LineEffect};
pub use literal::{classify_literal, classify_scalar};
pub use value::{Value, Variable, VariableTable};
