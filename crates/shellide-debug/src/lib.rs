//! `shellide-debug` - simulated line-stepping debugger for ShellIDE.
//!
//! The debugger never runs a script. A [`DebugSession`] advances a program
//! counter over the lines of the host editor's buffer, maintains a symbolic
//! call stack and variable table inferred from source text by
//! `shellide-runtime`, and exposes the conventional stepping primitives
//! (continue, step over, step into, step out). Stepping is synchronous and
//! cooperative: every command runs to completion before the host regains
//! control, so there is no thread to suspend and nothing to lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod breakpoints;
mod error;
mod host;
mod session;

pub use breakpoints::{Breakpoint, BreakpointId, BreakpointRegistry, BreakpointToggle};
pub use error::DebugError;
pub use host::{EditorSurface, ScriptBuffer, ScriptLanguage};
pub use session::{CallFrame, DebugSession};
