//! Debugger errors.

use crate::host::ScriptLanguage;

/// Errors surfaced by debug session operations.
///
/// Most misuse is deliberately absorbed as a silent no-op (stepping while
/// stopped, unknown breakpoint ids, unrecognized lines); only conditions
/// the user must act on become errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DebugError {
    /// The active file's language has no debugger support.
    #[error("debugging is only available for PowerShell scripts (active language: {language})")]
    UnsupportedLanguage {
        /// Language of the file the host tried to debug.
        language: ScriptLanguage,
    },
}
