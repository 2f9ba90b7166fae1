//! The debug session: a line-stepping state machine over the host buffer.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use tracing::{debug, trace};

use shellide_runtime::{apply_line_effects, VariableTable};

use crate::breakpoints::BreakpointRegistry;
use crate::error::DebugError;
use crate::host::{EditorSurface, ScriptLanguage};

const MSG_STARTED: &str = "Debugging started";
const MSG_USAGE: &str = "Use the debug controls to navigate through the script";
const MSG_STOPPED: &str = "Debugging stopped";
const MSG_COMPLETED: &str = "Script execution completed";
const MSG_UNSUPPORTED: &str = "Debugging is only available for PowerShell scripts";
const GLOBAL_SCOPE: &str = "Global scope";

/// Two hyphen-joined word tokens (`Verb-Noun`) mark a line as a call the
/// debugger can step into.
static CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+-\w+)").expect("call pattern"));

/// One entry in the simulated call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Inferred callee name, or `"Global scope"` for the root frame.
    pub name: SmolStr,
    /// Call site line in the caller.
    pub line: u32,
    /// File the frame belongs to.
    pub file: SmolStr,
}

/// The live debugging state for one run of the active script.
///
/// The session owns its variable table and call stack outright; the
/// breakpoint registry stays with the host application and is only
/// queried on [`continue_run`](DebugSession::continue_run). All stepping
/// operations while stopped are silent no-ops, so a host toolbar can wire
/// its buttons straight through without guarding.
#[derive(Debug)]
pub struct DebugSession<S: EditorSurface> {
    host: S,
    active: bool,
    current_line: u32,
    variables: VariableTable,
    call_stack: Vec<CallFrame>,
}

impl<S: EditorSurface> DebugSession<S> {
    /// Create an inactive session around a host surface.
    #[must_use]
    pub fn new(host: S) -> Self {
        Self {
            host,
            active: false,
            current_line: 0,
            variables: VariableTable::new(),
            call_stack: Vec::new(),
        }
    }

    /// Start debugging the active file.
    ///
    /// No-op if a session is already running. Fails with
    /// [`DebugError::UnsupportedLanguage`] (and a transcript notice) for
    /// anything but PowerShell, leaving the session stopped. Otherwise
    /// resets all state, seeds the built-in variables and the root frame,
    /// and highlights line 1.
    pub fn start(&mut self, breakpoints: &BreakpointRegistry) -> Result<(), DebugError> {
        if self.active {
            return Ok(());
        }
        let language = self.host.language();
        if language != ScriptLanguage::PowerShell {
            self.host.notify(MSG_UNSUPPORTED);
            return Err(DebugError::UnsupportedLanguage { language });
        }

        self.active = true;
        self.current_line = 1;
        self.variables = VariableTable::with_builtins();
        self.call_stack = vec![CallFrame {
            name: SmolStr::new(GLOBAL_SCOPE),
            line: 1,
            file: SmolStr::new(self.host.file_name()),
        }];
        self.host.highlight_line(1);

        let file = self.host.file_name().to_string();
        let count = breakpoints.list(&file).len();
        debug!(file = %file, breakpoints = count, "debug session started");
        self.host.notify(MSG_STARTED);
        self.host.notify(&format!("Script: {file}"));
        self.host.notify(&format!("Breakpoints: {count}"));
        self.host.notify(MSG_USAGE);
        Ok(())
    }

    /// Advance to the next line, interpreting its effects. Falls off the
    /// end of the script into [`finish`](DebugSession::finish).
    pub fn step_over(&mut self) {
        if !self.active {
            return;
        }
        self.current_line += 1;
        self.interpret_current_line();
        if self.current_line > self.host.line_count() {
            self.finish();
            return;
        }
        self.host.highlight_line(self.current_line);
        let line = self.current_line;
        self.host.notify(&format!("Stepped over to line {line}"));
    }

    /// Step into a call on the current line, if one is there.
    ///
    /// A `Verb-Noun` token makes the line call-like: a frame named after
    /// the token is pushed with the call site recorded, and execution
    /// moves to the next line. Lines without the pattern step over.
    pub fn step_into(&mut self) {
        if !self.active {
            return;
        }
        let callee = self
            .host
            .line_text(self.current_line)
            .and_then(|text| CALL_RE.captures(text))
            .map(|captures| SmolStr::new(&captures[1]));
        let Some(callee) = callee else {
            self.step_over();
            return;
        };

        trace!(%callee, line = self.current_line, "stepping into call");
        self.call_stack.insert(
            0,
            CallFrame {
                name: callee,
                line: self.current_line,
                file: SmolStr::new(self.host.file_name()),
            },
        );
        self.current_line += 1;
        self.interpret_current_line();
        self.host.highlight_line(self.current_line);
        let line = self.current_line;
        self.host
            .notify(&format!("Stepped into function at line {line}"));
    }

    /// Pop the innermost frame and resume after its call site. No-op at
    /// the root frame.
    pub fn step_out(&mut self) {
        if !self.active || self.call_stack.len() <= 1 {
            return;
        }
        self.call_stack.remove(0);
        self.current_line = self.call_stack[0].line + 1;
        self.interpret_current_line();
        self.host.highlight_line(self.current_line);
        let line = self.current_line;
        self.host.notify(&format!("Stepped out to line {line}"));
    }

    /// Run to the next enabled breakpoint past the current line, or
    /// finish the script when none is left.
    pub fn continue_run(&mut self, breakpoints: &BreakpointRegistry) {
        if !self.active {
            return;
        }
        let next = breakpoints
            .next_enabled_after(self.host.file_name(), self.current_line)
            .map(|bp| bp.line);
        let Some(line) = next else {
            self.finish();
            return;
        };
        self.current_line = line;
        self.interpret_current_line();
        self.host.highlight_line(line);
        self.host
            .notify(&format!("Execution continued to line {line}"));
    }

    /// Report where execution is halted. Stepping is synchronous, so
    /// there is never a running thread to suspend; this emits a message
    /// and changes nothing.
    pub fn pause(&mut self) {
        if !self.active {
            return;
        }
        let line = self.current_line;
        self.host.notify(&format!("Execution paused at line {line}"));
    }

    /// End the session and clear the highlight. Idempotent.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        debug!("debug session stopped");
        self.active = false;
        self.host.clear_highlight();
        self.host.notify(MSG_STOPPED);
    }

    /// Announce completion, then stop.
    pub fn finish(&mut self) {
        if !self.active {
            return;
        }
        self.host.notify(MSG_COMPLETED);
        self.stop();
    }

    /// Stop and immediately start a fresh session on the same file.
    /// No-op while stopped.
    pub fn restart(&mut self, breakpoints: &BreakpointRegistry) -> Result<(), DebugError> {
        if !self.active {
            return Ok(());
        }
        self.stop();
        self.start(breakpoints)
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The line execution is halted on.
    #[must_use]
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    /// The session's variable table, for the variables panel.
    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// The call stack, innermost frame first; the root frame is always
    /// last while a session is active.
    #[must_use]
    pub fn call_stack(&self) -> &[CallFrame] {
        &self.call_stack
    }

    /// The host surface.
    #[must_use]
    pub fn host(&self) -> &S {
        &self.host
    }

    /// Mutable access to the host surface.
    pub fn host_mut(&mut self) -> &mut S {
        &mut self.host
    }

    fn interpret_current_line(&mut self) {
        let Some(text) = self.host.line_text(self.current_line) else {
            return;
        };
        let text = text.to_string();
        let fired = apply_line_effects(&text, &mut self.variables);
        if !fired.is_empty() {
            trace!(line = self.current_line, effects = fired.len(), "line effects applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScriptBuffer;

    fn session_for(text: &str) -> DebugSession<ScriptBuffer> {
        DebugSession::new(ScriptBuffer::new("script.ps1", text))
    }

    #[test]
    fn commands_before_start_are_no_ops() {
        let registry = BreakpointRegistry::new();
        let mut session = session_for("$x = 1\n$y = 2\n");
        session.step_over();
        session.step_into();
        session.step_out();
        session.continue_run(&registry);
        session.pause();
        session.stop();
        assert!(!session.is_active());
        assert_eq!(session.current_line(), 0);
        assert!(session.variables().is_empty());
        assert!(session.call_stack().is_empty());
        assert!(session.host().transcript().is_empty());
    }

    #[test]
    fn batch_scripts_are_not_debuggable() {
        let registry = BreakpointRegistry::new();
        let mut session = DebugSession::new(ScriptBuffer::new("build.bat", "echo hi\n"));
        let err = session.start(&registry).unwrap_err();
        assert_eq!(
            err,
            DebugError::UnsupportedLanguage {
                language: ScriptLanguage::Batch
            }
        );
        assert!(!session.is_active());
        assert_eq!(session.host().transcript(), [MSG_UNSUPPORTED]);
    }

    #[test]
    fn start_is_a_no_op_while_active() {
        let registry = BreakpointRegistry::new();
        let mut session = session_for("$x = 1\n$y = 2\n");
        session.start(&registry).unwrap();
        session.step_over();
        let line = session.current_line();
        session.start(&registry).unwrap();
        assert_eq!(session.current_line(), line);
    }

    #[test]
    fn pause_only_emits_a_message() {
        let registry = BreakpointRegistry::new();
        let mut session = session_for("$x = 1\n$y = 2\n");
        session.start(&registry).unwrap();
        let stack_before = session.call_stack().to_vec();
        session.pause();
        assert_eq!(session.current_line(), 1);
        assert_eq!(session.call_stack(), stack_before);
        assert_eq!(
            session.host().transcript().last().unwrap(),
            "Execution paused at line 1"
        );
    }

    #[test]
    fn restart_resets_session_state() {
        let registry = BreakpointRegistry::new();
        let mut session = session_for("$x = 1\n$y = 2\n$z = 3\n");
        session.start(&registry).unwrap();
        session.step_over();
        session.step_over();
        assert_eq!(session.current_line(), 3);

        session.restart(&registry).unwrap();
        assert!(session.is_active());
        assert_eq!(session.current_line(), 1);
        assert_eq!(session.call_stack().len(), 1);
        // Only the builtins survive a restart.
        assert!(session.variables().get("$x").is_none());
        assert!(session.variables().contains("$PSVersionTable"));
    }

    #[test]
    fn restart_while_stopped_is_a_no_op() {
        let registry = BreakpointRegistry::new();
        let mut session = session_for("$x = 1\n");
        session.restart(&registry).unwrap();
        assert!(!session.is_active());
        assert!(session.host().transcript().is_empty());
    }
}
