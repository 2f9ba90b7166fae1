//! Editor surface contract and the in-memory script buffer.
//!
//! The text-editing surface itself (cursor, rendering, highlighting
//! internals) lives outside this crate. The session only needs line
//! access, decoration toggles and a transcript sink, so that is the whole
//! contract.

use std::fmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// Languages the ShellIDE editor opens. Only PowerShell is debuggable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    /// PowerShell scripts (`.ps1`, `.psm1`, `.psd1`).
    PowerShell,
    /// Batch scripts (`.bat`, `.cmd`).
    Batch,
}

impl ScriptLanguage {
    /// Infer the language from a file name's extension. Unknown
    /// extensions default to PowerShell, the editor's primary mode.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("bat" | "cmd") => ScriptLanguage::Batch,
            _ => ScriptLanguage::PowerShell,
        }
    }
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptLanguage::PowerShell => write!(f, "PowerShell"),
            ScriptLanguage::Batch => write!(f, "Batch"),
        }
    }
}

/// The host editor surface consumed by the debug session.
///
/// All methods are cheap and infallible; `line_text` returns `None` for
/// out-of-range lines instead of erroring. Highlight and marker calls are
/// idempotent.
pub trait EditorSurface {
    /// Name of the active file.
    fn file_name(&self) -> &str;
    /// Language of the active file.
    fn language(&self) -> ScriptLanguage;
    /// Total line count of the buffer.
    fn line_count(&self) -> u32;
    /// Text of a 1-based line, or `None` past the end.
    fn line_text(&self, line: u32) -> Option<&str>;
    /// Move the current-line highlight (and reveal the line).
    fn highlight_line(&mut self, line: u32);
    /// Remove the current-line highlight.
    fn clear_highlight(&mut self);
    /// Add the gutter marker for a breakpoint line.
    fn add_breakpoint_marker(&mut self, line: u32);
    /// Remove the gutter marker for a breakpoint line.
    fn remove_breakpoint_marker(&mut self, line: u32);
    /// Append a user-visible debugger message to the output transcript.
    fn notify(&mut self, message: &str);
}

/// In-memory [`EditorSurface`]: holds the script text, the decoration
/// state and the transcript. Used by tests and by hosts without a real
/// editor widget.
#[derive(Debug, Clone)]
pub struct ScriptBuffer {
    file_name: SmolStr,
    language: ScriptLanguage,
    lines: Vec<String>,
    highlighted: Option<u32>,
    markers: FxHashSet<u32>,
    transcript: Vec<String>,
}

impl ScriptBuffer {
    /// Create a buffer from a file name and script text; the language is
    /// inferred from the extension.
    #[must_use]
    pub fn new(file_name: impl Into<SmolStr>, text: &str) -> Self {
        let file_name = file_name.into();
        let language = ScriptLanguage::from_file_name(&file_name);
        Self {
            file_name,
            language,
            lines: text.lines().map(str::to_string).collect(),
            highlighted: None,
            markers: FxHashSet::default(),
            transcript: Vec::new(),
        }
    }

    /// Override the inferred language (the IDE's language picker).
    #[must_use]
    pub fn with_language(mut self, language: ScriptLanguage) -> Self {
        self.language = language;
        self
    }

    /// Currently highlighted line, if any.
    #[must_use]
    pub fn highlighted_line(&self) -> Option<u32> {
        self.highlighted
    }

    /// Whether a gutter marker is present on a line.
    #[must_use]
    pub fn has_marker(&self, line: u32) -> bool {
        self.markers.contains(&line)
    }

    /// The transcript of debugger messages, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }
}

impl EditorSurface for ScriptBuffer {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn language(&self) -> ScriptLanguage {
        self.language
    }

    fn line_count(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    fn line_text(&self, line: u32) -> Option<&str> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        self.lines.get(index).map(String::as_str)
    }

    fn highlight_line(&mut self, line: u32) {
        self.highlighted = Some(line);
    }

    fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    fn add_breakpoint_marker(&mut self, line: u32) {
        self.markers.insert(line);
    }

    fn remove_breakpoint_marker(&mut self, line: u32) {
        self.markers.remove(&line);
    }

    fn notify(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}
