//! The breakpoint registry.
//!
//! Owned by the host application; the debug session only queries it when
//! continuing. Breakpoints are unique per (file, line) and toggle rather
//! than set: flagging an already-flagged line removes the breakpoint.

use smol_str::SmolStr;
use tracing::debug;

/// Opaque breakpoint identifier, unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointId(u64);

/// A user-set breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Registry-unique id.
    pub id: BreakpointId,
    /// 1-based line the breakpoint sits on.
    pub line: u32,
    /// File the breakpoint belongs to.
    pub file: SmolStr,
    /// Disabled breakpoints survive in the list but never halt execution.
    pub enabled: bool,
}

/// Outcome of a toggle, so the host can sync its gutter marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointToggle {
    /// A breakpoint was created on the line.
    Added(BreakpointId),
    /// The existing breakpoint on the line was removed.
    Removed(BreakpointId),
}

/// Stores breakpoints across files. Internal order is arbitrary; queries
/// sort where presentation needs it.
#[derive(Debug, Clone, Default)]
pub struct BreakpointRegistry {
    breakpoints: Vec<Breakpoint>,
    next_id: u64,
}

impl BreakpointRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the breakpoint at (file, line): create it enabled if
    /// absent, remove it if present.
    pub fn toggle(&mut self, file: &str, line: u32) -> BreakpointToggle {
        if let Some(index) = self
            .breakpoints
            .iter()
            .position(|bp| bp.file == file && bp.line == line)
        {
            let removed = self.breakpoints.remove(index);
            debug!(file, line, id = removed.id.0, "breakpoint removed");
            return BreakpointToggle::Removed(removed.id);
        }
        let id = BreakpointId(self.next_id);
        self.next_id += 1;
        self.breakpoints.push(Breakpoint {
            id,
            line,
            file: SmolStr::new(file),
            enabled: true,
        });
        debug!(file, line, id = id.0, "breakpoint added");
        BreakpointToggle::Added(id)
    }

    /// Enable or disable a breakpoint. Unknown ids are ignored.
    pub fn set_enabled(&mut self, id: BreakpointId, enabled: bool) {
        if let Some(bp) = self.breakpoints.iter_mut().find(|bp| bp.id == id) {
            bp.enabled = enabled;
        }
    }

    /// Remove a breakpoint by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: BreakpointId) -> Option<Breakpoint> {
        let index = self.breakpoints.iter().position(|bp| bp.id == id)?;
        Some(self.breakpoints.remove(index))
    }

    /// Breakpoints for a file in ascending line order.
    #[must_use]
    pub fn list(&self, file: &str) -> Vec<Breakpoint> {
        let mut listed: Vec<Breakpoint> = self
            .breakpoints
            .iter()
            .filter(|bp| bp.file == file)
            .cloned()
            .collect();
        listed.sort_by_key(|bp| bp.line);
        listed
    }

    /// The enabled breakpoint with the smallest line strictly greater
    /// than `line`, if any.
    #[must_use]
    pub fn next_enabled_after(&self, file: &str, line: u32) -> Option<&Breakpoint> {
        self.breakpoints
            .iter()
            .filter(|bp| bp.enabled && bp.file == file && bp.line > line)
            .min_by_key(|bp| bp.line)
    }

    /// Total number of breakpoints across all files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// Whether the registry holds no breakpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Drop every breakpoint.
    pub fn clear(&mut self) {
        self.breakpoints.clear();
    }
}
