//! Simulated runtime values and the per-session variable table.

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

/// Longest value preview rendered in the variables panel before truncation.
const PREVIEW_MAX_LEN: usize = 50;

/// A simulated value inferred from script text.
///
/// Object-likes (`New-Object` results, hashtables) are property bags of
/// nested values; there is no reflection and no real type system behind
/// the tags carried alongside in [`Variable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// String scalar.
    Str(SmolStr),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Boolean scalar.
    Bool(bool),
    /// The `$null` literal.
    Null,
    /// Ordered list of trimmed string elements (`@( ... )`).
    Array(Vec<SmolStr>),
    /// Insertion-ordered property bag (`@{ ... }` or a constructed object).
    Table(IndexMap<SmolStr, Value>),
}

impl Value {
    /// Returns the property bag, if this value is one.
    #[must_use]
    pub fn as_table(&self) -> Option<&IndexMap<SmolStr, Value>> {
        match self {
            Value::Table(fields) => Some(fields),
            _ => None,
        }
    }

    /// Mutable access to the property bag, if this value is one.
    pub fn as_table_mut(&mut self) -> Option<&mut IndexMap<SmolStr, Value>> {
        match self {
            Value::Table(fields) => Some(fields),
            _ => None,
        }
    }

    /// Render the variables-panel preview: scalars as-is, composites as
    /// compact JSON cut at 50 characters.
    #[must_use]
    pub fn preview(&self) -> String {
        match self {
            Value::Str(text) => text.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(_) | Value::Table(_) => {
                let encoded = serde_json::to_string(self).unwrap_or_default();
                truncate_preview(&encoded)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(SmolStr::new(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

fn truncate_preview(encoded: &str) -> String {
    let mut preview: String = encoded.chars().take(PREVIEW_MAX_LEN).collect();
    if encoded.chars().count() > PREVIEW_MAX_LEN {
        preview.push_str("...");
    }
    preview
}

/// A named slot in the variable table: the inferred value plus a freeform
/// descriptive type tag (`System.String`, `System.Windows.Forms.Form`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Inferred value.
    pub value: Value,
    /// Descriptive type tag shown in the variables panel.
    pub type_name: SmolStr,
}

impl Variable {
    /// Create a variable from a value and type tag.
    #[must_use]
    pub fn new(value: Value, type_name: impl Into<SmolStr>) -> Self {
        Self {
            value,
            type_name: type_name.into(),
        }
    }
}

/// The debug session's variable table, keyed by the sigil-prefixed name
/// (`$x`). Insertion-ordered so the panel lists variables in the order
/// they first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    entries: IndexMap<SmolStr, Variable>,
}

impl VariableTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table seeded with the simulated host environment:
    /// `$PSVersionTable`, `$PWD` and `$Host`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.insert(
            "$PSVersionTable",
            Variable::new(
                Value::Table(ps_version_table()),
                "System.Management.Automation.PSVersionTable",
            ),
        );
        table.insert(
            "$PWD",
            Variable::new(
                Value::from(r"C:\Users\User\Documents"),
                "System.Management.Automation.PathInfo",
            ),
        );
        table.insert(
            "$Host",
            Variable::new(
                Value::from("PowerShell Visual IDE Host"),
                "System.Management.Automation.Internal.Host.InternalHost",
            ),
        );
        table
    }

    /// Insert or overwrite a variable.
    pub fn insert(&mut self, name: impl Into<SmolStr>, variable: Variable) {
        self.entries.insert(name.into(), variable);
    }

    /// Look up a variable by sigil-prefixed name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries.get(name)
    }

    /// Mutable lookup by sigil-prefixed name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.entries.get_mut(name)
    }

    /// Whether a variable with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Variable)> {
        self.entries.iter()
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn ps_version_table() -> IndexMap<SmolStr, Value> {
    let mut fields = IndexMap::new();
    fields.insert(SmolStr::new("PSVersion"), Value::from("7.3.0"));
    fields.insert(SmolStr::new("PSEdition"), Value::from("Core"));
    fields.insert(SmolStr::new("GitCommitId"), Value::from("7.3.0"));
    fields.insert(
        SmolStr::new("OS"),
        Value::from("Microsoft Windows 10.0.19044"),
    );
    fields.insert(SmolStr::new("Platform"), Value::from("Win32NT"));
    fields.insert(
        SmolStr::new("PSCompatibleVersions"),
        Value::Array(
            ["1.0", "2.0", "3.0", "4.0", "5.0", "5.1", "6.0", "7.0", "7.3"]
                .into_iter()
                .map(SmolStr::new)
                .collect(),
        ),
    );
    fields.insert(SmolStr::new("PSRemotingProtocolVersion"), Value::from("2.3"));
    fields.insert(SmolStr::new("SerializationVersion"), Value::from("1.1.0.1"));
    fields.insert(SmolStr::new("WSManStackVersion"), Value::from("3.0"));
    fields
}
