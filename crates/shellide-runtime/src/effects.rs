//! The line effect interpreter.
//!
//! An ordered pipeline of independent pattern classifiers, each matched
//! against the same source line. A classifier that matches applies its
//! effect to the variable table; a line matching nothing has no effect.
//! This is pattern classification over text, not evaluation: a line like
//! `$x = Get-Date` produces the *string* `Get-Date`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use tracing::trace;

use crate::literal::{classify_literal, classify_scalar};
use crate::value::{Value, Variable, VariableTable};

static ASSIGNMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)\s*=\s*(.+)").expect("assignment pattern"));
static NEW_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)\s*=\s*New-Object\s+(\S+)").expect("new-object pattern"));
static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)\.(\w+)\s*=\s*(.+)").expect("property pattern"));
static METHOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)\.(\w+)\(").expect("method pattern"));
static ADD_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\w+)\.Add\(\$(\w+)\)").expect("add-call pattern"));

/// One effect inferred from a line. A single line can fire several: a
/// `New-Object` line is both an assignment and a construction, and the
/// construction wins by running later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEffect {
    /// `$name = expr` overwrote the table entry for `$name`.
    Assigned {
        /// Sigil-prefixed variable name.
        name: SmolStr,
    },
    /// `$name = New-Object TypeName` seeded a property bag.
    Constructed {
        /// Sigil-prefixed variable name.
        name: SmolStr,
        /// Constructor type name, kept verbatim as the type tag.
        type_name: SmolStr,
    },
    /// `$name.Prop = expr` stored a scalar into an existing bag.
    PropertySet {
        /// Sigil-prefixed variable name.
        name: SmolStr,
        /// Property stored into the bag.
        property: SmolStr,
    },
    /// `$name.Method(` was recognized. Only `Add` mutates state; every
    /// other method is a known simulation gap and leaves the table alone.
    MethodCalled {
        /// Sigil-prefixed variable name.
        name: SmolStr,
        /// Invoked method name.
        method: SmolStr,
    },
}

/// Apply every matching classifier to `line`, mutating `variables` in
/// place. Returns the effects that fired, in classifier order.
pub fn apply_line_effects(line: &str, variables: &mut VariableTable) -> Vec<LineEffect> {
    let mut fired = Vec::new();

    if let Some(captures) = ASSIGNMENT_RE.captures(line) {
        let name = sigil_name(&captures[1]);
        let (value, type_name) = classify_literal(&captures[2]);
        trace!(%name, %type_name, "assignment");
        variables.insert(name.clone(), Variable::new(value, type_name));
        fired.push(LineEffect::Assigned { name });
    }

    if let Some(captures) = NEW_OBJECT_RE.captures(line) {
        let name = sigil_name(&captures[1]);
        let type_name = SmolStr::new(&captures[2]);
        let value = construct_object(&type_name);
        trace!(%name, %type_name, "construction");
        variables.insert(name.clone(), Variable::new(value, type_name.clone()));
        fired.push(LineEffect::Constructed { name, type_name });
    }

    if let Some(captures) = PROPERTY_RE.captures(line) {
        let name = sigil_name(&captures[1]);
        let property = SmolStr::new(&captures[2]);
        let value = classify_scalar(&captures[3]);
        let stored = variables
            .get_mut(&name)
            .and_then(|variable| variable.value.as_table_mut())
            .map(|fields| fields.insert(property.clone(), value))
            .is_some();
        if stored {
            trace!(%name, %property, "property assignment");
            fired.push(LineEffect::PropertySet { name, property });
        }
    }

    if let Some(captures) = METHOD_RE.captures(line) {
        let name = sigil_name(&captures[1]);
        let method = SmolStr::new(&captures[2]);
        if variables.contains(&name) {
            if method == "Add" {
                apply_add_call(line, variables);
            }
            trace!(%name, %method, "method call");
            fired.push(LineEffect::MethodCalled { name, method });
        }
    }

    fired
}

/// `$parent.Add($child)` appends the child's bare name to the parent's
/// `Controls` list, creating the list on first use. Both variables must
/// exist and the parent must hold a bag.
fn apply_add_call(line: &str, variables: &mut VariableTable) {
    let Some(captures) = ADD_CALL_RE.captures(line) else {
        return;
    };
    let parent = sigil_name(&captures[1]);
    let child = SmolStr::new(&captures[2]);
    if !variables.contains(&format!("${child}")) {
        return;
    }
    let Some(fields) = variables
        .get_mut(&parent)
        .and_then(|variable| variable.value.as_table_mut())
    else {
        return;
    };
    let controls = fields
        .entry(SmolStr::new("Controls"))
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(elements) = controls {
        elements.push(child);
    }
}

/// Seed the canned property bag for a constructor type. The simulator
/// knows the three WinForms controls the GUI designer emits; everything
/// else starts as an empty bag tagged with the requested type.
fn construct_object(type_name: &str) -> Value {
    match type_name {
        "System.Windows.Forms.Form" => Value::Table(fields([
            ("Text", Value::from("Form1")),
            ("Size", size(300, 200)),
            ("StartPosition", Value::from("CenterScreen")),
        ])),
        "System.Windows.Forms.Button" => Value::Table(fields([
            ("Text", Value::from("Button1")),
            ("Size", size(75, 23)),
            ("Location", location(50, 50)),
        ])),
        "System.Windows.Forms.TextBox" => Value::Table(fields([
            ("Text", Value::from("")),
            ("Size", size(100, 20)),
            ("Location", location(50, 80)),
        ])),
        _ => Value::Table(IndexMap::new()),
    }
}

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> IndexMap<SmolStr, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (SmolStr::new(key), value))
        .collect()
}

fn size(width: i64, height: i64) -> Value {
    Value::Table(fields([
        ("Width", Value::Int(width)),
        ("Height", Value::Int(height)),
    ]))
}

fn location(x: i64, y: i64) -> Value {
    Value::Table(fields([("X", Value::Int(x)), ("Y", Value::Int(y))]))
}

fn sigil_name(bare: &str) -> SmolStr {
    SmolStr::new(format!("${bare}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_overwrites_existing_entry() {
        let mut variables = VariableTable::new();
        apply_line_effects("$x = 1", &mut variables);
        let fired = apply_line_effects("$x = \"hello\"", &mut variables);
        assert_eq!(
            fired,
            vec![LineEffect::Assigned {
                name: SmolStr::new("$x")
            }]
        );
        let variable = variables.get("$x").unwrap();
        assert_eq!(variable.value, Value::from("hello"));
        assert_eq!(variable.type_name, "System.String");
    }

    #[test]
    fn new_object_form_seeds_canned_bag() {
        let mut variables = VariableTable::new();
        let fired = apply_line_effects(
            "$form = New-Object System.Windows.Forms.Form",
            &mut variables,
        );
        // Both the assignment and the construction fire; the bag wins.
        assert_eq!(fired.len(), 2);
        assert!(matches!(fired[1], LineEffect::Constructed { .. }));
        let variable = variables.get("$form").unwrap();
        assert_eq!(variable.type_name, "System.Windows.Forms.Form");
        let bag = variable.value.as_table().unwrap();
        assert_eq!(bag.get("Text"), Some(&Value::from("Form1")));
        assert_eq!(bag.get("StartPosition"), Some(&Value::from("CenterScreen")));
        let size = bag.get("Size").unwrap().as_table().unwrap();
        assert_eq!(size.get("Width"), Some(&Value::Int(300)));
        assert_eq!(size.get("Height"), Some(&Value::Int(200)));
    }

    #[test]
    fn unknown_constructor_seeds_empty_bag() {
        let mut variables = VariableTable::new();
        apply_line_effects("$client = New-Object System.Net.WebClient", &mut variables);
        let variable = variables.get("$client").unwrap();
        assert_eq!(variable.type_name, "System.Net.WebClient");
        assert!(variable.value.as_table().unwrap().is_empty());
    }

    #[test]
    fn property_assignment_requires_a_bag() {
        let mut variables = VariableTable::new();
        apply_line_effects("$form = New-Object System.Windows.Forms.Form", &mut variables);
        apply_line_effects("$x = 1", &mut variables);

        let fired = apply_line_effects("$form.Text = \"Login\"", &mut variables);
        assert_eq!(
            fired,
            vec![LineEffect::PropertySet {
                name: SmolStr::new("$form"),
                property: SmolStr::new("Text"),
            }]
        );
        let bag = variables.get("$form").unwrap().value.as_table().unwrap();
        assert_eq!(bag.get("Text"), Some(&Value::from("Login")));

        // Scalar receiver: recognized as nothing, no effect.
        let fired = apply_line_effects("$x.Text = \"nope\"", &mut variables);
        assert!(fired.is_empty());
        assert_eq!(variables.get("$x").unwrap().value, Value::Int(1));
    }

    #[test]
    fn property_values_are_scalar_coerced() {
        let mut variables = VariableTable::new();
        apply_line_effects("$form = New-Object System.Windows.Forms.Form", &mut variables);
        apply_line_effects("$form.Width = 640", &mut variables);
        apply_line_effects("$form.Opacity = 0.8", &mut variables);
        let bag = variables.get("$form").unwrap().value.as_table().unwrap();
        assert_eq!(bag.get("Width"), Some(&Value::Int(640)));
        assert_eq!(bag.get("Opacity"), Some(&Value::Float(0.8)));
    }

    #[test]
    fn add_call_appends_to_controls() {
        let mut variables = VariableTable::new();
        apply_line_effects("$form = New-Object System.Windows.Forms.Form", &mut variables);
        apply_line_effects(
            "$button = New-Object System.Windows.Forms.Button",
            &mut variables,
        );
        let fired = apply_line_effects("$form.Add($button)", &mut variables);
        assert_eq!(
            fired,
            vec![LineEffect::MethodCalled {
                name: SmolStr::new("$form"),
                method: SmolStr::new("Add"),
            }]
        );
        let bag = variables.get("$form").unwrap().value.as_table().unwrap();
        assert_eq!(
            bag.get("Controls"),
            Some(&Value::Array(vec![SmolStr::new("button")]))
        );

        apply_line_effects("$text = New-Object System.Windows.Forms.TextBox", &mut variables);
        apply_line_effects("$form.Add($text)", &mut variables);
        let bag = variables.get("$form").unwrap().value.as_table().unwrap();
        assert_eq!(
            bag.get("Controls"),
            Some(&Value::Array(vec![
                SmolStr::new("button"),
                SmolStr::new("text")
            ]))
        );
    }

    #[test]
    fn add_call_with_unknown_argument_is_inert() {
        let mut variables = VariableTable::new();
        apply_line_effects("$form = New-Object System.Windows.Forms.Form", &mut variables);
        let fired = apply_line_effects("$form.Add($ghost)", &mut variables);
        // Recognized syntactically, but no state change.
        assert_eq!(fired.len(), 1);
        let bag = variables.get("$form").unwrap().value.as_table().unwrap();
        assert!(bag.get("Controls").is_none());
    }

    #[test]
    fn unmodeled_methods_leave_state_alone() {
        let mut variables = VariableTable::new();
        apply_line_effects("$form = New-Object System.Windows.Forms.Form", &mut variables);
        let before = variables.clone();
        let fired = apply_line_effects("$form.ShowDialog()", &mut variables);
        assert_eq!(
            fired,
            vec![LineEffect::MethodCalled {
                name: SmolStr::new("$form"),
                method: SmolStr::new("ShowDialog"),
            }]
        );
        assert_eq!(variables, before);
    }

    #[test]
    fn unmatched_lines_have_no_effect() {
        let mut variables = VariableTable::with_builtins();
        let before = variables.clone();
        assert!(apply_line_effects("Write-Host \"hi\"", &mut variables).is_empty());
        assert!(apply_line_effects("", &mut variables).is_empty());
        assert!(apply_line_effects("# comment", &mut variables).is_empty());
        assert_eq!(variables, before);
    }
}
