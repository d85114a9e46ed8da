//! AST dump (`--dump-ast`) nodes.
//!
//! The AST schema tracks the compiler's parser and changes with it, so nodes
//! stay an untyped JSON tree keyed by `kind`. Expression nodes carry an
//! inferred `ty` once type checking has run; under `--parse-only` it is
//! missing or `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the AST dump, usually a `module` at the top level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AstNode(Value);

/// A node reached by [`AstNode::walk`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisitedNode<'a> {
    /// Dotted path from the walk root, e.g. `items[0].body.stmts[1]`.
    pub path: String,
    pub kind: &'a str,
    pub value: &'a Value,
}

impl AstNode {
    pub fn new(value: Value) -> Self {
        AstNode(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `kind` discriminator, if this node has one.
    pub fn kind(&self) -> Option<&str> {
        kind_of(&self.0)
    }

    /// The inferred type string. `None` when absent or `null`.
    pub fn ty(&self) -> Option<&str> {
        self.0.get("ty").and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Depth-first, pre-order walk over every nested object carrying a
    /// `kind`. Object keys are visited in the map's iteration order, array
    /// elements in emission order.
    pub fn walk(&self) -> Vec<VisitedNode<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &Value)> = vec![(String::new(), &self.0)];

        while let Some((path, value)) = stack.pop() {
            match value {
                Value::Object(map) => {
                    if let Some(kind) = kind_of(value) {
                        out.push(VisitedNode {
                            path: path.clone(),
                            kind,
                            value,
                        });
                    }
                    // Push in reverse so the first key is visited first.
                    for (key, child) in map.iter().rev() {
                        let child_path = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        stack.push((child_path, child));
                    }
                }
                Value::Array(items) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        stack.push((format!("{path}[{i}]"), child));
                    }
                }
                _ => {}
            }
        }

        out
    }

    /// Whether any node in the tree carries an inferred type.
    pub fn is_type_checked(&self) -> bool {
        self.walk()
            .iter()
            .any(|node| node.value.get("ty").is_some_and(Value::is_string))
    }
}

/// The `kind` discriminator of a JSON node, if it is an object with one.
pub fn kind_of(value: &Value) -> Option<&str> {
    value.get("kind").and_then(Value::as_str)
}
