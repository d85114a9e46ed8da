//! Typed IR dump (`--dump-ir`).
//!
//! Every `kind`-discriminated variant of the dump is a closed enum, so an
//! unknown statement, value, operand, constant or terminator is a decode
//! error rather than something silently skipped. Optional fields follow the
//! crate-level schema-variant policy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// IR for one source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub path: String,
    #[serde(default)]
    pub functions: Vec<FunctionIr>,
}

impl CompiledUnit {
    /// Find a function by its source name.
    pub fn function(&self, original_name: &str) -> Option<&FunctionIr> {
        self.functions
            .iter()
            .find(|f| f.original_name == original_name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Definition,
    Declaration,
}

/// A function's control-flow graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionIr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FunctionKind>,
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mangled_name: Option<String>,
    /// Printed signature, e.g. `def main() -> i32`.
    #[serde(rename = "ty", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default)]
    pub locals: Vec<LocalSlot>,
    /// Blocks keyed by label, in the order the compiler discovered them.
    #[serde(default)]
    pub blocks: IndexMap<String, BasicBlock>,
}

impl FunctionIr {
    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.get(label)
    }

    /// The first block, where execution starts.
    pub fn entry(&self) -> Option<(&str, &BasicBlock)> {
        self.blocks
            .first()
            .map(|(label, block)| (label.as_str(), block))
    }

    pub fn local(&self, name: &str) -> Option<&LocalSlot> {
        self.locals.iter().find(|l| l.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSlot {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    #[serde(default)]
    pub statements: Vec<Statement>,
    pub terminator: Terminator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Assignment { location: Location, value: Value },
    Nop,
}

/// Right-hand side of an assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Use {
        operand: Operand,
    },
    Ref {
        location: Location,
    },
    Unary {
        #[serde(rename = "unary-kind", alias = "op")]
        op: String,
        operand: Operand,
    },
    Binary {
        #[serde(rename = "binary-kind", alias = "op")]
        op: String,
        left: Operand,
        right: Operand,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    Constant {
        #[serde(rename = "type")]
        ty: String,
        /// `None` is the bare `null` a void `return` carries. Serialized as
        /// `null` again, not skipped.
        #[serde(default)]
        value: Option<ConstValue>,
    },
    Copy {
        location: Location,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstValue {
    /// Kept as a JSON number so both signed and full-width unsigned
    /// literals survive.
    Int {
        value: Number,
    },
    Float {
        value: f64,
    },
    Bool {
        value: bool,
    },
    /// Code point of a character literal.
    Char {
        value: u32,
    },
    String {
        value: String,
    },
    Undefined,
    Null,
    Function {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declared_in: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Local {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp: Option<bool>,
        #[serde(default)]
        projections: Vec<Projection>,
    },
}

impl Location {
    pub fn name(&self) -> &str {
        match self {
            Location::Local { name, .. } => name,
        }
    }

    pub fn is_deref(&self) -> bool {
        match self {
            Location::Local { projections, .. } => projections.contains(&Projection::Deref),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Deref,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Terminator {
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operand: Option<Operand>,
    },
    Call {
        callee: Operand,
        #[serde(default)]
        args: Vec<Operand>,
        dest: Location,
        next: String,
    },
    Switch {
        condition: Operand,
        cases: Vec<SwitchCase>,
    },
    Jmp {
        target: String,
    },
    Nop,
}

impl Terminator {
    /// Labels of the blocks control may transfer to.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            Terminator::Return { .. } | Terminator::Nop => Vec::new(),
            Terminator::Call { next, .. } => vec![next.as_str()],
            Terminator::Switch { cases, .. } => cases.iter().map(|c| c.target.as_str()).collect(),
            Terminator::Jmp { target } => vec![target.as_str()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Same width rules as [`ConstValue::Int`].
    pub value: Number,
    pub target: String,
}
