//! Typed IR diff.
//!
//! Walks units, functions, locals and blocks in order so a mismatch names
//! the block label and statement index it sits in. Block order is compared
//! as emitted. Statements and terminators are compared whole and rendered
//! back to JSON for the message.

use std::fmt;

use serde::Serialize;

use kantan_mi::{BasicBlock, CompiledUnit, FunctionIr, LocalSlot};

use super::Mismatch;

pub fn diff_ir(expected: &[CompiledUnit], actual: &[CompiledUnit]) -> Result<(), Mismatch> {
    if expected.len() != actual.len() {
        return Err(Mismatch::field("ir", "unit count", expected.len(), actual.len()));
    }
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        diff_unit(&format!("ir[{i}]"), e, a)?;
    }
    Ok(())
}

fn diff_unit(path: &str, expected: &CompiledUnit, actual: &CompiledUnit) -> Result<(), Mismatch> {
    if expected.path != actual.path {
        return Err(Mismatch::field(
            path,
            "path",
            quoted(&expected.path),
            quoted(&actual.path),
        ));
    }
    if expected.functions.len() != actual.functions.len() {
        return Err(Mismatch::field(
            path,
            "function count",
            expected.functions.len(),
            actual.functions.len(),
        ));
    }
    for (i, (e, a)) in expected.functions.iter().zip(&actual.functions).enumerate() {
        diff_function(&format!("{path}.functions[{i}]<{}>", e.original_name), e, a)?;
    }
    Ok(())
}

fn diff_function(path: &str, expected: &FunctionIr, actual: &FunctionIr) -> Result<(), Mismatch> {
    if expected.original_name != actual.original_name {
        return Err(Mismatch::field(
            path,
            "original_name",
            quoted(&expected.original_name),
            quoted(&actual.original_name),
        ));
    }
    diff_optional(path, "kind", expected.kind.as_ref(), actual.kind.as_ref())?;
    diff_optional(
        path,
        "mangled_name",
        expected.mangled_name.as_ref(),
        actual.mangled_name.as_ref(),
    )?;
    diff_optional(path, "ty", expected.signature.as_ref(), actual.signature.as_ref())?;

    if expected.locals.len() != actual.locals.len() {
        return Err(Mismatch::field(
            path,
            "local count",
            expected.locals.len(),
            actual.locals.len(),
        ));
    }
    for (i, (e, a)) in expected.locals.iter().zip(&actual.locals).enumerate() {
        diff_local(&format!("{path}.locals[{i}]"), e, a)?;
    }

    if expected.blocks.len() != actual.blocks.len() {
        return Err(Mismatch::field(
            path,
            "block count",
            expected.blocks.len(),
            actual.blocks.len(),
        ));
    }
    for (i, ((e_label, e), (a_label, a))) in expected.blocks.iter().zip(&actual.blocks).enumerate() {
        let here = format!("{path}.blocks[{i}]");
        if e_label != a_label {
            return Err(Mismatch::field(here, "label", quoted(e_label), quoted(a_label)));
        }
        diff_block(&format!("{path}.blocks[{i}]<{e_label}>"), e, a)?;
    }
    Ok(())
}

fn diff_local(path: &str, expected: &LocalSlot, actual: &LocalSlot) -> Result<(), Mismatch> {
    if expected.name != actual.name {
        return Err(Mismatch::field(path, "name", quoted(&expected.name), quoted(&actual.name)));
    }
    if expected.ty != actual.ty {
        return Err(Mismatch::field(path, "type", quoted(&expected.ty), quoted(&actual.ty)));
    }
    diff_optional(path, "temp", expected.temp.as_ref(), actual.temp.as_ref())
}

fn diff_block(path: &str, expected: &BasicBlock, actual: &BasicBlock) -> Result<(), Mismatch> {
    for (i, (e, a)) in expected.statements.iter().zip(&actual.statements).enumerate() {
        if e != a {
            return Err(Mismatch::new(
                format!("{path}.statements[{i}]"),
                render(e),
                render(a),
            ));
        }
    }
    if expected.statements.len() != actual.statements.len() {
        return Err(Mismatch::field(
            path,
            "statement count",
            expected.statements.len(),
            actual.statements.len(),
        ));
    }
    if expected.terminator != actual.terminator {
        return Err(Mismatch::new(
            format!("{path}.terminator"),
            render(&expected.terminator),
            render(&actual.terminator),
        ));
    }
    Ok(())
}

fn diff_optional<T: PartialEq + fmt::Debug>(
    path: &str,
    field: &str,
    expected: Option<&T>,
    actual: Option<&T>,
) -> Result<(), Mismatch> {
    if expected == actual {
        return Ok(());
    }
    let show = |value: Option<&T>| value.map_or_else(|| "nothing".to_string(), |v| format!("{v:?}"));
    Err(Mismatch::field(path, field, show(expected), show(actual)))
}

fn quoted(text: &str) -> String {
    format!("{text:?}")
}

fn render<T: Serialize + fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
