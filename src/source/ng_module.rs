//! `@NgModule` metadata and application bootstrap lookup.

use tree_sitter::Node;

use super::edit::{indent_continuation_lines, indent_lines, Edit};
use super::imports::module_of_local;
use super::parser::{comments, descendants_of_kind, named_children, string_literal_value, SourceFile};
use crate::core::error::TransformError;

/// Indentation used when the file gives nothing to detect from.
const FALLBACK_INDENT: &str = "  ";

/// The `imports` array of the module's `@NgModule` metadata.
#[derive(Debug, Clone)]
pub struct ModuleImports<'t> {
    /// The `imports: [...]` pair.
    pub property: Node<'t>,
    /// The array literal.
    pub array: Node<'t>,
    /// Array elements, comments excluded.
    pub elements: Vec<Node<'t>>,
}

/// Locate the `imports` array of the single `@NgModule({...})` in a file.
pub fn find_module_imports(file: &SourceFile) -> Result<ModuleImports<'_>, TransformError> {
    let decorators: Vec<Node<'_>> = descendants_of_kind(file.root(), "decorator")
        .into_iter()
        .filter_map(|decorator| decorator_call(file, decorator, "NgModule"))
        .collect();

    let call = match decorators.as_slice() {
        [call] => *call,
        [] => return Err(TransformError::malformed(file.path(), "no @NgModule decorator found")),
        [_, second, ..] => {
            return Err(file.malformed(
                *second,
                format!("found {} @NgModule decorators, expected exactly one", decorators.len()),
            ))
        }
    };

    let metadata = call
        .child_by_field_name("arguments")
        .and_then(|args| named_children(args).into_iter().next())
        .filter(|arg| arg.kind() == "object")
        .ok_or_else(|| file.malformed(call, "@NgModule() has no metadata object"))?;

    let property = named_children(metadata)
        .into_iter()
        .filter(|member| member.kind() == "pair")
        .find(|pair| {
            pair.child_by_field_name("key")
                .map(|key| string_literal_value_or_ident(file.node_text(key)) == "imports")
                .unwrap_or(false)
        })
        .ok_or_else(|| file.malformed(metadata, "@NgModule metadata has no `imports` list"))?;

    let array = match property.child_by_field_name("value") {
        Some(value) if value.kind() == "array" => value,
        other => {
            return Err(file.malformed(
                other.unwrap_or(property),
                "`imports` of @NgModule is not an array literal",
            ))
        }
    };

    tracing::debug!(
        "found @NgModule imports in {} at line {}",
        file.path(),
        array.start_position().row + 1
    );

    Ok(ModuleImports {
        property,
        array,
        elements: named_children(array),
    })
}

/// Returns the call expression of `@<name>(...)`, if `decorator` is one.
fn decorator_call<'t>(file: &SourceFile, decorator: Node<'t>, name: &str) -> Option<Node<'t>> {
    let call = named_children(decorator)
        .into_iter()
        .find(|child| child.kind() == "call_expression")?;
    let function = call.child_by_field_name("function")?;
    let callee = match function.kind() {
        "member_expression" => file.node_text(function.child_by_field_name("property")?),
        _ => file.node_text(function),
    };
    (callee == name).then_some(call)
}

fn string_literal_value_or_ident(raw: &str) -> &str {
    if raw.starts_with(['\'', '"']) {
        string_literal_value(raw)
    } else {
        raw
    }
}

/// The identifier an element is built on: `Name`, `Name.forRoot()`,
/// `Name.register(...)` all give `Name`.
fn root_identifier<'f>(file: &'f SourceFile, node: Node<'_>) -> Option<&'f str> {
    match node.kind() {
        "identifier" => Some(file.node_text(node)),
        "call_expression" => root_identifier(file, node.child_by_field_name("function")?),
        "member_expression" => root_identifier(file, node.child_by_field_name("object")?),
        _ => None,
    }
}

/// End of a comma following `offset` on the same line.
fn comma_after(file: &SourceFile, offset: usize) -> Option<usize> {
    let rest = &file.text()[offset..];
    let skipped = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    rest[skipped..].starts_with(',').then_some(offset + skipped + 1)
}

impl ModuleImports<'_> {
    /// Whether an element of the array is `name` or built on it.
    pub fn contains_element(&self, file: &SourceFile, name: &str) -> bool {
        self.elements
            .iter()
            .any(|element| root_identifier(file, *element) == Some(name))
    }

    /// Edit appending `expression` to the array.
    ///
    /// Every line of the expression is indented like the last existing
    /// element. An empty array is opened onto its own lines, one
    /// indentation unit deeper than the `imports` property.
    pub fn append(&self, file: &SourceFile, expression: &str) -> Edit {
        let newline = file.newline();

        match self.elements.last() {
            Some(last) if file.starts_line(*last) => {
                let element = indent_lines(expression, file.line_indent(last.start_byte()), newline);
                let end = last.end_byte();
                let (comma, tail_start) = match comma_after(file, end) {
                    Some(after) => ("", after),
                    None => (",", end),
                };

                let tail_end = file.skip_trailing_comment(tail_start);
                if tail_end == tail_start {
                    Edit::insert(end, format!(",{}{}", newline, element))
                } else {
                    // A trailing comment stays on the line of its element.
                    Edit::replace(
                        end,
                        tail_end,
                        format!("{}{}{}{}", comma, &file.text()[end..tail_end], newline, element),
                    )
                }
            }
            Some(last) => {
                let indent = file.line_indent(last.start_byte());
                Edit::insert(
                    last.end_byte(),
                    format!(", {}", indent_continuation_lines(expression, indent, newline)),
                )
            }
            None => {
                let base = file.line_indent(self.property.start_byte());
                let element_indent = format!("{}{}", base, self.indent_unit(file));
                let body = format!(
                    "{nl}{}{nl}{}",
                    indent_lines(expression, &element_indent, newline),
                    base,
                    nl = newline,
                );

                // Comments stay put; the element goes below the last one.
                let start = comments(self.array)
                    .last()
                    .map_or(self.array.start_byte() + 1, |comment| comment.end_byte());
                Edit::replace(start, self.array.end_byte() - 1, body)
            }
        }
    }

    /// Indentation unit of the metadata object: how much deeper the
    /// `imports` property sits than the line opening the object.
    fn indent_unit(&self, file: &SourceFile) -> String {
        let property_indent = file.line_indent(self.property.start_byte());
        let object_indent = self
            .property
            .parent()
            .map(|object| file.line_indent(object.start_byte()))
            .unwrap_or("");

        match property_indent.strip_prefix(object_indent) {
            Some(unit) if !unit.is_empty() && file.starts_line(self.property) => unit.to_string(),
            _ => FALLBACK_INDENT.to_string(),
        }
    }
}

/// The module passed to `bootstrapModule(...)` in an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapModule {
    /// Local name of the module class.
    pub symbol: String,
    /// Module specifier it is imported from.
    pub specifier: String,
}

/// Find the module bootstrapped by an entry point file.
pub fn find_bootstrap_module(file: &SourceFile) -> Result<BootstrapModule, TransformError> {
    let argument = descendants_of_kind(file.root(), "call_expression")
        .into_iter()
        .find_map(|call| {
            let function = call.child_by_field_name("function")?;
            if function.kind() != "member_expression" {
                return None;
            }
            let property = function.child_by_field_name("property")?;
            if file.node_text(property) != "bootstrapModule" {
                return None;
            }
            let argument = named_children(call.child_by_field_name("arguments")?)
                .into_iter()
                .next()?;
            (argument.kind() == "identifier").then_some(argument)
        })
        .ok_or_else(|| {
            TransformError::malformed(file.path(), "no `bootstrapModule(...)` call found")
        })?;

    let symbol = file.node_text(argument).to_string();
    let specifier = module_of_local(file, &symbol)
        .ok_or_else(|| file.malformed(argument, format!("`{}` is not imported", symbol)))?;

    Ok(BootstrapModule { symbol, specifier })
}
