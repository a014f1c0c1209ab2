//! Import statements.

use tree_sitter::Node;

use super::edit::Edit;
use super::parser::{named_children, string_literal_value, SourceFile};

/// One name brought in by a named import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// Exported name in the source module.
    pub name: String,
    /// Local binding (the alias, or the name itself).
    pub local: String,
}

/// A top-level `import` statement.
#[derive(Debug, Clone)]
pub struct ImportStatement<'t> {
    pub node: Node<'t>,
    /// Module specifier without quotes.
    pub module: String,
    /// Quote character used for the specifier.
    pub quote: char,
    pub named: Vec<ImportedName>,
    /// The `{ ... }` clause, when present.
    pub named_clause: Option<Node<'t>>,
    /// `import type { ... }`: the names only exist as types.
    pub type_only: bool,
}

/// All top-level import statements, in document order.
pub fn import_statements(file: &SourceFile) -> Vec<ImportStatement<'_>> {
    named_children(file.root())
        .into_iter()
        .filter(|node| node.kind() == "import_statement")
        .filter_map(|node| {
            let source = node.child_by_field_name("source")?;
            let raw = file.node_text(source);
            let quote = raw.chars().next().unwrap_or('\'');

            let named_clause = named_children(node)
                .into_iter()
                .filter(|child| child.kind() == "import_clause")
                .flat_map(named_children)
                .find(|child| child.kind() == "named_imports");

            let named = named_clause
                .map(|clause| {
                    named_children(clause)
                        .into_iter()
                        .filter(|spec| spec.kind() == "import_specifier")
                        .filter_map(|spec| {
                            let name = file.node_text(spec.child_by_field_name("name")?).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|alias| file.node_text(alias).to_string())
                                .unwrap_or_else(|| name.clone());
                            Some(ImportedName { name, local })
                        })
                        .collect()
                })
                .unwrap_or_default();

            let mut cursor = node.walk();
            let type_only = node.children(&mut cursor).any(|child| child.kind() == "type");

            Some(ImportStatement {
                node,
                module: string_literal_value(raw).to_string(),
                quote,
                named,
                named_clause,
                type_only,
            })
        })
        .collect()
}

/// Whether `symbol` is imported by name from `module` as a value.
pub fn is_imported(file: &SourceFile, symbol: &str, module: &str) -> bool {
    import_statements(file).iter().any(|stmt| {
        stmt.module == module && !stmt.type_only && stmt.named.iter().any(|n| n.name == symbol)
    })
}

/// Module a local binding was imported from.
pub fn module_of_local(file: &SourceFile, local: &str) -> Option<String> {
    import_statements(file)
        .into_iter()
        .find(|stmt| stmt.named.iter().any(|n| n.local == local))
        .map(|stmt| stmt.module)
}

/// Edit importing `symbol` from `module`, or `None` if it already is.
///
/// An existing value import from the same module is extended; otherwise a
/// new statement goes after the last import, matching its quote style.
pub fn add_import(file: &SourceFile, symbol: &str, module: &str) -> Option<Edit> {
    if is_imported(file, symbol, module) {
        return None;
    }

    let statements = import_statements(file);
    let existing_clause = statements
        .iter()
        .filter(|stmt| stmt.module == module && !stmt.type_only)
        .find_map(|stmt| stmt.named_clause);
    if let Some(clause) = existing_clause {
        let specifiers: Vec<Node<'_>> = named_children(clause)
            .into_iter()
            .filter(|spec| spec.kind() == "import_specifier")
            .collect();
        return Some(match specifiers.last() {
            Some(last) => Edit::insert(last.end_byte(), format!(", {}", symbol)),
            None => Edit::insert(clause.start_byte() + 1, format!(" {} ", symbol)),
        });
    }

    let newline = file.newline();
    match statements.last() {
        Some(last) => {
            let terminator = if file.node_text(last.node).trim_end().ends_with(';') {
                ";"
            } else {
                ""
            };
            Some(Edit::insert(
                last.node.end_byte(),
                format!(
                    "{nl}import {{ {symbol} }} from {q}{module}{q}{terminator}",
                    nl = newline,
                    q = last.quote,
                ),
            ))
        }
        None => {
            let separator = if file.text().is_empty() || file.text().starts_with(newline) {
                newline.to_string()
            } else {
                format!("{0}{0}", newline)
            };
            Some(Edit::insert(
                0,
                format!("import {{ {symbol} }} from '{module}';{separator}"),
            ))
        }
    }
}
