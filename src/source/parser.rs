//! Source parsing.
//!
//! TypeScript and JSON files are parsed with tree-sitter. Nodes are only used to locate
//! byte offsets; edits are applied to the original text so everything the
//! transformation does not touch stays byte-identical.

use anyhow::{anyhow, Context, Result};
use tree_sitter::{Language, Node, Parser, Tree as SyntaxTree};

use crate::core::error::{SourceSnippet, TransformError};

/// A parsed source file.
pub struct SourceFile {
    path: String,
    text: String,
    syntax: SyntaxTree,
}

impl SourceFile {
    /// Parse `text` as TypeScript.
    ///
    /// Syntax errors do not fail the parse: tree-sitter recovers and the
    /// callers decide whether the nodes they need are still there.
    pub fn parse(path: &str, text: impl Into<String>) -> Result<Self> {
        let file = Self::parse_with(
            path,
            text.into(),
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            "TypeScript",
        )?;

        if file.root().has_error() {
            tracing::warn!("{} contains syntax errors; continuing with a partial parse", path);
        }

        Ok(file)
    }

    /// Parse `text` as JSON. `//` and `/* */` comments are accepted.
    pub fn parse_json(path: &str, text: impl Into<String>) -> Result<Self> {
        Self::parse_with(path, text.into(), tree_sitter_json::LANGUAGE.into(), "JSON")
    }

    fn parse_with(path: &str, text: String, language: Language, grammar: &str) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .with_context(|| format!("failed to load the {} grammar", grammar))?;

        let syntax = parser
            .parse(&text, None)
            .ok_or_else(|| anyhow!("failed to parse {}", path))?;

        Ok(SourceFile {
            path: path.to_string(),
            text,
            syntax,
        })
    }

    /// Tree path of the file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root `program` node.
    pub fn root(&self) -> Node<'_> {
        self.syntax.root_node()
    }

    /// Source text covered by a node.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.byte_range()]
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map(|idx| idx + 1).unwrap_or(0)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = &self.text[start..];
        let content = line.trim_start_matches([' ', '\t']);
        &line[..line.len() - content.len()]
    }

    /// Whether only whitespace precedes `node` on its line.
    pub fn starts_line(&self, node: Node<'_>) -> bool {
        let start = self.line_start(node.start_byte());
        self.text[start..node.start_byte()]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// End of the line holding `offset` when nothing but a comment follows
    /// `offset` on that line, otherwise `offset` itself.
    pub fn skip_trailing_comment(&self, offset: usize) -> usize {
        let end_of_line = self.text[offset..]
            .find(['\r', '\n'])
            .map_or(self.text.len(), |idx| offset + idx);
        let rest = self.text[offset..end_of_line].trim();

        if rest.starts_with("//") || (rest.starts_with("/*") && rest.ends_with("*/")) {
            end_of_line
        } else {
            offset
        }
    }

    /// A malformed source error pointing at `node`.
    pub fn malformed(&self, node: Node<'_>, reason: impl Into<String>) -> TransformError {
        TransformError::MalformedSource {
            path: self.path.clone(),
            reason: reason.into(),
            snippet: Some(SourceSnippet {
                text: self.text.clone(),
                offset: node.start_byte(),
                length: node.end_byte() - node.start_byte(),
            }),
        }
    }

    /// Line terminator used by the file.
    pub fn newline(&self) -> &'static str {
        if self.text.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }
}

/// All descendants of `node` (including itself) with the given kind, in
/// document order.
pub fn descendants_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    collect_kind(node, kind, &mut found);
    found
}

fn collect_kind<'t>(node: Node<'t>, kind: &str, found: &mut Vec<Node<'t>>) {
    if node.kind() == kind {
        found.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_kind(child, kind, found);
    }
}

/// Named children of `node`, skipping comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

/// Comments directly inside `node`.
pub fn comments<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let found: Vec<Node<'t>> = node
        .children(&mut cursor)
        .filter(|child| child.kind() == "comment")
        .collect();
    found
}

/// Value of a string literal node, without its quotes.
pub fn string_literal_value(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}
