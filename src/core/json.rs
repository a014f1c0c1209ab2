//! Order-preserving JSON documents.
//!
//! Workspace and package manifests are edited as text. Values are read
//! through `serde_json`; the member being changed is located with the
//! tree-sitter JSON grammar and spliced into the original text, so
//! formatting, number spelling and comments everywhere else stay
//! byte-identical.

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tree_sitter::Node;

use super::error::TransformError;
use crate::source::edit::{apply_edits, indent_continuation_lines, Edit};
use crate::source::parser::{descendants_of_kind, named_children, SourceFile};

/// Default indentation for documents that carry no nesting to detect from.
pub const DEFAULT_INDENT: &str = "  ";

/// Where a new member goes in an existing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// After the last member.
    Last,
    /// Before the first member whose key sorts after the new one.
    Sorted,
}

/// A JSON object read from a tree file.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    path: String,
    text: String,
    root: Map<String, Value>,
    indent: String,
}

impl JsonDocument {
    /// Parse `text` as a JSON object. Comments are allowed.
    pub fn parse(path: &str, text: &str) -> Result<Self, TransformError> {
        Ok(JsonDocument {
            path: path.to_string(),
            text: text.to_string(),
            root: read_object(path, text)?,
            indent: detect_indent(text),
        })
    }

    /// Tree path the document was read from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The top-level object.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Current text of the document.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the member at `path`, creating missing objects on the way.
    ///
    /// `placement` applies when the last key is new to an existing object;
    /// created parents always go last. Returns whether the text changed.
    pub fn set(&mut self, path: &[&str], value: Value, placement: Placement) -> Result<bool> {
        let edits = self.edits_for(path, value, placement)?;
        if edits.is_empty() {
            return Ok(false);
        }

        let text = apply_edits(&self.text, &edits)?;
        self.root = read_object(&self.path, &text)?;
        self.text = text;
        Ok(true)
    }

    fn edits_for(&self, path: &[&str], value: Value, placement: Placement) -> Result<Vec<Edit>> {
        let Some((last, parents)) = path.split_last() else {
            bail!("cannot replace the whole of {}", self.path);
        };

        let file = SourceFile::parse_json(&self.path, self.text.as_str())?;
        let mut object = named_children(file.root())
            .into_iter()
            .find(|node| node.kind() == "object")
            .ok_or_else(|| anyhow!("{} has no top-level object", self.path))?;

        for (depth, key) in parents.iter().enumerate() {
            let nested = || nest(&path[depth + 1..], value.clone());
            match member(&file, object, key) {
                Some(pair) => match pair.child_by_field_name("value") {
                    Some(inner) if inner.kind() == "object" => object = inner,
                    Some(inner) => return self.replace_value(&file, pair, inner, &nested()),
                    None => bail!("`{}` in {} has no value", key, self.path),
                },
                None => return self.insert_member(&file, object, key, &nested(), Placement::Last),
            }
        }

        match member(&file, object, last) {
            Some(pair) => {
                let inner = pair
                    .child_by_field_name("value")
                    .ok_or_else(|| anyhow!("`{}` in {} has no value", last, self.path))?;
                self.replace_value(&file, pair, inner, &value)
            }
            None => self.insert_member(&file, object, last, &value, placement),
        }
    }

    fn replace_value(&self, file: &SourceFile, pair: Node<'_>, old: Node<'_>, value: &Value) -> Result<Vec<Edit>> {
        let current: Option<Value> = serde_json::from_str(file.node_text(old)).ok();
        if current.as_ref() == Some(value) {
            return Ok(Vec::new());
        }

        let rendered = self.render(value, file.line_indent(pair.start_byte()), file.newline())?;
        Ok(vec![Edit::replace(old.start_byte(), old.end_byte(), rendered)])
    }

    fn insert_member(
        &self,
        file: &SourceFile,
        object: Node<'_>,
        key: &str,
        value: &Value,
        placement: Placement,
    ) -> Result<Vec<Edit>> {
        let newline = file.newline();
        let encoded = serde_json::to_string(key)?;
        let pairs: Vec<Node<'_>> = named_children(object)
            .into_iter()
            .filter(|node| node.kind() == "pair")
            .collect();

        let Some(&last) = pairs.last() else {
            let outer = file.line_indent(object.start_byte());
            let indent = format!("{}{}", outer, self.indent);
            let entry = format!("{}: {}", encoded, self.render(value, &indent, newline)?);
            let (open, close) = (object.start_byte() + 1, object.end_byte() - 1);

            return Ok(if file.text()[open..close].trim().is_empty() {
                vec![Edit::replace(
                    open,
                    close,
                    format!("{nl}{}{}{nl}{}", indent, entry, outer, nl = newline),
                )]
            } else {
                // Comments only: the member goes first, the comments stay.
                let mut edits = vec![Edit::insert(open, format!("{}{}{}", newline, indent, entry))];
                if !file.text()[open..close].contains('\n') {
                    edits.push(Edit::insert(close, format!("{}{}", newline, outer)));
                }
                edits
            });
        };

        let anchor = match placement {
            Placement::Sorted => pairs
                .iter()
                .copied()
                .find(|pair| pair_key(file, *pair).is_some_and(|existing| existing.as_str() > key)),
            Placement::Last => None,
        };

        if let Some(anchor) = anchor {
            let indent = file.line_indent(anchor.start_byte());
            let entry = format!("{}: {}", encoded, self.render(value, indent, newline)?);
            let text = if file.starts_line(anchor) {
                format!("{},{}{}", entry, newline, indent)
            } else {
                format!("{}, ", entry)
            };
            return Ok(vec![Edit::insert(anchor.start_byte(), text)]);
        }

        let indent = file.line_indent(last.start_byte());
        let entry = format!("{}: {}", encoded, self.render(value, indent, newline)?);
        if !file.starts_line(last) {
            return Ok(vec![Edit::insert(last.end_byte(), format!(", {}", entry))]);
        }

        let end = last.end_byte();
        let tail_end = file.skip_trailing_comment(end);
        Ok(vec![
            Edit::insert(end, ","),
            Edit::insert(tail_end, format!("{}{}{}", newline, indent, entry)),
        ])
    }

    /// Serialize `value` for a member whose line starts with `member_indent`.
    fn render(&self, value: &Value, member_indent: &str, newline: &str) -> Result<String> {
        let text = to_string_with_indent(value, &self.indent)?;
        Ok(indent_continuation_lines(&text, member_indent, newline))
    }
}

/// Parse the top-level object, ignoring comments.
fn read_object(path: &str, text: &str) -> Result<Map<String, Value>, TransformError> {
    let invalid = |message: String| TransformError::InvalidJson {
        path: path.to_string(),
        message,
    };

    let file = SourceFile::parse_json(path, text).map_err(|e| invalid(format!("{:#}", e)))?;
    let value: Value = serde_json::from_str(&blank_comments(&file)).map_err(|e| invalid(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!(
            "expected an object at the top level, found {}",
            kind_of(&other)
        ))),
    }
}

/// The text with every comment replaced by spaces. Line breaks inside
/// block comments are kept so positions in parse errors stay right.
fn blank_comments(file: &SourceFile) -> String {
    let mut text = file.text().to_string();
    for comment in descendants_of_kind(file.root(), "comment").into_iter().rev() {
        let blank: String = file
            .node_text(comment)
            .chars()
            .map(|c| if c == '\n' || c == '\r' { c } else { ' ' })
            .collect();
        text.replace_range(comment.byte_range(), &blank);
    }
    text
}

/// Wrap `value` in one object per key, outermost first.
fn nest(keys: &[&str], value: Value) -> Value {
    keys.iter().rev().fold(value, |inner, key| {
        let mut map = Map::new();
        map.insert(key.to_string(), inner);
        Value::Object(map)
    })
}

/// The pair of `object` with the given key.
fn member<'t>(file: &SourceFile, object: Node<'t>, key: &str) -> Option<Node<'t>> {
    named_children(object)
        .into_iter()
        .filter(|node| node.kind() == "pair")
        .find(|pair| pair_key(file, *pair).as_deref() == Some(key))
}

fn pair_key(file: &SourceFile, pair: Node<'_>) -> Option<String> {
    serde_json::from_str(file.node_text(pair.child_by_field_name("key")?)).ok()
}

/// Pretty-print any serializable value with a custom indentation unit.
pub fn to_string_with_indent<T: Serialize + ?Sized>(value: &T, indent: &str) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Detect the indentation unit of a JSON text.
///
/// The first line that starts with whitespace followed by content gives
/// the unit, since the first nested line sits exactly one level deep.
pub fn detect_indent(text: &str) -> String {
    for line in text.lines() {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() || content.len() == line.len() {
            continue;
        }
        return line[..line.len() - content.len()].to_string();
    }
    DEFAULT_INDENT.to_string()
}

/// Look up a nested object, failing softly.
pub fn object_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(text: &str, path: &[&str], value: Value, placement: Placement) -> String {
        let mut doc = JsonDocument::parse("x.json", text).unwrap();
        doc.set(path, value, placement).unwrap();
        doc.text().to_string()
    }

    #[test]
    fn test_detect_indent() {
        assert_eq!(detect_indent("{\n  \"a\": 1\n}"), "  ");
        assert_eq!(detect_indent("{\n    \"a\": {\n        \"b\": 1\n    }\n}"), "    ");
        assert_eq!(detect_indent("{\n\t\"a\": 1\n}"), "\t");
        assert_eq!(detect_indent("{\"a\":1}"), DEFAULT_INDENT);
    }

    #[test]
    fn test_append_member_keeps_other_text() {
        let text = "{\n  \"styles\": [\"src/styles.css\"],\n  \"budget\": 1.50,\n  \"options\": {\n    \"main\": \"src/main.ts\"\n  }\n}\n";
        assert_eq!(
            set(text, &["options", "serviceWorker"], json!(true), Placement::Last),
            "{\n  \"styles\": [\"src/styles.css\"],\n  \"budget\": 1.50,\n  \"options\": {\n    \"main\": \"src/main.ts\",\n    \"serviceWorker\": true\n  }\n}\n"
        );
    }

    #[test]
    fn test_comments_are_accepted_and_kept() {
        let text = "{\n  // workspace\n  \"a\": 1, /* one */\n  \"b\": 2 // two\n}\n";
        let mut doc = JsonDocument::parse("x.json", text).unwrap();
        assert_eq!(doc.root()["b"], json!(2));

        assert!(doc.set(&["c"], json!("x"), Placement::Last).unwrap());
        assert_eq!(
            doc.text(),
            "{\n  // workspace\n  \"a\": 1, /* one */\n  \"b\": 2, // two\n  \"c\": \"x\"\n}\n"
        );
        assert_eq!(doc.root()["c"], json!("x"));
    }

    #[test]
    fn test_replace_existing_value() {
        let text = "{\n    \"a\": false,\n    \"b\": [1,2]\n}";
        assert_eq!(
            set(text, &["a"], json!(true), Placement::Last),
            "{\n    \"a\": true,\n    \"b\": [1,2]\n}"
        );
    }

    #[test]
    fn test_equal_value_is_not_rewritten() {
        let text = "{ \"a\": 1.50 }";
        let mut doc = JsonDocument::parse("x.json", text).unwrap();
        assert!(!doc.set(&["a"], json!(1.5), Placement::Last).unwrap());
        assert_eq!(doc.text(), text);
    }

    #[test]
    fn test_creates_missing_parents() {
        let text = "{\n  \"build\": {\n    \"builder\": \"x\"\n  }\n}\n";
        assert_eq!(
            set(text, &["build", "options", "serviceWorker"], json!(true), Placement::Last),
            "{\n  \"build\": {\n    \"builder\": \"x\",\n    \"options\": {\n      \"serviceWorker\": true\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_fills_empty_object() {
        assert_eq!(
            set("{\n  \"options\": {}\n}\n", &["options", "a"], json!(1), Placement::Last),
            "{\n  \"options\": {\n    \"a\": 1\n  }\n}\n"
        );
    }

    #[test]
    fn test_sorted_placement() {
        let text = "{\n  \"deps\": {\n    \"a\": \"1\",\n    \"c\": \"3\"\n  }\n}\n";
        assert_eq!(
            set(text, &["deps", "b"], json!("2"), Placement::Sorted),
            "{\n  \"deps\": {\n    \"a\": \"1\",\n    \"b\": \"2\",\n    \"c\": \"3\"\n  }\n}\n"
        );
        assert_eq!(
            set(text, &["deps", "d"], json!("4"), Placement::Sorted),
            "{\n  \"deps\": {\n    \"a\": \"1\",\n    \"c\": \"3\",\n    \"d\": \"4\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_inline_object() {
        assert_eq!(
            set("{\"a\": {\"x\": 1}}", &["a", "y"], json!(2), Placement::Last),
            "{\"a\": {\"x\": 1, \"y\": 2}}"
        );
    }

    #[test]
    fn test_crlf_is_kept() {
        let text = "{\r\n  \"a\": 1\r\n}\r\n";
        assert_eq!(
            set(text, &["b"], json!({ "c": true }), Placement::Last),
            "{\r\n  \"a\": 1,\r\n  \"b\": {\r\n    \"c\": true\r\n  }\r\n}\r\n"
        );
    }

    #[test]
    fn test_rejects_non_object() {
        let err = JsonDocument::parse("x.json", "[1, 2]").unwrap_err();
        match err {
            TransformError::InvalidJson { path, message } => {
                assert_eq!(path, "x.json");
                assert!(message.contains("an array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            JsonDocument::parse("x.json", "{ not json"),
            Err(TransformError::InvalidJson { .. })
        ));
    }
}
