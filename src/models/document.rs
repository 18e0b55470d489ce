//! Plain text to Atlassian Document Format (ADF) conversion.
//!
//! Descriptions and comments in Jira are ADF trees. This module builds the
//! small subset the tools write (headings, paragraphs, flat lists, rules)
//! from lightly marked-up text, and renders any ADF tree back to text.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("regex should compile"));

static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("regex should compile"));

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s").expect("regex should compile"));

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+)\*\*$").expect("regex should compile"));

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Heading { level: u8, text: String },
    Paragraph { text: String, bold: bool },
    OrderedList(Vec<String>),
    BulletList(Vec<String>),
    Rule,
    /// A node read back from Jira, kept verbatim.
    Embedded(Value),
}

impl DocumentNode {
    pub fn paragraph(text: impl Into<String>) -> Self {
        DocumentNode::Paragraph {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        DocumentNode::Paragraph {
            text: text.into(),
            bold: true,
        }
    }

    pub fn empty() -> Self {
        Self::paragraph("")
    }

    pub fn to_adf(&self) -> Value {
        match self {
            DocumentNode::Heading { level, text } => json!({
                "type": "heading",
                "attrs": { "level": level },
                "content": [text_node(text, false)],
            }),
            DocumentNode::Paragraph { text, .. } if text.is_empty() => json!({
                "type": "paragraph",
                "content": [],
            }),
            DocumentNode::Paragraph { text, bold } => json!({
                "type": "paragraph",
                "content": [text_node(text, *bold)],
            }),
            DocumentNode::OrderedList(items) => list_node("orderedList", items),
            DocumentNode::BulletList(items) => list_node("bulletList", items),
            DocumentNode::Rule => json!({ "type": "rule" }),
            DocumentNode::Embedded(raw) => raw.clone(),
        }
    }
}

fn text_node(text: &str, bold: bool) -> Value {
    if bold {
        json!({ "type": "text", "text": text, "marks": [{ "type": "strong" }] })
    } else {
        json!({ "type": "text", "text": text })
    }
}

fn list_node(kind: &str, items: &[String]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "type": "listItem",
                "content": [{ "type": "paragraph", "content": [text_node(item, false)] }],
            })
        })
        .collect();
    json!({ "type": kind, "content": items })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub nodes: Vec<DocumentNode>,
}

/// How a single trimmed line reads.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Blank,
    Heading(u8, &'a str),
    Ordered(&'a str),
    Bullet(&'a str),
    Bold(&'a str),
    Plain(&'a str),
}

type LineRule = for<'a> fn(&'a str) -> Option<Line<'a>>;

/// Evaluated top to bottom; the first rule that matches wins.
const LINE_RULES: &[LineRule] = &[
    |line| line.is_empty().then_some(Line::Blank),
    |line| {
        HEADING_RE.captures(line).map(|caps| {
            let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
            let text = caps.get(2).map_or("", |m| m.as_str());
            Line::Heading(level, text)
        })
    },
    |line| {
        ORDERED_RE
            .find(line)
            .map(|m| Line::Ordered(line[m.end()..].trim_start()))
    },
    |line| {
        BULLET_RE
            .find(line)
            .map(|m| Line::Bullet(line[m.end()..].trim_start()))
    },
    |line| {
        BOLD_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| Line::Bold(m.as_str()))
    },
];

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    LINE_RULES
        .iter()
        .find_map(|rule| rule(line))
        .unwrap_or(Line::Plain(line))
}

impl Document {
    pub fn new(nodes: Vec<DocumentNode>) -> Self {
        Self { nodes }
    }

    /// Converts lightly marked-up text into a document.
    ///
    /// Consecutive list lines of the same kind are grouped into one list;
    /// a line of any other kind, including a list of the other kind, ends
    /// the group. Blank lines never produce a node.
    pub fn format(text: &str) -> Self {
        let lines: Vec<Line<'_>> = text.lines().map(classify).collect();
        let mut nodes = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            match lines[i] {
                Line::Blank => i += 1,
                Line::Heading(level, text) => {
                    nodes.push(DocumentNode::Heading {
                        level,
                        text: text.to_string(),
                    });
                    i += 1;
                }
                Line::Ordered(_) => {
                    let mut items = Vec::new();
                    while let Some(Line::Ordered(item)) = lines.get(i) {
                        items.push(item.to_string());
                        i += 1;
                    }
                    nodes.push(DocumentNode::OrderedList(items));
                }
                Line::Bullet(_) => {
                    let mut items = Vec::new();
                    while let Some(Line::Bullet(item)) = lines.get(i) {
                        items.push(item.to_string());
                        i += 1;
                    }
                    nodes.push(DocumentNode::BulletList(items));
                }
                Line::Bold(text) => {
                    nodes.push(DocumentNode::bold(text));
                    i += 1;
                }
                Line::Plain(text) => {
                    nodes.push(DocumentNode::paragraph(text));
                    i += 1;
                }
            }
        }

        Self { nodes }
    }

    /// Fixed description layout for new tickets.
    pub fn two_section(current: &str, desired: &str) -> Self {
        Self::new(vec![
            DocumentNode::bold("Current"),
            DocumentNode::paragraph(current),
            DocumentNode::empty(),
            DocumentNode::bold("Desired"),
            DocumentNode::paragraph(desired),
        ])
    }

    /// Returns a new document: this one, a separator, then `text` formatted.
    pub fn append(&self, text: &str) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.extend([
            DocumentNode::empty(),
            DocumentNode::Rule,
            DocumentNode::empty(),
        ]);
        nodes.extend(Self::format(text).nodes);
        Self { nodes }
    }

    pub fn to_adf(&self) -> Value {
        json!({
            "type": "doc",
            "version": 1,
            "content": self.nodes.iter().map(DocumentNode::to_adf).collect::<Vec<_>>(),
        })
    }

    /// Wraps the top-level nodes of a remote document. Anything that is not
    /// a `doc` yields an empty document.
    pub fn from_adf(value: &Value) -> Self {
        let nodes = value
            .get("content")
            .and_then(Value::as_array)
            .map(|content| content.iter().cloned().map(DocumentNode::Embedded).collect())
            .unwrap_or_default();
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Renders an ADF tree as readable text.
pub fn render_plain(value: &Value) -> String {
    let mut out = String::new();
    render_block(value, &mut out);
    out.trim_end().to_string()
}

fn render_block(node: &Value, out: &mut String) {
    match node_type(node) {
        "doc" => children(node).for_each(|child| render_block(child, out)),
        "paragraph" => {
            out.push_str(&render_inline(node));
            out.push('\n');
        }
        "heading" => {
            let level = node
                .pointer("/attrs/level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&render_inline(node));
            out.push('\n');
        }
        "bulletList" => {
            for item in children(node) {
                out.push_str("- ");
                out.push_str(&render_list_item(item));
                out.push('\n');
            }
        }
        "orderedList" => {
            let start = node
                .pointer("/attrs/order")
                .and_then(Value::as_u64)
                .unwrap_or(1);
            for (n, item) in children(node).enumerate() {
                out.push_str(&format!("{}. ", start + n as u64));
                out.push_str(&render_list_item(item));
                out.push('\n');
            }
        }
        "rule" => out.push_str("---\n"),
        "codeBlock" => {
            out.push_str("```\n");
            out.push_str(&render_inline(node));
            out.push_str("\n```\n");
        }
        "text" | "hardBreak" | "mention" | "emoji" | "inlineCard" => {
            out.push_str(&render_inline_node(node));
        }
        _ => children(node).for_each(|child| render_block(child, out)),
    }
}

fn render_list_item(item: &Value) -> String {
    let mut text = String::new();
    render_block(item, &mut text);
    text.trim_end().replace('\n', "\n  ")
}

fn render_inline(node: &Value) -> String {
    children(node).map(render_inline_node).collect()
}

fn render_inline_node(node: &Value) -> String {
    match node_type(node) {
        "text" => node
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        "hardBreak" => "\n".to_string(),
        "mention" | "emoji" => node
            .pointer("/attrs/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        "inlineCard" => node
            .pointer("/attrs/url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => render_inline(node),
    }
}

fn node_type(node: &Value) -> &str {
    node.get("type").and_then(Value::as_str).unwrap_or_default()
}

fn children(node: &Value) -> impl Iterator<Item = &Value> {
    node.get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}
