//! Read-only view of a parsed manuscript as handed over by the rendering pipeline.
//!
//! Checks never see raw source. They inspect a `ResolvedDocument`: frontmatter metadata, named
//! parts (abstract, availability statements, ...) and the body tree, with optional source
//! positions so results can point back at the offending node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed manuscript shared with checks behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDocument {
    #[serde(default)]
    pub frontmatter: Frontmatter,
    #[serde(default)]
    pub parts: BTreeMap<String, Node>,
    #[serde(default)]
    pub body: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub affiliations: Vec<String>,
    #[serde(default)]
    pub corresponding: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Root,
    Section,
    Heading,
    Paragraph,
    Text,
    Link,
    Math,
    InlineMath,
    Figure,
    Caption,
    Image,
    Citation,
    Code,
    List,
    ListItem,
}

/// Line/column span in the source file. Opaque to the engine; carried through to results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first, pre-order traversal including `self`.
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Concatenated text of every `text` descendant, joined by single spaces.
    pub fn plain_text(&self) -> String {
        self.walk()
            .into_iter()
            .filter(|node| node.kind == NodeKind::Text)
            .filter_map(|node| node.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }

    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        self.walk()
            .into_iter()
            .filter(|node| node.kind == kind)
            .collect()
    }
}

impl ResolvedDocument {
    /// Locate a named part. Explicit `parts` entries win over body sections labelled with the name.
    pub fn part(&self, name: &str) -> Option<&Node> {
        if let Some(part) = self.parts.get(name) {
            return Some(part);
        }

        self.body.walk().into_iter().find(|node| {
            node.kind == NodeKind::Section
                && node
                    .label
                    .as_deref()
                    .map(|label| label.eq_ignore_ascii_case(name))
                    .unwrap_or(false)
        })
    }

    /// Every node of `kind` across the parts and the body.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        self.parts
            .values()
            .chain(std::iter::once(&self.body))
            .flat_map(|node| node.find_all(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(label: &str, text: &str) -> Node {
        Node {
            kind: NodeKind::Section,
            label: Some(label.to_string()),
            ..Node::default()
        }
        .with_children(vec![
            Node::new(NodeKind::Paragraph).with_children(vec![Node::text(text)])
        ])
    }

    #[test]
    fn part_falls_back_to_labelled_body_section() {
        let document = ResolvedDocument {
            body: Node::new(NodeKind::Root).with_children(vec![section(
                "Abstract",
                "We study things.",
            )]),
            ..ResolvedDocument::default()
        };

        let part = document.part("abstract").expect("section located by label");
        assert_eq!(part.plain_text(), "We study things.");
        assert!(document.part("availability").is_none());
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = Node::new(NodeKind::Root).with_children(vec![
            Node::new(NodeKind::Paragraph).with_children(vec![Node::text("a")]),
            Node::text("b"),
        ]);

        let kinds: Vec<NodeKind> = tree.walk().iter().map(|node| node.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Root,
                NodeKind::Paragraph,
                NodeKind::Text,
                NodeKind::Text
            ]
        );
        assert_eq!(tree.word_count(), 2);
    }
}
