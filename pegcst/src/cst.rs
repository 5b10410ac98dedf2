// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The concrete syntax tree.
//!
//! Nodes are immutable once built. Subtrees are shared through `Arc`, which is what lets the
//! packrat cache hand the same subtree to every place that reuses a memoized rule result.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::position::SourceLocation;
use crate::token::MatchedToken;

/// Leaf or branch content of a `CstNode`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// A consumed token and its text.
    Leaf { value: String },
    /// A rule and the nodes it produced, in source order.
    Branch { children: Vec<Arc<CstNode>> },
}

/// A node of the concrete syntax tree.
///
/// A leaf carries a value and never children; a branch carries children (possibly none) and
/// never a value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CstNode {
    name: &'static str,
    kind: NodeKind,
    loc: Option<SourceLocation>,
}

impl CstNode {
    /// Creates the leaf for a consumed token.
    pub fn leaf(token: &MatchedToken) -> CstNode {
        CstNode {
            name: token.name,
            kind: NodeKind::Leaf {
                value: token.value.clone(),
            },
            loc: Some(token.loc()),
        }
    }

    /// Creates a branch, spanning from its first to its last located child.
    pub fn branch(name: &'static str, children: Vec<Arc<CstNode>>) -> CstNode {
        let first = children.iter().find_map(|child| child.loc);
        let last = children.iter().rev().find_map(|child| child.loc);
        let loc = match (first, last) {
            (Some(first), Some(last)) => Some(first.union(&last)),
            _ => None,
        };

        CstNode {
            name,
            kind: NodeKind::Branch { children },
            loc,
        }
    }

    /// Rule name for branches, token name for leaves.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// `None` for a branch that produced no tokens.
    #[inline]
    pub fn loc(&self) -> Option<SourceLocation> {
        self.loc
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// The token text of a leaf.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { value } => Some(value),
            NodeKind::Branch { .. } => None,
        }
    }

    /// The children of a branch; empty for leaves.
    #[inline]
    pub fn children(&self) -> &[Arc<CstNode>] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Branch { children } => children,
        }
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Arc<CstNode>> {
        self.children().iter().find(|child| child.name == name)
    }

    /// Depth-first, pre-order traversal starting with `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use pegcst::CstNode;
    /// let tree = CstNode::branch("pair", vec![
    ///     Arc::new(CstNode::branch("left", vec![])),
    ///     Arc::new(CstNode::branch("right", vec![])),
    /// ]);
    /// let names: Vec<_> = tree.descendants().map(|node| node.name()).collect();
    ///
    /// assert_eq!(names, ["pair", "left", "right"]);
    /// ```
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Leaves in source order.
    pub fn leaves(&self) -> impl Iterator<Item = &CstNode> {
        self.descendants().filter(|node| node.is_leaf())
    }

    /// Values of the leaves, in source order.
    pub fn leaf_values(&self) -> Vec<&str> {
        self.leaves().filter_map(|leaf| leaf.value()).collect()
    }

    /// Every node named `name`, in pre-order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CstNode> + 'a {
        self.descendants().filter(move |node| node.name == name)
    }

    /// Renders the tree as an s-expression: leaves as `(Name "value")`, branches as
    /// `(name child...)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use pegcst::CstNode;
    /// let tree = CstNode::branch("list", vec![Arc::new(CstNode::branch("items", vec![]))]);
    ///
    /// assert_eq!(tree.to_sexp(), "(list (items))");
    /// ```
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.name);
        match &self.kind {
            NodeKind::Leaf { value } => {
                out.push(' ');
                out.push_str(&format!("{:?}", value));
            }
            NodeKind::Branch { children } => {
                for child in children {
                    out.push(' ');
                    child.write_sexp(out);
                }
            }
        }
        out.push(')');
    }

    /// Pretty-printed JSON with `name`, `loc` and either `value` or `children`.
    pub fn to_json(&self) -> String {
        ::serde_json::to_string_pretty(self).expect("Failed to pretty-print CstNode to json.")
    }
}

impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sexp())
    }
}

impl Serialize for CstNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_struct("CstNode", 3)?;
        ser.serialize_field("name", self.name)?;
        match &self.kind {
            NodeKind::Leaf { value } => ser.serialize_field("value", value)?,
            NodeKind::Branch { children } if children.is_empty() => {
                ser.skip_field("children")?
            }
            NodeKind::Branch { children } => {
                let children: Vec<&CstNode> = children.iter().map(|child| &**child).collect();
                ser.serialize_field("children", &children)?
            }
        }
        match &self.loc {
            Some(loc) => ser.serialize_field("loc", loc)?,
            None => ser.skip_field("loc")?,
        }
        ser.end()
    }
}

/// Pre-order iterator over a subtree, see `CstNode::descendants`.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a CstNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a CstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| child.as_ref()));
        Some(node)
    }
}
