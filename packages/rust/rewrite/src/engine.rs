//! Node rewriters and the recursive walk that drives them.
//!
//! A [`NodeRewriter`] looks at one node and decides its fate:
//! - [`Rewritten::Replaced`]: the rule applied. The replacement is used as
//!   is; the rule itself recursed into whatever part of its output it wants
//!   revisited (via [`Walk::nodes`]).
//! - [`Rewritten::NotInterested`]: no rule applies. The node keeps its shape
//!   and the walk continues into its children.
//! - [`Rewritten::Deleted`]: the node is dropped from its parent.

use mfnf_shared::{Node, NodeKind, Result};
use tracing::trace;

use crate::context::Context;

/// Outcome of offering one node to a rewriter.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewritten {
    Replaced(Node),
    NotInterested(Node),
    Deleted,
}

/// A pattern-matching transformation of single nodes.
pub trait NodeRewriter: Send + Sync {
    /// Human-readable name for tracing.
    fn name(&self) -> &str;

    /// Decide what happens to `node`.
    fn rewrite(&self, walk: &Walk<'_>, node: Node) -> Result<Rewritten>;
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Recursive driver binding a rewriter to the conversion context.
pub struct Walk<'a> {
    rewriter: &'a dyn NodeRewriter,
    ctx: Context<'a>,
}

impl<'a> Walk<'a> {
    pub fn new(rewriter: &'a dyn NodeRewriter, ctx: Context<'a>) -> Self {
        Self { rewriter, ctx }
    }

    pub fn ctx(&self) -> Context<'a> {
        self.ctx
    }

    /// Rewrite every node of a sequence, dropping deleted ones.
    pub fn nodes(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(node) = self.node(node)? {
                out.push(node);
            }
        }
        Ok(out)
    }

    /// Rewrite a single node; `None` if it was deleted.
    pub fn node(&self, node: Node) -> Result<Option<Node>> {
        match self.rewriter.rewrite(self, node)? {
            Rewritten::Replaced(node) => Ok(Some(node)),
            Rewritten::NotInterested(node) => {
                Ok(Some(node.map_children(&mut |children| self.nodes(children))?))
            }
            Rewritten::Deleted => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules: first matching guard wins
// ---------------------------------------------------------------------------

type Guard = Box<dyn Fn(&Node) -> bool + Send + Sync>;
type Apply = Box<dyn Fn(&Walk<'_>, Node) -> Result<Node> + Send + Sync>;

struct Rule {
    name: &'static str,
    guard: Guard,
    apply: Apply,
}

/// Generic rewriter: an ordered list of guarded rules.
///
/// Guards are tried in declaration order and the first one that holds
/// commits its rule. A failing guard only rules out its own rule.
pub struct Rules {
    name: &'static str,
    rules: Vec<Rule>,
}

impl Rules {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    /// Append a rule; `guard` must hold for `apply` to run.
    pub fn rule(
        mut self,
        name: &'static str,
        guard: impl Fn(&Node) -> bool + Send + Sync + 'static,
        apply: impl Fn(&Walk<'_>, Node) -> Result<Node> + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            name,
            guard: Box::new(guard),
            apply: Box::new(apply),
        });
        self
    }
}

impl NodeRewriter for Rules {
    fn name(&self) -> &str {
        self.name
    }

    fn rewrite(&self, walk: &Walk<'_>, node: Node) -> Result<Rewritten> {
        match self.rules.iter().find(|rule| (rule.guard)(&node)) {
            Some(rule) => {
                trace!(rewriter = self.name, rule = rule.name, "rule matched");
                Ok(Rewritten::Replaced((rule.apply)(walk, node)?))
            }
            None => Ok(Rewritten::NotInterested(node)),
        }
    }
}

// ---------------------------------------------------------------------------
// KindRewriter: dispatch on the node's type tag
// ---------------------------------------------------------------------------

type Handler = Box<dyn Fn(&Walk<'_>, Node) -> Result<Rewritten> + Send + Sync>;

/// Type-dispatch rewriter.
///
/// Nodes of `kind` go to the single handler, which alone decides whether it
/// applies (returning [`Rewritten::NotInterested`] otherwise). Nodes of any
/// other kind are never shown to the handler.
pub struct KindRewriter {
    name: &'static str,
    kind: NodeKind,
    handler: Handler,
}

impl KindRewriter {
    pub fn new(
        name: &'static str,
        kind: NodeKind,
        handler: impl Fn(&Walk<'_>, Node) -> Result<Rewritten> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            handler: Box::new(handler),
        }
    }
}

impl NodeRewriter for KindRewriter {
    fn name(&self) -> &str {
        self.name
    }

    fn rewrite(&self, walk: &Walk<'_>, node: Node) -> Result<Rewritten> {
        if node.kind() == self.kind {
            (self.handler)(walk, node)
        } else {
            Ok(Rewritten::NotInterested(node))
        }
    }
}

// ---------------------------------------------------------------------------
// DeleteRewriter
// ---------------------------------------------------------------------------

type Predicate = Box<dyn Fn(&Node) -> bool + Send + Sync>;

/// Drops every node for which the predicate holds; walks into the rest.
pub struct DeleteRewriter {
    name: &'static str,
    predicate: Predicate,
}

impl DeleteRewriter {
    pub fn new(
        name: &'static str,
        predicate: impl Fn(&Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }
}

impl NodeRewriter for DeleteRewriter {
    fn name(&self) -> &str {
        self.name
    }

    fn rewrite(&self, _walk: &Walk<'_>, node: Node) -> Result<Rewritten> {
        if (self.predicate)(&node) {
            trace!(rewriter = self.name, kind = %node.kind(), "deleting node");
            Ok(Rewritten::Deleted)
        } else {
            Ok(Rewritten::NotInterested(node))
        }
    }
}
