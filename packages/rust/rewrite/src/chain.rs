//! Named actions and ordered chains of them.

use mfnf_shared::{Node, Result};
use tracing::debug;

use crate::context::Context;
use crate::engine::{NodeRewriter, Walk};

/// A named stage mapping a forest to its replacement.
pub trait Action: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Run the stage. `nodes` is owned; the result replaces it entirely.
    fn apply(&self, ctx: Context<'_>, nodes: Vec<Node>) -> Result<Vec<Node>>;
}

/// Runs a [`NodeRewriter`] over every node of the forest.
pub struct Pass<R> {
    rewriter: R,
}

impl<R: NodeRewriter> Pass<R> {
    pub fn new(rewriter: R) -> Self {
        Self { rewriter }
    }
}

impl<R: NodeRewriter> Action for Pass<R> {
    fn name(&self) -> &str {
        self.rewriter.name()
    }

    fn apply(&self, ctx: Context<'_>, nodes: Vec<Node>) -> Result<Vec<Node>> {
        Walk::new(&self.rewriter, ctx).nodes(nodes)
    }
}

type StageFn = Box<dyn Fn(Context<'_>, Vec<Node>) -> Result<Vec<Node>> + Send + Sync>;

/// A plain function used as a chain stage.
pub struct FnAction {
    name: &'static str,
    f: StageFn,
}

impl FnAction {
    pub fn new(
        name: &'static str,
        f: impl Fn(Context<'_>, Vec<Node>) -> Result<Vec<Node>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            f: Box::new(f),
        }
    }
}

impl Action for FnAction {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, ctx: Context<'_>, nodes: Vec<Node>) -> Result<Vec<Node>> {
        (self.f)(ctx, nodes)
    }
}

/// Fixed, ordered list of actions run left to right.
///
/// Each action receives the previous action's output and the same context.
/// A chain is itself an [`Action`], so chains compose.
pub struct Chain {
    name: &'static str,
    actions: Vec<Box<dyn Action>>,
}

impl Chain {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            actions: Vec::new(),
        }
    }

    /// Append an action.
    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Append a rewriter as a whole-forest pass.
    pub fn rewrite(self, rewriter: impl NodeRewriter + 'static) -> Self {
        self.then(Pass::new(rewriter))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Run every stage in order.
    pub fn run(&self, ctx: Context<'_>, mut nodes: Vec<Node>) -> Result<Vec<Node>> {
        for action in &self.actions {
            debug!(chain = self.name, action = action.name(), "running action");
            nodes = action.apply(ctx, nodes)?;
        }
        Ok(nodes)
    }
}

impl Action for Chain {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, ctx: Context<'_>, nodes: Vec<Node>) -> Result<Vec<Node>> {
        self.run(ctx, nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DeleteRewriter, Rules};
    use mfnf_shared::{ContentService, MfnfError};

    struct Offline;

    impl ContentService for Offline {
        fn get_content(&self, title: &str) -> Result<String> {
            Err(MfnfError::not_found(title))
        }

        fn render_html(&self, _title: &str, _text: &str) -> Result<String> {
            Err(MfnfError::Network("offline".into()))
        }
    }

    #[test]
    fn chain_pipes_output_left_to_right() {
        let chain = Chain::new("test")
            .rewrite(Rules::new("em-to-i").rule(
                "em",
                |node| node.name() == Some("em"),
                |walk, node| {
                    let children = node.children().map(<[Node]>::to_vec).unwrap_or_default();
                    Ok(Node::I {
                        children: walk.nodes(children)?,
                    })
                },
            ))
            // Only sees the output of the first stage.
            .rewrite(DeleteRewriter::new("drop-i", |node| {
                matches!(node, Node::I { .. })
            }))
            .then(FnAction::new("append", |_, mut nodes| {
                nodes.push(Node::text("end"));
                Ok(nodes)
            }));

        assert_eq!(chain.names(), vec!["em-to-i", "drop-i", "append"]);

        let ctx = Context::new(&Offline, "Test");
        let output = chain
            .run(ctx, vec![Node::element("em", vec![]), Node::text("x")])
            .unwrap();
        assert_eq!(output, vec![Node::text("x"), Node::text("end")]);
    }

    #[test]
    fn chains_nest() {
        let inner = Chain::new("inner").then(FnAction::new("title", |ctx, mut nodes| {
            nodes.push(Node::text(ctx.title));
            Ok(nodes)
        }));
        let outer = Chain::new("outer").then(inner);
        assert_eq!(outer.len(), 1);

        let ctx = Context::new(&Offline, "Folgen");
        let output = outer.run(ctx, vec![]).unwrap();
        assert_eq!(output, vec![Node::text("Folgen")]);
    }

    #[test]
    fn failing_stage_stops_the_chain() {
        let chain = Chain::new("test")
            .then(FnAction::new("fail", |ctx, _| {
                Err(ctx.api.get_content(ctx.title).unwrap_err())
            }))
            .then(FnAction::new("unreachable", |_, _| panic!("must not run")));

        let ctx = Context::new(&Offline, "Missing");
        let err = chain.run(ctx, vec![]).unwrap_err();
        assert!(matches!(err, MfnfError::NotFound { .. }));
    }
}
