//! Chained structural guards.
//!
//! ```ignore
//! let is_gallery = check(node)
//!     .element("ul")
//!     .attr("typeof", "mw:Extension/gallery")
//!     .passed();
//! ```
//!
//! The same chain serves two purposes: as a rule guard (`passed()`), where a
//! failure just means "this rule does not apply", and as a contract on
//! input (`ensure()`), where a failure is a [`MfnfError::Structural`] error.
//! Once one step fails the remaining steps are skipped and the first failure
//! is reported.

use mfnf_shared::{MfnfError, Node, NodeKind, Result};

/// Start a guard chain on `node`.
pub fn check(node: &Node) -> Check<'_> {
    Check {
        node,
        failure: None,
    }
}

/// An in-progress guard chain.
#[derive(Debug, Clone)]
#[must_use]
pub struct Check<'a> {
    node: &'a Node,
    failure: Option<String>,
}

impl<'a> Check<'a> {
    /// Node has the given `type` tag.
    pub fn kind(self, kind: NodeKind) -> Self {
        let node = self.node;
        let actual = node.kind();
        self.that(actual == kind, || format!("expected {kind} node, found {actual}"))
    }

    /// Node is an element named `name`.
    pub fn element(self, name: &str) -> Self {
        self.kind(NodeKind::Element).named(name)
    }

    /// Node is an element named one of `names`.
    pub fn element_of(self, names: &[&str]) -> Self {
        let node = self.node;
        self.kind(NodeKind::Element).that(
            node.name().is_some_and(|n| names.contains(&n)),
            || format!("expected one of <{}>, found {:?}", names.join(">, <"), node.name()),
        )
    }

    /// Node is a template named `name`.
    pub fn template(self, name: &str) -> Self {
        self.kind(NodeKind::Template).named(name)
    }

    /// Attribute `key` equals `value`.
    pub fn attr(self, key: &str, value: &str) -> Self {
        let node = self.node;
        let actual = node.attr(key);
        self.that(actual == Some(value), || {
            format!("expected {key}={value:?}, found {actual:?}")
        })
    }

    /// Attribute `key` equals one of `values`.
    pub fn attr_of(self, key: &str, values: &[&str]) -> Self {
        let node = self.node;
        let actual = node.attr(key);
        self.that(actual.is_some_and(|v| values.contains(&v)), || {
            format!("expected {key} in {values:?}, found {actual:?}")
        })
    }

    /// Attribute `key` is present.
    pub fn has_attr(self, key: &str) -> Self {
        let node = self.node;
        let present = node.attr(key).is_some();
        self.that(present, || format!("expected attribute {key}"))
    }

    /// Arbitrary condition, with a lazily built failure message.
    pub fn that(mut self, condition: bool, message: impl FnOnce() -> String) -> Self {
        if self.failure.is_none() && !condition {
            self.failure = Some(message());
        }
        self
    }

    /// Whether every step held.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// Turn the first failed step into a structural error.
    pub fn ensure(self) -> Result<()> {
        match self.failure {
            None => Ok(()),
            Some(message) => Err(MfnfError::structural(message)),
        }
    }

    fn named(self, name: &str) -> Self {
        let node = self.node;
        let actual = node.name();
        self.that(actual == Some(name), || {
            format!("expected name {name:?}, found {actual:?}")
        })
    }
}
