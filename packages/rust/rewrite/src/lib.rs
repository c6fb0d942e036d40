//! Generic tree-rewriting engine.
//!
//! This crate provides:
//! - [`Action`] and [`Chain`]: ordered, named stages piped over a forest
//! - [`NodeRewriter`]: the single-node dispatch primitive, with the
//!   [`Rules`] (first matching guard wins), [`KindRewriter`] (dispatch on the
//!   node's `type`) and [`DeleteRewriter`] variants
//! - [`Walk`]: the recursive driver rules use to revisit their own output
//! - [`check`]: chained structural guards over a node
//!
//! Every stage runs with a read-only [`Context`] (content service + article
//! title) that is passed explicitly down the whole recursive descent.

mod chain;
pub mod check;
mod context;
mod engine;

pub use chain::{Action, Chain, FnAction, Pass};
pub use check::{Check, check};
pub use context::Context;
pub use engine::{DeleteRewriter, KindRewriter, NodeRewriter, Rewritten, Rules, Walk};
