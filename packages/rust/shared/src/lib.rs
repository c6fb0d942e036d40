//! Shared types, error model, and configuration for the mfnf converter.
//!
//! This crate is the foundation depended on by all other mfnf crates.
//! It provides:
//! - [`MfnfError`]: the unified error type
//! - The document tree ([`Node`] and its payload records)
//! - The [`ContentService`] seam to the wiki backend
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod service;
pub mod tree;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheConfig, MediaWikiConfig, PipelineConfig, config_dir, config_file_path,
    expand_home, init_config, load_config, load_config_from,
};
pub use error::{MfnfError, Result};
pub use service::ContentService;
pub use tree::{
    Article, Element, Gallery, GalleryItem, Header, Image, List, Node, NodeKind, ParamValue,
    Template,
};
