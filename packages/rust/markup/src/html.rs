//! Streaming HTML-to-tree builder.
//!
//! Tokens from `html5gum` drive an explicit stack of open elements. The
//! renderer indents its output with newlines and spaces between block tags,
//! so character data is normalized on the way in:
//! - whitespace-only chunks are dropped
//! - every whitespace run collapses to one space
//! - leading whitespace is stripped from the first child of an element
//! - trailing whitespace is stripped from an element's last text child
//!   when it closes
//!
//! Unbalanced markup is fatal.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use html5gum::{HtmlString, Token, Tokenizer};
use regex::Regex;
use tracing::trace;

use mfnf_shared::{Element, MfnfError, Node, Result};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parse rendered HTML into a forest of element and text nodes.
pub fn parse_html(html: &str) -> Result<Vec<Node>> {
    let mut builder = TreeBuilder::new();
    let mut pending = String::new();

    for token in Tokenizer::new(html).infallible() {
        if let Token::String(s) = &token {
            pending.push_str(utf8(s)?);
            continue;
        }

        builder.data(&pending);
        pending.clear();

        match token {
            Token::StartTag(tag) => {
                let name = utf8(&tag.name)?.to_string();
                let mut attrs = BTreeMap::new();
                for (key, value) in &tag.attributes {
                    attrs.insert(utf8(key)?.to_string(), utf8(value)?.to_string());
                }
                let self_closing = tag.self_closing || VOID_ELEMENTS.contains(&name.as_str());
                builder.open(name.clone(), attrs);
                if self_closing {
                    builder.close(&name)?;
                }
            }
            Token::EndTag(tag) => builder.close(utf8(&tag.name)?)?,
            Token::Error(error) => trace!(?error, "tokenizer recovered from error"),
            _ => {}
        }
    }

    builder.data(&pending);
    builder.finish()
}

fn utf8(s: &HtmlString) -> Result<&str> {
    std::str::from_utf8(&**s).map_err(|e| MfnfError::markup(format!("invalid UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

struct TreeBuilder {
    roots: Vec<Node>,
    /// Open elements; each is attached to its parent when it closes.
    stack: Vec<Element>,
    /// Next character data is the first child of an element.
    first_child: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            stack: Vec::new(),
            first_child: true,
        }
    }

    fn open(&mut self, name: String, attrs: BTreeMap<String, String>) {
        self.stack.push(Element {
            name,
            attrs,
            children: Vec::new(),
        });
        self.first_child = true;
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let Some(mut element) = self.stack.pop() else {
            return Err(MfnfError::markup(format!(
                "closing </{name}> without an open element"
            )));
        };
        if element.name != name {
            return Err(MfnfError::markup(format!(
                "closing </{name}> does not match open <{}>",
                element.name
            )));
        }

        if let Some(Node::Text { data }) = element.children.last_mut() {
            let len = data.trim_end().len();
            data.truncate(len);
        }

        self.first_child = false;
        self.container().push(Node::Element(element));
        Ok(())
    }

    fn data(&mut self, chunk: &str) {
        static WHITESPACE_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

        if chunk.trim().is_empty() {
            return;
        }

        let mut text = WHITESPACE_RE.replace_all(chunk, " ").into_owned();
        if self.first_child {
            text = text.trim_start().to_string();
            self.first_child = false;
        }

        let container = self.container();
        match container.last_mut() {
            Some(Node::Text { data }) => data.push_str(&text),
            _ => container.push(Node::Text { data: text }),
        }
    }

    fn container(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(element) => &mut element.children,
            None => &mut self.roots,
        }
    }

    fn finish(self) -> Result<Vec<Node>> {
        if let Some(open) = self.stack.last() {
            return Err(MfnfError::markup(format!("unclosed element <{}>", open.name)));
        }
        Ok(self.roots)
    }
}
