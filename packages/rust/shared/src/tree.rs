//! The document tree shared by every pipeline stage.
//!
//! A tree starts out HTML-shaped ([`Node::Text`] and [`Node::Element`]),
//! picks up recovered macro calls ([`Node::Template`]) during deinclusion,
//! and ends up as semantic document nodes after the article pipeline.
//! Ownership is strictly hierarchical: every child sequence is owned by
//! exactly one parent.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single tree node, serialized as an object tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Character data.
    Text { data: String },
    /// Generic HTML element.
    Element(Element),
    /// Recovered macro invocation.
    Template(Template),
    Paragraph { children: Vec<Node> },
    Header(Header),
    List(List),
    Table { children: Vec<Node> },
    Image(Image),
    Gallery(Gallery),
    GalleryItem(GalleryItem),
    /// Display formula.
    Equation { formula: String },
    InlineMath { formula: String },
    /// Visible marker for disallowed or malformed input.
    Error { message: String },
    /// Visible marker for input no rule models yet; carries the raw node.
    NotImplemented { target: Box<Node> },
    I { children: Vec<Node> },
    B { children: Vec<Node> },
    Tr { children: Vec<Node> },
    Td { children: Vec<Node> },
    Th { children: Vec<Node> },
}

/// Generic HTML element: tag name, unordered attributes, ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A macro call recovered from a transclusion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

/// Value of a template parameter.
///
/// Serialized untagged: raw text as a string, parsed content as a node
/// array, and a merged list as `{"list": [...]}` so that an empty list and
/// empty content stay distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Parsed markup (content parameters).
    Content(Vec<Node>),
    /// Merged numbered parameters, in ascending order.
    #[serde(serialize_with = "serialize_list", deserialize_with = "deserialize_list")]
    List(Vec<ParamValue>),
    /// Raw parameter text.
    Text(String),
}

#[derive(Serialize)]
struct ListRef<'a> {
    list: &'a [ParamValue],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListOwned {
    list: Vec<ParamValue>,
}

fn serialize_list<S: Serializer>(
    items: &[ParamValue],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    ListRef { list: items }.serialize(serializer)
}

fn deserialize_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<ParamValue>, D::Error> {
    ListOwned::deserialize(deserializer).map(|wrapped| wrapped.list)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Document depth (markup `h2` is depth 1).
    pub depth: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    /// One node sequence per list item.
    pub children: Vec<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// File name without namespace prefix.
    pub name: String,
    pub url: String,
    pub thumbnail: bool,
    pub caption: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub widths: u32,
    pub heights: u32,
    /// `galleryitem` nodes, or `error` nodes for malformed lines.
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub name: String,
    pub caption: Vec<Node>,
}

/// A loaded article and its converted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: Vec<Node>,
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The `type` tag of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Element,
    Template,
    Paragraph,
    Header,
    List,
    Table,
    Image,
    Gallery,
    GalleryItem,
    Equation,
    InlineMath,
    Error,
    NotImplemented,
    I,
    B,
    Tr,
    Td,
    Th,
}

impl NodeKind {
    /// The serialized `type` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Element => "element",
            Self::Template => "template",
            Self::Paragraph => "paragraph",
            Self::Header => "header",
            Self::List => "list",
            Self::Table => "table",
            Self::Image => "image",
            Self::Gallery => "gallery",
            Self::GalleryItem => "galleryitem",
            Self::Equation => "equation",
            Self::InlineMath => "inlinemath",
            Self::Error => "error",
            Self::NotImplemented => "notimplemented",
            Self::I => "i",
            Self::B => "b",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Th => "th",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Node helpers
// ---------------------------------------------------------------------------

impl Node {
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text { data: data.into() }
    }

    /// Element with no attributes.
    pub fn element(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element(Element {
            name: name.into(),
            attrs: BTreeMap::new(),
            children,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn not_implemented(target: Node) -> Self {
        Self::NotImplemented {
            target: Box::new(target),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Text { .. } => NodeKind::Text,
            Self::Element(_) => NodeKind::Element,
            Self::Template(_) => NodeKind::Template,
            Self::Paragraph { .. } => NodeKind::Paragraph,
            Self::Header(_) => NodeKind::Header,
            Self::List(_) => NodeKind::List,
            Self::Table { .. } => NodeKind::Table,
            Self::Image(_) => NodeKind::Image,
            Self::Gallery(_) => NodeKind::Gallery,
            Self::GalleryItem(_) => NodeKind::GalleryItem,
            Self::Equation { .. } => NodeKind::Equation,
            Self::InlineMath { .. } => NodeKind::InlineMath,
            Self::Error { .. } => NodeKind::Error,
            Self::NotImplemented { .. } => NodeKind::NotImplemented,
            Self::I { .. } => NodeKind::I,
            Self::B { .. } => NodeKind::B,
            Self::Tr { .. } => NodeKind::Tr,
            Self::Td { .. } => NodeKind::Td,
            Self::Th { .. } => NodeKind::Th,
        }
    }

    /// Tag name of an element or macro name of a template.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.name),
            Self::Template(t) => Some(&t.name),
            _ => None,
        }
    }

    /// Attribute value of an element.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Self::Element(el) => el.attrs.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Text data of a text node.
    pub fn data(&self) -> Option<&str> {
        match self {
            Self::Text { data } => Some(data),
            _ => None,
        }
    }

    /// The flat child sequence, for nodes that have exactly one.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Element(Element { children, .. })
            | Self::Paragraph { children }
            | Self::Header(Header { children, .. })
            | Self::Table { children }
            | Self::Gallery(Gallery { children, .. })
            | Self::I { children }
            | Self::B { children }
            | Self::Tr { children }
            | Self::Td { children }
            | Self::Th { children } => Some(children),
            _ => None,
        }
    }

    /// Rebuild this node with every nested node sequence passed through `f`.
    ///
    /// Visits element/semantic children, list items, image and gallery
    /// captions, and parsed template parameters. The raw node kept by a
    /// `notimplemented` marker is not visited.
    pub fn map_children<E, F>(self, f: &mut F) -> std::result::Result<Node, E>
    where
        F: FnMut(Vec<Node>) -> std::result::Result<Vec<Node>, E>,
    {
        Ok(match self {
            Self::Element(mut el) => {
                el.children = f(el.children)?;
                Self::Element(el)
            }
            Self::Template(mut t) => {
                let mut params = BTreeMap::new();
                for (key, value) in t.params {
                    params.insert(key, value.map_content(f)?);
                }
                t.params = params;
                Self::Template(t)
            }
            Self::Paragraph { children } => Self::Paragraph {
                children: f(children)?,
            },
            Self::Header(mut h) => {
                h.children = f(h.children)?;
                Self::Header(h)
            }
            Self::List(mut list) => {
                list.children = list
                    .children
                    .into_iter()
                    .map(|item| f(item))
                    .collect::<std::result::Result<_, E>>()?;
                Self::List(list)
            }
            Self::Table { children } => Self::Table {
                children: f(children)?,
            },
            Self::Image(mut img) => {
                img.caption = f(img.caption)?;
                Self::Image(img)
            }
            Self::Gallery(mut g) => {
                g.children = f(g.children)?;
                Self::Gallery(g)
            }
            Self::GalleryItem(mut item) => {
                item.caption = f(item.caption)?;
                Self::GalleryItem(item)
            }
            Self::I { children } => Self::I {
                children: f(children)?,
            },
            Self::B { children } => Self::B {
                children: f(children)?,
            },
            Self::Tr { children } => Self::Tr {
                children: f(children)?,
            },
            Self::Td { children } => Self::Td {
                children: f(children)?,
            },
            Self::Th { children } => Self::Th {
                children: f(children)?,
            },
            leaf @ (Self::Text { .. }
            | Self::Equation { .. }
            | Self::InlineMath { .. }
            | Self::Error { .. }
            | Self::NotImplemented { .. }) => leaf,
        })
    }
}

impl ParamValue {
    /// Raw text of an unparsed parameter.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten into a node sequence; raw text becomes a single text node.
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Self::Content(nodes) => nodes,
            Self::Text(s) if s.is_empty() => Vec::new(),
            Self::Text(s) => vec![Node::text(s)],
            Self::List(items) => items.into_iter().flat_map(Self::into_nodes).collect(),
        }
    }

    /// Apply `f` to every parsed node sequence inside this value.
    pub fn map_content<E, F>(self, f: &mut F) -> std::result::Result<ParamValue, E>
    where
        F: FnMut(Vec<Node>) -> std::result::Result<Vec<Node>, E>,
    {
        Ok(match self {
            Self::Content(nodes) => Self::Content(f(nodes)?),
            Self::List(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| item.map_content(f))
                    .collect::<std::result::Result<_, E>>()?,
            ),
            text @ Self::Text(_) => text,
        })
    }
}

impl Template {
    /// Raw text of parameter `key`, if present and unparsed.
    pub fn text_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParamValue::as_text)
    }
}
