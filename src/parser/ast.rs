//! Node tree produced by the markup parser

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Root of a parsed template: the children of the implicit markup container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

impl Document {
    /// Whether the document contains any element at any depth
    pub fn has_elements(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n.node, Node::Element(_)))
    }
}

/// A run of literal text or a directive element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// A named element with its attributes and children
///
/// Attribute names are unique within an element; the parser rejects
/// duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: Spanned<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Spanned<Node>>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name.node
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name.node == name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// `name="value"`, with the value already entity-decoded
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Spanned<String>,
    pub value: Spanned<String>,
}

impl Attribute {
    pub fn value(&self) -> &str {
        &self.value.node
    }
}
