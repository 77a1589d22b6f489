//! In-memory project document.
//!
//! The document is parsed into an owned element tree so it can be queried
//! and edited before being written back. Everything outside the edited
//! playlist is kept as read: declaration, comments, CDATA, processing
//! instructions, whitespace, attribute order and `<empty/>` forms.
//!
//! ```text
//! project.kdenlive ──► Document::open ──► query / edit ──► Document::save
//! ```

use std::io::Write;
use std::path::Path;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ProjectError, ProjectResult};

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    CData(String),
    /// Raw comment content.
    Comment(String),
    Decl(Declaration),
    /// Raw processing instruction content, target included.
    ProcessingInstruction(String),
    /// Raw doctype content.
    DocType(String),
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style text content setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Builder-style child setter.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place when it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element) {
        self.self_closing = false;
        self.children.push(Node::Element(child));
    }

    /// Remove every child and attribute.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.children.clear();
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of the first `<property name="...">` child with the given name.
    pub fn property(&self, name: &str) -> Option<String> {
        self.child_elements()
            .find(|el| el.name == "property" && el.attr("name") == Some(name))
            .map(Element::text)
    }

    fn find_mut<P>(&mut self, predicate: &P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        find_in_mut(&mut self.children, predicate)
    }
}

/// Pre-order iterator over elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

fn find_in_mut<'a, P>(nodes: &'a mut [Node], predicate: &P) -> Option<&'a mut Element>
where
    P: Fn(&Element) -> bool,
{
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if predicate(el) {
                return Some(el);
            }
            if let Some(found) = el.find_mut(predicate) {
                return Some(found);
            }
        }
    }
    None
}

/// A parsed project document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Read and parse a project file.
    pub fn open(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = content.len(), "Parsing project document");
        Self::parse(&content)
    }

    /// Parse a project from an XML string.
    pub fn parse(xml: &str) -> ProjectResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| ProjectError::malformed("unexpected closing tag"))?;
                    Node::Element(el)
                }
                Event::Empty(start) => {
                    let mut el = element_from_start(&start)?;
                    el.self_closing = true;
                    Node::Element(el)
                }
                Event::Text(text) => Node::Text(text.unescape()?.into_owned()),
                Event::CData(cdata) => Node::CData(utf8(&cdata)?),
                Event::Comment(comment) => Node::Comment(utf8(&comment)?),
                Event::Decl(decl) => Node::Decl(declaration(&decl)?),
                Event::PI(pi) => Node::ProcessingInstruction(utf8(&pi)?),
                Event::DocType(doctype) => Node::DocType(utf8(&doctype)?),
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(ProjectError::malformed(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        Ok(Self { nodes })
    }

    /// Build a document from top-level nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Every element in document order, root included.
    pub fn elements(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.nodes.iter()],
        }
    }

    /// First element in document order matching the predicate.
    pub fn find<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements().find(|el| predicate(el))
    }

    /// Mutable access to the first element matching the predicate.
    pub fn find_mut<P>(&mut self, predicate: P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        find_in_mut(&mut self.nodes, &predicate)
    }

    /// The `<playlist>` with the given id.
    pub fn playlist(&self, id: &str) -> Option<&Element> {
        self.find(|el| el.name == "playlist" && el.attr("id") == Some(id))
    }

    /// Serialize to a writer.
    pub fn write_to<W: Write>(&self, inner: W) -> ProjectResult<()> {
        let mut writer = Writer::new(inner);
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(())
    }

    /// Serialize to a string.
    pub fn to_xml(&self) -> ProjectResult<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ProjectError::malformed(e.to_string()))
    }

    /// Write the document to `path`.
    ///
    /// An existing project is replaced through a temporary file next to it,
    /// so a failed write never truncates it. The replacement keeps the
    /// project's permissions, and a symlinked project is written through the
    /// link. A new file is created directly with the default mode.
    pub fn save(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        let path = path.as_ref();

        let target = match std::fs::canonicalize(path) {
            Ok(target) => target,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut file = std::fs::File::create(path)?;
                self.write_to(&mut file)?;
                file.sync_all()?;
                debug!(path = %path.display(), "Project document created");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let permissions = std::fs::metadata(&target)?.permissions();
        let dir = target.parent().unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_to(temp.as_file_mut())?;
        temp.as_file_mut().sync_all()?;
        temp.as_file().set_permissions(permissions)?;
        temp.persist(&target).map_err(|e| ProjectError::Io(e.error))?;

        debug!(path = %path.display(), target = %target.display(), "Project document written");
        Ok(())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> ProjectResult<Element> {
    let mut el = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn declaration(decl: &BytesDecl<'_>) -> ProjectResult<Declaration> {
    let version = utf8(&decl.version()?)?;
    let encoding = match decl.encoding() {
        Some(value) => Some(utf8(&value.map_err(quick_xml::Error::from)?)?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(value) => Some(utf8(&value.map_err(quick_xml::Error::from)?)?),
        None => None,
    };
    Ok(Declaration {
        version,
        encoding,
        standalone,
    })
}

fn utf8(bytes: &[u8]) -> ProjectResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ProjectError::malformed(e.to_string()))
}

pub(crate) fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> ProjectResult<()> {
    match node {
        Node::Element(el) => write_element(writer, el)?,
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?
        }
        Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        Node::Decl(decl) => writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?,
        Node::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesPI::new(text.as_str())))?
        }
        Node::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, el: &Element) -> ProjectResult<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.self_closing && el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
