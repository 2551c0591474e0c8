//! Minimal mutable XML tree for JUnit reports.
//!
//! Reports are read with the `quick-xml` pull reader into owned [`Element`]s,
//! mutated in place and written back with an indenting `quick-xml` writer.
//! Whitespace-only text nodes are not kept, so indentation in the output is
//! always regenerated. Any other text is kept exactly as it was read.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use quick_xml::{
    escape::partial_escape,
    events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event},
    Reader, Writer,
};
use thiserror::Error;

use crate::constants::{XML_INDENT_CHAR, XML_INDENT_SIZE};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("no root element found")]
    NoRootElement,
    #[error("multiple root elements found, second one is <{0}>")]
    MultipleRootElements(String),
    #[error("element <{0}> is not balanced")]
    UnbalancedTag(String),
    #[error("unsupported encoding {0:?}, only UTF-8 reports can be processed")]
    UnsupportedEncoding(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// Nodes allowed before or after the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Misc {
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the value in place so attribute order is preserved.
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Visits every descendant named `name` in document order, `self` included.
    pub fn for_each_descendant_mut<F: FnMut(&mut Element)>(&mut self, name: &str, f: &mut F) {
        if self.name == name {
            f(self);
        }
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                element.for_each_descendant_mut(name, f);
            }
        }
    }

    #[cfg(test)]
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    #[cfg(test)]
    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
        }
        for element in self.child_elements() {
            element.collect_descendants(name, found);
        }
    }

    fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), DocumentError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(
                    partial_escape(text.as_str()),
                )))?,
                Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text)))?,
                Node::Comment(text) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(text)))?
                }
                Node::ProcessingInstruction(text) => {
                    writer.write_event(Event::PI(BytesPI::new(text.as_str())))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    pub prolog: Vec<Misc>,
    pub root: Element,
    pub epilog: Vec<Misc>,
}

impl Document {
    pub fn parse<R: BufRead>(xml: R) -> Result<Self, DocumentError> {
        DocumentBuilder::default().build(xml)
    }

    #[cfg(test)]
    pub fn parse_str(xml: &str) -> Result<Self, DocumentError> {
        Self::parse(xml.as_bytes())
    }

    pub fn write_to<W: Write>(&self, inner: W) -> Result<(), DocumentError> {
        let mut writer = Writer::new_with_indent(inner, XML_INDENT_CHAR, XML_INDENT_SIZE);

        if let Some(Declaration {
            version,
            encoding,
            standalone,
        }) = &self.declaration
        {
            writer.write_event(Event::Decl(BytesDecl::new(
                version,
                encoding.as_deref(),
                standalone.as_deref(),
            )))?;
        }
        for misc in &self.prolog {
            write_misc(&mut writer, misc)?;
        }
        self.root.write(&mut writer)?;
        for misc in &self.epilog {
            write_misc(&mut writer, misc)?;
        }

        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn write_misc<W: Write>(writer: &mut Writer<W>, misc: &Misc) -> Result<(), DocumentError> {
    match misc {
        Misc::Comment(text) => writer.write_event(Event::Comment(BytesText::from_escaped(text)))?,
        Misc::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesPI::new(text.as_str())))?
        }
        Misc::DocType(text) => writer.write_event(Event::DocType(BytesText::from_escaped(text)))?,
    }
    Ok(())
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    declaration: Option<Declaration>,
    prolog: Vec<Misc>,
    root: Option<Element>,
    epilog: Vec<Misc>,
    open_elements: Vec<Element>,
}

impl DocumentBuilder {
    fn build<R: BufRead>(mut self, xml: R) -> Result<Document, DocumentError> {
        let mut reader = Reader::from_reader(xml);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Decl(e) => {
                    let encoding = e.encoding().transpose()?.map(|v| lossy(&v).into_owned());
                    if let Some(encoding) = &encoding {
                        if !is_utf8_compatible(encoding) {
                            return Err(DocumentError::UnsupportedEncoding(encoding.clone()));
                        }
                    }
                    self.declaration = Some(Declaration {
                        version: lossy(&e.version()?).into_owned(),
                        encoding,
                        standalone: e.standalone().transpose()?.map(|v| lossy(&v).into_owned()),
                    });
                }
                Event::Start(e) => {
                    let element = element_from_start(&e)?;
                    self.open_elements.push(element);
                }
                Event::End(e) => match self.open_elements.pop() {
                    Some(element) => self.close_element(element)?,
                    None => {
                        return Err(DocumentError::UnbalancedTag(
                            lossy(e.name().as_ref()).into_owned(),
                        ))
                    }
                },
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    self.close_element(element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    // Indentation between elements is regenerated on write
                    if !text.trim().is_empty() {
                        self.push_text(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(e) => {
                    self.push_text(Node::CData(lossy(&e.into_inner()).into_owned()));
                }
                Event::Comment(e) => {
                    let text = lossy(&e).into_owned();
                    self.push_misc(Node::Comment(text.clone()), Misc::Comment(text));
                }
                Event::PI(e) => {
                    let text = lossy(&e).into_owned();
                    self.push_misc(
                        Node::ProcessingInstruction(text.clone()),
                        Misc::ProcessingInstruction(text),
                    );
                }
                Event::DocType(e) => {
                    self.prolog.push(Misc::DocType(lossy(&e).into_owned()));
                }
                #[allow(unreachable_patterns)]
                _ => (),
            }
            buf.clear();
        }

        if let Some(unclosed) = self.open_elements.pop() {
            return Err(DocumentError::UnbalancedTag(unclosed.name));
        }

        let root = self.root.ok_or(DocumentError::NoRootElement)?;
        Ok(Document {
            declaration: self.declaration,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }

    fn close_element(&mut self, element: Element) -> Result<(), DocumentError> {
        if let Some(parent) = self.open_elements.last_mut() {
            parent.children.push(Node::Element(element));
        } else if self.root.is_some() {
            return Err(DocumentError::MultipleRootElements(element.name));
        } else {
            self.root = Some(element);
        }
        Ok(())
    }

    fn push_text(&mut self, node: Node) {
        match self.open_elements.last_mut() {
            Some(parent) => parent.children.push(node),
            None => log::warn!("Ignoring text found outside of the root element"),
        }
    }

    fn push_misc(&mut self, node: Node, misc: Misc) {
        if let Some(parent) = self.open_elements.last_mut() {
            parent.children.push(node);
        } else if self.root.is_some() {
            self.epilog.push(misc);
        } else {
            self.prolog.push(misc);
        }
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element, DocumentError> {
    let mut element = Element::new(lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn is_utf8_compatible(encoding: &str) -> bool {
    ["utf-8", "utf8", "us-ascii", "ascii"]
        .iter()
        .any(|supported| encoding.eq_ignore_ascii_case(supported))
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
