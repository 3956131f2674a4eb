use crate::constants::XML_DECLARATION;
use crate::Result;
use roxmltree::{Document, Node};

const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// An attribute of an owned [`Element`].
///
/// `namespace` holds the resolved URI, `prefix` the spelling used when the part is written back.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    Comment(String),
}

/// Owned, mutable XML element.
///
/// `roxmltree` only offers a read-only view of a document. Package parts that have to be
/// modified are parsed with it once and converted into this tree, which keeps the namespace
/// prefixes and declarations of the source so that serializing an untouched tree reproduces
/// the same markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub declarations: Vec<(Option<String>, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(namespace: &str, prefix: &str, name: &str) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element in the same namespace (and with the same prefix) as `self`.
    pub fn sibling(&self, name: &str) -> Self {
        Self {
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parses raw XML part data into an owned element tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid UTF-8 or not well-formed XML.
    pub fn parse(xml_data: &[u8]) -> Result<Element> {
        let xml_str = std::str::from_utf8(xml_data)?;
        let xml_str = xml_str.trim_start_matches('\u{feff}');
        let doc = Document::parse(xml_str)?;
        Ok(convert(doc.root_element()))
    }

    /// Serializes the element as a standalone XML part including the XML declaration.
    pub fn to_part_bytes(&self) -> Vec<u8> {
        let mut out = String::from(XML_DECLARATION);
        write_element(self, &mut out);
        out.into_bytes()
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Returns the value of an unqualified attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.namespace.is_none() && a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                prefix: None,
                namespace: None,
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn set_attribute_ns(&mut self, namespace: &str, prefix: &str, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
        {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(namespace, name))
    }

    pub fn child_mut(&mut self, namespace: &str, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.is(namespace, name))
    }

    /// Depth-first search over all descendants, `self` excluded.
    pub fn find_descendant(&self, namespace: &str, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.is(namespace, name) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(namespace, name) {
                return Some(found);
            }
        }
        None
    }

    /// Visits `self` and every descendant element in document order.
    pub fn walk(&self, visit: &mut impl FnMut(&Element)) {
        visit(self);
        for child in self.elements() {
            child.walk(visit);
        }
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|n| !matches!(n, XmlNode::Text(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.insert(0, XmlNode::Text(text));
        }
    }

    /// Removes every child element accepted by `matches`.
    ///
    /// Returns the node index the removed elements occupied (the position of the first one) so
    /// they can be put back with [`Element::insert_children`]. When nothing matched the index
    /// points past the last child.
    pub fn detach_children(&mut self, matches: impl Fn(&Element) -> bool) -> (usize, Vec<Element>) {
        let mut slot = None;
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());

        for node in std::mem::take(&mut self.children) {
            match node {
                XmlNode::Element(el) if matches(&el) => {
                    slot.get_or_insert(kept.len());
                    taken.push(el);
                }
                other => kept.push(other),
            }
        }

        self.children = kept;
        (slot.unwrap_or(self.children.len()), taken)
    }

    /// Removes the first child element with the given name and returns it with its node index.
    pub fn detach_child(&mut self, namespace: &str, name: &str) -> Option<(usize, Element)> {
        let index = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(el) if el.is(namespace, name)))?;
        match self.children.remove(index) {
            XmlNode::Element(el) => Some((index, el)),
            _ => None,
        }
    }

    pub fn insert_children(&mut self, at: usize, items: impl IntoIterator<Item = Element>) {
        let at = at.min(self.children.len());
        self.children.splice(at..at, items.into_iter().map(XmlNode::Element));
    }

    /// Node index of the first child element with the given name.
    pub fn position(&self, namespace: &str, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(el) if el.is(namespace, name)))
    }

    /// Node-index path from `self` to the first descendant with the given name.
    pub fn path_to(&self, namespace: &str, name: &str) -> Option<Vec<usize>> {
        for (index, node) in self.children.iter().enumerate() {
            if let XmlNode::Element(el) = node {
                if el.is(namespace, name) {
                    return Some(vec![index]);
                }
                if let Some(mut rest) = el.path_to(namespace, name) {
                    rest.insert(0, index);
                    return Some(rest);
                }
            }
        }
        None
    }

    /// Removes the element found at a node-index path built by [`Element::path_to`].
    pub fn take_at(&mut self, path: &[usize]) -> Option<Element> {
        let (last, parents) = path.split_last()?;
        let parent = self.element_at_mut(parents)?;
        if !matches!(parent.children.get(*last), Some(XmlNode::Element(_))) {
            return None;
        }
        match parent.children.remove(*last) {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Puts an element back at the path it was taken from.
    pub fn put_at(&mut self, path: &[usize], element: Element) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        if let Some(parent) = self.element_at_mut(parents) {
            let at = (*last).min(parent.children.len());
            parent.children.insert(at, XmlNode::Element(element));
        }
    }

    fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for index in path {
            current = match current.children.get_mut(*index)? {
                XmlNode::Element(el) => el,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Prefix under which `uri` is declared on this element, if any.
    ///
    /// The outer `Option` tells whether the namespace is declared, the inner one whether it is
    /// the default namespace.
    pub fn declared_prefix(&self, uri: &str) -> Option<Option<&str>> {
        self.declarations
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_deref())
    }

    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if self.declared_prefix(uri).is_none() {
            self.declarations.push((Some(prefix.to_string()), uri.to_string()));
        }
    }
}

fn convert(node: Node) -> Element {
    let tag = node.tag_name();
    let namespace = tag.namespace().map(str::to_string);
    let prefix = namespace.as_deref().and_then(|uri| element_prefix(node, uri));

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let declarations = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml") && ns.uri() != XML_URI)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            prefix: attr.namespace().and_then(|uri| attribute_prefix(node, uri)),
            namespace: attr.namespace().map(str::to_string),
            name: attr.name().to_string(),
            value: attr.value().to_string(),
        })
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(XmlNode::Element(convert(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                children.push(XmlNode::Text(text.to_string()));
            }
        } else if child.is_comment() {
            if let Some(text) = child.text() {
                children.push(XmlNode::Comment(text.to_string()));
            }
        }
    }

    Element {
        prefix,
        namespace,
        name: tag.name().to_string(),
        declarations,
        attributes,
        children,
    }
}

fn element_prefix(node: Node, uri: &str) -> Option<String> {
    let mut prefixed = None;
    for ns in node.namespaces().filter(|ns| ns.uri() == uri) {
        match ns.name() {
            None => return None,
            Some(name) => {
                prefixed.get_or_insert(name);
            }
        }
    }
    prefixed.map(str::to_string)
}

fn attribute_prefix(node: Node, uri: &str) -> Option<String> {
    if uri == XML_URI {
        return Some("xml".to_string());
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
        .map(str::to_string)
}

fn write_qname(prefix: Option<&str>, name: &str, out: &mut String) {
    if let Some(prefix) = prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(name);
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    write_qname(el.prefix.as_deref(), &el.name, out);

    for (prefix, uri) in &el.declarations {
        out.push_str(" xmlns");
        if let Some(prefix) = prefix {
            out.push(':');
            out.push_str(prefix);
        }
        out.push_str("=\"");
        escape_attribute(uri, out);
        out.push('"');
    }

    for attr in &el.attributes {
        out.push(' ');
        write_qname(attr.prefix.as_deref(), &attr.name, out);
        out.push_str("=\"");
        escape_attribute(&attr.value, out);
        out.push('"');
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &el.children {
        match child {
            XmlNode::Element(inner) => write_element(inner, out),
            XmlNode::Text(text) => escape_text(text, out),
            XmlNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    write_qname(el.prefix.as_deref(), &el.name, out);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            _ => out.push(c),
        }
    }
}
