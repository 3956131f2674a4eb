use crate::constants::{A_NAMESPACE, P_NAMESPACE};
use crate::types::{Anchor, ShapePath};
use crate::xml::{Element, XmlNode};

/// Run properties (`<a:rPr>`), kept as opaque markup so they survive a rewrite unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatting {
    properties: Option<Element>,
}

impl Formatting {
    pub fn from_properties(properties: Element) -> Self {
        Self { properties: Some(properties) }
    }

    /// Returns a copy with one `<a:rPr>` attribute set, e.g. `("b", "1")` for bold.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        let properties = self
            .properties
            .unwrap_or_else(|| Element::new(A_NAMESPACE, "a", "rPr"))
            .with_attribute(name, value);
        Self { properties: Some(properties) }
    }

    pub fn properties(&self) -> Option<&Element> {
        self.properties.as_ref()
    }

    pub fn is_bold(&self) -> bool {
        self.flag("b")
    }

    pub fn is_italic(&self) -> bool {
        self.flag("i")
    }

    pub fn is_underlined(&self) -> bool {
        self.attribute("u").is_some_and(|u| u != "none")
    }

    pub fn lang(&self) -> Option<&str> {
        self.attribute("lang")
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.properties.as_ref().and_then(|p| p.attribute(name))
    }

    fn flag(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

/// A text run (`<a:r>`): one span of text sharing a single formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    element: Element,
    pub text: String,
    pub formatting: Formatting,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_formatting(text, Formatting::default())
    }

    pub fn with_formatting(text: impl Into<String>, formatting: Formatting) -> Self {
        Self {
            element: Element::new(A_NAMESPACE, "a", "r"),
            text: text.into(),
            formatting,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let mut formatting = Formatting::default();
        let mut text = String::new();

        let (_, parts) = element.detach_children(|el| el.is(A_NAMESPACE, "rPr") || el.is(A_NAMESPACE, "t"));
        for part in parts {
            if part.is(A_NAMESPACE, "rPr") {
                formatting.properties = Some(part);
            } else {
                text.push_str(&part.text());
            }
        }
        element.children.retain(|n| !matches!(n, XmlNode::Text(_)));

        Self { element, text, formatting }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        let mut t = element.sibling("t");
        t.set_text(self.text);

        let mut parts = Vec::with_capacity(2);
        if let Some(properties) = self.formatting.properties {
            parts.push(properties);
        }
        parts.push(t);
        element.insert_children(0, parts);
        element
    }
}

/// Paragraph content in document order.
///
/// Line breaks and fields are carried along untouched as `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Other(Element),
}

/// A paragraph (`<a:p>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    element: Element,
    pub properties: Option<Element>,
    pub content: Vec<Inline>,
    pub end_properties: Option<Element>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            element: Element::new(A_NAMESPACE, "a", "p"),
            properties: None,
            content: runs.into_iter().map(Inline::Run).collect(),
            end_properties: None,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let mut properties = None;
        let mut end_properties = None;
        let mut content = Vec::new();

        let mut kept = Vec::new();
        for node in std::mem::take(&mut element.children) {
            match node {
                XmlNode::Element(el) if el.is(A_NAMESPACE, "pPr") => properties = Some(el),
                XmlNode::Element(el) if el.is(A_NAMESPACE, "endParaRPr") => end_properties = Some(el),
                XmlNode::Element(el) if el.is(A_NAMESPACE, "r") => content.push(Inline::Run(Run::from_element(el))),
                XmlNode::Element(el) => content.push(Inline::Other(el)),
                XmlNode::Comment(c) => kept.push(XmlNode::Comment(c)),
                XmlNode::Text(_) => {}
            }
        }
        element.children = kept;

        Self { element, properties, content, end_properties }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        let mut parts = Vec::with_capacity(self.content.len() + 2);
        parts.extend(self.properties);
        parts.extend(self.content.into_iter().map(|inline| match inline {
            Inline::Run(run) => run.into_element(),
            Inline::Other(el) => el,
        }));
        parts.extend(self.end_properties);
        element.insert_children(0, parts);
        element
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|inline| match inline {
            Inline::Run(run) => Some(run),
            Inline::Other(_) => None,
        })
    }

    /// Runs grouped into the stretches between line breaks, fields and other inline elements.
    ///
    /// Empty stretches are left out.
    pub fn segments_mut(&mut self) -> Vec<Vec<&mut Run>> {
        let mut segments = vec![Vec::new()];
        for inline in &mut self.content {
            match inline {
                Inline::Run(run) => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push(run);
                    }
                }
                Inline::Other(_) => segments.push(Vec::new()),
            }
        }
        segments.retain(|segment| !segment.is_empty());
        segments
    }

    /// Text of all runs concatenated in run order.
    pub fn text(&self) -> String {
        self.runs().map(|run| run.text.as_str()).collect()
    }
}

/// A text body (`<p:txBody>` in shapes, `<a:txBody>` in table cells).
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    element: Element,
    slot: usize,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            element: Element::new(P_NAMESPACE, "p", "txBody"),
            slot: 0,
            paragraphs,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let (slot, paragraphs) = element.detach_children(|el| el.is(A_NAMESPACE, "p"));
        Self {
            element,
            slot,
            paragraphs: paragraphs.into_iter().map(Paragraph::from_element).collect(),
        }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        element.insert_children(self.slot, self.paragraphs.into_iter().map(Paragraph::into_element));
        element
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drops all text, leaving one empty paragraph that keeps the first paragraph's properties.
    pub fn clear(&mut self) {
        let mut first = match self.paragraphs.drain(..).next() {
            Some(paragraph) => paragraph,
            None => Paragraph::new(Vec::new()),
        };
        first.content.clear();
        self.paragraphs.push(first);
    }
}

/// The `<p:ph>` reference of a shape that takes its defaults from the slide layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placeholder {
    pub kind: Option<String>,
    pub index: Option<u32>,
}

impl Placeholder {
    fn from_element(ph: &Element) -> Self {
        Self {
            kind: ph.attribute("type").map(str::to_string),
            index: ph.attribute("idx").and_then(|idx| idx.trim().parse().ok()),
        }
    }

    /// Placeholder type, `obj` when the attribute is absent.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("obj")
    }

    /// Type of the master placeholder this one inherits from.
    ///
    /// Masters only carry title, body, date, footer and slide number placeholders; every content
    /// type maps to the body.
    pub fn master_kind(&self) -> &str {
        match self.kind() {
            "title" | "ctrTitle" => "title",
            kind @ ("dt" | "ftr" | "sldNum" | "hdr") => kind,
            _ => "body",
        }
    }

    /// The layout placeholder matching this slide placeholder: same `idx` first, then same type.
    pub fn find_in<'a, T>(&self, candidates: &'a [(Placeholder, T)]) -> Option<&'a (Placeholder, T)> {
        self.index
            .and_then(|index| candidates.iter().find(|(candidate, _)| candidate.index == Some(index)))
            .or_else(|| candidates.iter().find(|(candidate, _)| candidate.kind() == self.kind()))
    }
}

/// A shape with a text frame (`<p:sp>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    element: Element,
    body: Option<(usize, TextBody)>,
    pub anchor: Option<Anchor>,
    pub placeholder: Option<Placeholder>,
}

impl TextShape {
    pub fn new(anchor: Option<Anchor>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            element: Element::new(P_NAMESPACE, "p", "sp"),
            body: Some((0, TextBody::new(paragraphs))),
            anchor,
            placeholder: None,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let anchor = read_anchor(element.child(P_NAMESPACE, "spPr").and_then(|sp| sp.child(A_NAMESPACE, "xfrm")));
        let placeholder = element
            .child(P_NAMESPACE, "nvSpPr")
            .and_then(|nv| nv.child(P_NAMESPACE, "nvPr"))
            .and_then(|nv| nv.child(P_NAMESPACE, "ph"))
            .map(Placeholder::from_element);
        let body = element
            .detach_child(P_NAMESPACE, "txBody")
            .map(|(slot, body)| (slot, TextBody::from_element(body)));
        Self { element, body, anchor, placeholder }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        if let Some((slot, body)) = self.body {
            element.insert_children(slot, [body.into_element()]);
        }
        element
    }

    pub fn body(&self) -> Option<&TextBody> {
        self.body.as_ref().map(|(_, body)| body)
    }

    pub fn body_mut(&mut self) -> Option<&mut TextBody> {
        self.body.as_mut().map(|(_, body)| body)
    }

    pub fn text(&self) -> String {
        self.body().map(TextBody::text).unwrap_or_default()
    }
}

/// Maps coordinates of a group's children into the coordinate space of the group's parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn apply(&self, anchor: Anchor) -> Anchor {
        Anchor {
            x: anchor.x * self.scale_x + self.offset_x,
            y: anchor.y * self.scale_y + self.offset_y,
            width: anchor.width * self.scale_x,
            height: anchor.height * self.scale_y,
        }
    }

    /// Composition that applies `inner` first and `self` second.
    pub fn then(&self, inner: Transform) -> Transform {
        Transform {
            scale_x: self.scale_x * inner.scale_x,
            scale_y: self.scale_y * inner.scale_y,
            offset_x: self.scale_x * inner.offset_x + self.offset_x,
            offset_y: self.scale_y * inner.offset_y + self.offset_y,
        }
    }

    /// Reads `<a:xfrm>` of a `<p:grpSpPr>`.
    ///
    /// A degenerate child extent (all zeros, as written for the slide's root tree) yields `None`.
    fn from_group_xfrm(xfrm: &Element) -> Option<Self> {
        let off = read_point(xfrm.child(A_NAMESPACE, "off")?, "x", "y")?;
        let ext = read_point(xfrm.child(A_NAMESPACE, "ext")?, "cx", "cy")?;
        let ch_off = read_point(xfrm.child(A_NAMESPACE, "chOff")?, "x", "y")?;
        let ch_ext = read_point(xfrm.child(A_NAMESPACE, "chExt")?, "cx", "cy")?;

        if ch_ext.0 <= 0.0 || ch_ext.1 <= 0.0 {
            return None;
        }

        let scale_x = ext.0 / ch_ext.0;
        let scale_y = ext.1 / ch_ext.1;
        Some(Transform {
            scale_x,
            scale_y,
            offset_x: off.0 - ch_off.0 * scale_x,
            offset_y: off.1 - ch_off.1 * scale_y,
        })
    }
}

/// A group of shapes (`<p:grpSp>`); the slide's `<p:spTree>` is lowered the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    element: Element,
    slot: usize,
    pub transform: Transform,
    pub children: Vec<ShapeNode>,
}

impl GroupShape {
    pub fn new(children: Vec<ShapeNode>) -> Self {
        Self {
            element: Element::new(P_NAMESPACE, "p", "grpSp"),
            slot: 0,
            transform: Transform::IDENTITY,
            children,
        }
    }

    pub fn from_element(mut element: Element) -> Self {
        let transform = element
            .child(P_NAMESPACE, "grpSpPr")
            .and_then(|pr| pr.child(A_NAMESPACE, "xfrm"))
            .and_then(Transform::from_group_xfrm)
            .unwrap_or(Transform::IDENTITY);

        let (slot, shapes) = element.detach_children(|el| {
            !(el.is(P_NAMESPACE, "nvGrpSpPr") || el.is(P_NAMESPACE, "grpSpPr") || el.is(P_NAMESPACE, "extLst"))
        });
        let slot = if shapes.is_empty() {
            element.position(P_NAMESPACE, "extLst").unwrap_or(element.children.len())
        } else {
            slot
        };

        Self {
            element,
            slot,
            transform,
            children: shapes.into_iter().map(ShapeNode::from_element).collect(),
        }
    }

    pub fn into_element(self) -> Element {
        let mut element = self.element;
        element.insert_children(self.slot, self.children.into_iter().map(ShapeNode::into_element));
        element
    }

    /// Placeholder references of the direct child shapes, with their own anchors.
    pub fn placeholders(&self) -> Vec<(Placeholder, Option<Anchor>)> {
        self.children
            .iter()
            .filter_map(|child| match child {
                ShapeNode::Text(shape) => shape.placeholder.clone().map(|ph| (ph, shape.anchor)),
                _ => None,
            })
            .collect()
    }

    pub fn get(&self, path: &[usize]) -> Option<&ShapeNode> {
        let (first, rest) = path.split_first()?;
        let node = self.children.get(*first)?;
        match (rest.is_empty(), node) {
            (true, node) => Some(node),
            (false, ShapeNode::Group(group)) => group.get(rest),
            (false, _) => None,
        }
    }

    /// Removes the node at `path`; paths into non-group nodes yield `None`.
    pub fn remove(&mut self, path: &[usize]) -> Option<ShapeNode> {
        let (last, parents) = path.split_last()?;
        let mut group = self;
        for index in parents {
            group = match group.children.get_mut(*index)? {
                ShapeNode::Group(inner) => inner,
                _ => return None,
            };
        }
        (*last < group.children.len()).then(|| group.children.remove(*last))
    }

    pub fn push(&mut self, node: ShapeNode) {
        self.children.push(node);
    }
}

/// A table row (`<a:tr>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    element: Element,
    slot: usize,
    pub height: f64,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(height: f64, cells: Vec<TableCell>) -> Self {
        Self {
            element: Element::new(A_NAMESPACE, "a", "tr"),
            slot: 0,
            height,
            cells,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let height = read_emu(&element, "h").unwrap_or(0.0);
        let (slot, cells) = element.detach_children(|el| el.is(A_NAMESPACE, "tc"));
        Self {
            element,
            slot,
            height,
            cells: cells.into_iter().map(TableCell::from_element).collect(),
        }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        element.insert_children(self.slot, self.cells.into_iter().map(TableCell::into_element));
        element
    }
}

/// A table cell (`<a:tc>`); its text body behaves like a text shape's.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    element: Element,
    body: Option<(usize, TextBody)>,
    pub grid_span: usize,
    pub row_span: usize,
}

impl TableCell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        let mut body = TextBody::new(paragraphs);
        body.element = Element::new(A_NAMESPACE, "a", "txBody");
        Self {
            element: Element::new(A_NAMESPACE, "a", "tc"),
            body: Some((0, body)),
            grid_span: 1,
            row_span: 1,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let span = |name: &str| {
            element
                .attribute(name)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1)
        };
        let grid_span = span("gridSpan");
        let row_span = span("rowSpan");
        let body = element
            .detach_child(A_NAMESPACE, "txBody")
            .map(|(slot, body)| (slot, TextBody::from_element(body)));
        Self { element, body, grid_span, row_span }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        if let Some((slot, body)) = self.body {
            element.insert_children(slot, [body.into_element()]);
        }
        element
    }

    pub fn body(&self) -> Option<&TextBody> {
        self.body.as_ref().map(|(_, body)| body)
    }

    pub fn body_mut(&mut self) -> Option<&mut TextBody> {
        self.body.as_mut().map(|(_, body)| body)
    }

    pub fn text(&self) -> String {
        self.body().map(TextBody::text).unwrap_or_default()
    }

    pub fn clear_text(&mut self) {
        if let Some(body) = self.body_mut() {
            body.clear();
        }
    }
}

/// A table (`<a:tbl>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    element: Element,
    slot: usize,
    pub column_widths: Vec<f64>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(column_widths: Vec<f64>, rows: Vec<TableRow>) -> Self {
        Self {
            element: Element::new(A_NAMESPACE, "a", "tbl"),
            slot: 0,
            column_widths,
            rows,
        }
    }

    fn from_element(mut element: Element) -> Self {
        let column_widths = element
            .child(A_NAMESPACE, "tblGrid")
            .map(|grid| {
                grid.elements()
                    .filter(|el| el.is(A_NAMESPACE, "gridCol"))
                    .map(|col| read_emu(col, "w").unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let (slot, rows) = element.detach_children(|el| el.is(A_NAMESPACE, "tr"));
        Self {
            element,
            slot,
            column_widths,
            rows: rows.into_iter().map(TableRow::from_element).collect(),
        }
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        element.insert_children(self.slot, self.rows.into_iter().map(TableRow::into_element));
        element
    }
}

/// A graphic frame hosting a table (`<p:graphicFrame>` with `<a:tbl>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TableShape {
    element: Element,
    table_path: Vec<usize>,
    pub anchor: Option<Anchor>,
    pub table: Table,
}

impl TableShape {
    pub fn new(anchor: Option<Anchor>, table: Table) -> Self {
        let graphic = Element::new(A_NAMESPACE, "a", "graphic").with_child(Element::new(A_NAMESPACE, "a", "graphicData"));
        Self {
            element: Element::new(P_NAMESPACE, "p", "graphicFrame").with_child(graphic),
            table_path: vec![0, 0, 0],
            anchor,
            table,
        }
    }

    /// Lowers a graphic frame whose table sits at `table_path`; hands the frame back otherwise.
    fn from_element(mut element: Element, table_path: Vec<usize>) -> Result<Self, Element> {
        let anchor = read_anchor(element.child(P_NAMESPACE, "xfrm"));
        let Some(tbl) = element.take_at(&table_path) else {
            return Err(element);
        };
        Ok(Self {
            element,
            table_path,
            anchor,
            table: Table::from_element(tbl),
        })
    }

    fn into_element(self) -> Element {
        let mut element = self.element;
        element.put_at(&self.table_path, self.table.into_element());
        element
    }

    /// Anchor of one cell, derived from the frame anchor, the grid column widths and the row heights.
    pub fn cell_anchor(&self, row: usize, column: usize) -> Option<Anchor> {
        let frame = self.anchor?;
        let cell = self.table.rows.get(row)?.cells.get(column)?;
        if column >= self.table.column_widths.len() {
            return None;
        }

        let widths = &self.table.column_widths;
        let rows = &self.table.rows;
        Some(Anchor {
            x: frame.x + widths[..column].iter().sum::<f64>(),
            y: frame.y + rows[..row].iter().map(|r| r.height).sum::<f64>(),
            width: widths.iter().skip(column).take(cell.grid_span).sum(),
            height: rows.iter().skip(row).take(cell.row_span).map(|r| r.height).sum(),
        })
    }
}

/// One node of a slide's shape tree.
///
/// Anything that is neither a text shape, a group nor a table is carried as `Other` and never
/// looked into.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeNode {
    Text(TextShape),
    Group(GroupShape),
    Table(TableShape),
    Other(Element),
}

impl ShapeNode {
    pub fn from_element(element: Element) -> Self {
        if element.is(P_NAMESPACE, "sp") {
            ShapeNode::Text(TextShape::from_element(element))
        } else if element.is(P_NAMESPACE, "grpSp") {
            ShapeNode::Group(GroupShape::from_element(element))
        } else if element.is(P_NAMESPACE, "graphicFrame") {
            match element.path_to(A_NAMESPACE, "tbl") {
                Some(path) => TableShape::from_element(element, path).map_or_else(ShapeNode::Other, ShapeNode::Table),
                None => ShapeNode::Other(element),
            }
        } else {
            ShapeNode::Other(element)
        }
    }

    pub fn into_element(self) -> Element {
        match self {
            ShapeNode::Text(shape) => shape.into_element(),
            ShapeNode::Group(group) => group.into_element(),
            ShapeNode::Table(table) => table.into_element(),
            ShapeNode::Other(element) => element,
        }
    }
}

/// Shape kinds that are known to carry no placeholder text.
fn is_textless_shape(element: &Element) -> bool {
    element.namespace.as_deref() == Some(P_NAMESPACE)
        && matches!(element.name.as_str(), "pic" | "cxnSp" | "graphicFrame" | "contentPart")
}

/// A place in the shape tree where placeholder text can live.
pub enum TextSite<'a> {
    Shape {
        shape: &'a mut TextShape,
        anchor: Option<Anchor>,
    },
    Cell {
        cell: &'a mut TableCell,
        row: usize,
        column: usize,
        anchor: Option<Anchor>,
    },
    /// A node the traversal does not understand; it is skipped.
    Unsupported { tag: String },
}

/// Depth-first walk over every text-bearing node below `root`, including nested groups and
/// table cells. Anchors handed to `visit` are in slide coordinates.
pub fn walk_text_sites<F>(root: &mut GroupShape, visit: &mut F)
where
    F: FnMut(&ShapePath, TextSite<'_>),
{
    walk_group(root, Transform::IDENTITY, &ShapePath::root(), visit);
}

fn walk_group<F>(group: &mut GroupShape, transform: Transform, parent: &ShapePath, visit: &mut F)
where
    F: FnMut(&ShapePath, TextSite<'_>),
{
    for (index, child) in group.children.iter_mut().enumerate() {
        let path = parent.child(index);
        match child {
            ShapeNode::Text(shape) => {
                let anchor = shape.anchor.map(|a| transform.apply(a));
                visit(&path, TextSite::Shape { shape, anchor });
            }
            ShapeNode::Group(inner) => {
                let nested = transform.then(inner.transform);
                walk_group(inner, nested, &path, visit);
            }
            ShapeNode::Table(table) => {
                for row in 0..table.table.rows.len() {
                    for column in 0..table.table.rows[row].cells.len() {
                        let anchor = table.cell_anchor(row, column).map(|a| transform.apply(a));
                        let cell = &mut table.table.rows[row].cells[column];
                        visit(&path, TextSite::Cell { cell, row, column, anchor });
                    }
                }
            }
            ShapeNode::Other(element) => {
                if !is_textless_shape(element) {
                    let tag = match &element.prefix {
                        Some(prefix) => format!("{}:{}", prefix, element.name),
                        None => element.name.clone(),
                    };
                    visit(&path, TextSite::Unsupported { tag });
                }
            }
        }
    }
}

fn read_emu(element: &Element, name: &str) -> Option<f64> {
    element.attribute(name)?.trim().parse::<i64>().ok().map(|v| v as f64)
}

fn read_point(element: &Element, x: &str, y: &str) -> Option<(f64, f64)> {
    Some((read_emu(element, x)?, read_emu(element, y)?))
}

fn read_anchor(xfrm: Option<&Element>) -> Option<Anchor> {
    let xfrm = xfrm?;
    let (x, y) = read_point(xfrm.child(A_NAMESPACE, "off")?, "x", "y")?;
    let (width, height) = read_point(xfrm.child(A_NAMESPACE, "ext")?, "cx", "cy")?;
    Some(Anchor { x, y, width, height })
}
