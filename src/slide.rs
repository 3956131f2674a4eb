use crate::constants::{A_NAMESPACE, P_NAMESPACE, RELS_NAMESPACE};
use crate::rels::Relationships;
use crate::shape::{GroupShape, Placeholder, ShapeNode};
use crate::types::{Anchor, ShapePath};
use crate::xml::Element;
use crate::{Error, Result};

/// Placeholder geometry a slide inherits from its layout and that layout's master.
#[derive(Debug, Clone, Default)]
pub struct InheritedGeometry {
    pub layout: Vec<(Placeholder, Option<Anchor>)>,
    pub master: Vec<(Placeholder, Option<Anchor>)>,
}

impl InheritedGeometry {
    /// Position of the layout placeholder matching `placeholder`, or of the master placeholder
    /// the layout placeholder itself inherits from.
    pub fn anchor_for(&self, placeholder: &Placeholder) -> Option<Anchor> {
        match placeholder.find_in(&self.layout) {
            Some((_, Some(anchor))) => Some(*anchor),
            Some((layout, None)) => self.master_anchor(layout),
            None => self.master_anchor(placeholder),
        }
    }

    fn master_anchor(&self, placeholder: &Placeholder) -> Option<Anchor> {
        self.master
            .iter()
            .find(|(candidate, _)| candidate.master_kind() == placeholder.master_kind())
            .and_then(|(_, anchor)| *anchor)
    }
}

/// One slide part, lowered into a mutable shape tree.
///
/// The slide owns its `<p:spTree>` as [`GroupShape`]; everything else in the part is kept as
/// markup and written back unchanged.
#[derive(Debug)]
pub struct Slide {
    pub rel_path: String,
    pub slide_number: u32,
    pub shapes: GroupShape,
    pub rels: Relationships,
    root: Element,
    tree_path: Vec<usize>,
    next_shape_id: u32,
}

impl Slide {
    /// Parses slide XML and its optional relationships data.
    ///
    /// # Errors
    ///
    /// Fails if either part is not well-formed XML, or if the slide has no `<p:cSld>/<p:spTree>`.
    pub fn parse(xml: &[u8], rel_path: String, rels_data: Option<&[u8]>) -> Result<Slide> {
        let slide_number = Self::extract_slide_number(&rel_path).unwrap_or(0);
        let mut root = Element::parse(xml)?;

        let c_sld_index = root
            .position(P_NAMESPACE, "cSld")
            .ok_or_else(|| Error::Parse(format!("No <p:cSld> tag was found in {rel_path}")))?;
        let sp_tree_index = root
            .child(P_NAMESPACE, "cSld")
            .and_then(|c_sld| c_sld.position(P_NAMESPACE, "spTree"))
            .ok_or_else(|| Error::Parse(format!("No <p:spTree> tag was found in {rel_path}")))?;
        let tree_path = vec![c_sld_index, sp_tree_index];

        let mut highest_id = 0;
        root.walk(&mut |el| {
            if el.is(P_NAMESPACE, "cNvPr") {
                if let Some(id) = el.attribute("id").and_then(|id| id.parse::<u32>().ok()) {
                    highest_id = highest_id.max(id);
                }
            }
        });

        let tree = root
            .take_at(&tree_path)
            .ok_or_else(|| Error::Parse(format!("No <p:spTree> tag was found in {rel_path}")))?;

        let rels = match rels_data {
            Some(data) => Relationships::parse(data)?,
            None => Relationships::default(),
        };

        Ok(Slide {
            rel_path,
            slide_number,
            shapes: GroupShape::from_element(tree),
            rels,
            root,
            tree_path,
            next_shape_id: highest_id.saturating_add(1),
        })
    }

    pub(crate) fn extract_slide_number(path: &str) -> Option<u32> {
        path
            .split('/')
            .last()
            .and_then(|filename| {
                filename
                    .strip_prefix("slide")
                    .and_then(|s| s.strip_suffix(".xml"))
            })
            .and_then(|num_str| num_str.parse::<u32>().ok())
    }

    /// Whether a top-level placeholder shape has no position of its own.
    pub fn has_unanchored_placeholders(&self) -> bool {
        self.shapes.placeholders().iter().any(|(_, anchor)| anchor.is_none())
    }

    /// Gives top-level placeholder shapes without a position the position they inherit.
    ///
    /// Returns the number of shapes that received an anchor.
    pub fn inherit_anchors(&mut self, geometry: &InheritedGeometry) -> usize {
        let mut inherited = 0;
        for child in &mut self.shapes.children {
            let ShapeNode::Text(shape) = child else {
                continue;
            };
            if shape.anchor.is_some() {
                continue;
            }
            if let Some(anchor) = shape.placeholder.as_ref().and_then(|ph| geometry.anchor_for(ph)) {
                shape.anchor = Some(anchor);
                inherited += 1;
            }
        }
        inherited
    }

    /// Appends a picture to the slide's top-level shape list.
    ///
    /// `rel_id` must point at the image part in [`Slide::rels`]. Returns the new shape's id.
    pub fn add_picture(&mut self, rel_id: &str, description: &str, anchor: Anchor) -> u32 {
        let p = self.prefix(P_NAMESPACE, "p");
        let a = self.prefix(A_NAMESPACE, "a");
        let r = self.prefix(RELS_NAMESPACE, "r");

        let id = self.next_shape_id;
        self.next_shape_id = self.next_shape_id.saturating_add(1);

        let non_visual = Element::new(P_NAMESPACE, &p, "nvPicPr")
            .with_child(
                Element::new(P_NAMESPACE, &p, "cNvPr")
                    .with_attribute("id", id.to_string())
                    .with_attribute("name", format!("Picture {id}"))
                    .with_attribute("descr", description),
            )
            .with_child(
                Element::new(P_NAMESPACE, &p, "cNvPicPr")
                    .with_child(Element::new(A_NAMESPACE, &a, "picLocks").with_attribute("noChangeAspect", "1")),
            )
            .with_child(Element::new(P_NAMESPACE, &p, "nvPr"));

        let mut blip = Element::new(A_NAMESPACE, &a, "blip");
        blip.set_attribute_ns(RELS_NAMESPACE, &r, "embed", rel_id);
        let blip_fill = Element::new(P_NAMESPACE, &p, "blipFill")
            .with_child(blip)
            .with_child(Element::new(A_NAMESPACE, &a, "stretch").with_child(Element::new(A_NAMESPACE, &a, "fillRect")));

        let xfrm = Element::new(A_NAMESPACE, &a, "xfrm")
            .with_child(
                Element::new(A_NAMESPACE, &a, "off")
                    .with_attribute("x", emu(anchor.x))
                    .with_attribute("y", emu(anchor.y)),
            )
            .with_child(
                Element::new(A_NAMESPACE, &a, "ext")
                    .with_attribute("cx", emu(anchor.width))
                    .with_attribute("cy", emu(anchor.height)),
            );
        let shape_properties = Element::new(P_NAMESPACE, &p, "spPr").with_child(xfrm).with_child(
            Element::new(A_NAMESPACE, &a, "prstGeom")
                .with_attribute("prst", "rect")
                .with_child(Element::new(A_NAMESPACE, &a, "avLst")),
        );

        let picture = Element::new(P_NAMESPACE, &p, "pic")
            .with_child(non_visual)
            .with_child(blip_fill)
            .with_child(shape_properties);

        self.shapes.push(ShapeNode::Other(picture));
        id
    }

    /// Removes the shapes at `paths` and returns the paths that actually existed.
    ///
    /// Paths are applied deepest and right-most first so that earlier removals never shift the
    /// indices of later ones.
    pub fn remove_shapes(&mut self, paths: &[ShapePath]) -> Vec<ShapePath> {
        let mut ordered = paths.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut removed = Vec::with_capacity(ordered.len());
        for path in ordered.into_iter().rev() {
            if self.shapes.remove(path.indices()).is_some() {
                removed.push(path);
            }
        }
        removed.reverse();
        removed
    }

    /// Writes the shape tree back into the slide part and serializes it.
    pub fn into_part_bytes(self) -> (String, Vec<u8>, Relationships) {
        let mut root = self.root;
        root.put_at(&self.tree_path, self.shapes.into_element());
        (self.rel_path, root.to_part_bytes(), self.rels)
    }

    /// Prefix declared for `uri` on the slide root, declaring `fallback` when there is none.
    fn prefix(&mut self, uri: &str, fallback: &str) -> String {
        match self.root.declared_prefix(uri) {
            Some(Some(prefix)) => prefix.to_string(),
            Some(None) => String::new(),
            None => {
                self.root.declare(fallback, uri);
                fallback.to_string()
            }
        }
    }
}

fn emu(value: f64) -> String {
    (value.round() as i64).to_string()
}
