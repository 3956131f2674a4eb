use crate::constants::PACKAGE_RELS_NAMESPACE;
use crate::xml::Element;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: Option<String>,
}

/// The relationships of one package part (`_rels/*.rels`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    pub entries: Vec<Relationship>,
    modified: bool,
}

impl Relationships {
    /// Parses relationship (`.rels`) XML data.
    ///
    /// # Errors
    ///
    /// An error is returned if the data is not valid UTF-8 or not well-formed XML.
    pub fn parse(xml_data: &[u8]) -> Result<Self> {
        let root = Element::parse(xml_data)?;

        let mut entries = Vec::new();
        for rel in root.elements().filter(|n| n.name == "Relationship") {
            if let (Some(id), Some(rel_type), Some(target)) =
                (rel.attribute("Id"), rel.attribute("Type"), rel.attribute("Target"))
            {
                entries.push(Relationship {
                    id: id.to_string(),
                    rel_type: rel_type.to_string(),
                    target: target.to_string(),
                    target_mode: rel.attribute("TargetMode").map(str::to_string),
                });
            }
        }

        Ok(Self { entries, modified: false })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    /// All relationships of the given type, in document order.
    pub fn of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.entries.iter().filter(move |rel| rel.rel_type == rel_type)
    }

    /// Returns the id of an internal relationship to `target`, adding one if none exists.
    pub fn ensure(&mut self, rel_type: &str, target: &str) -> String {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|rel| rel.rel_type == rel_type && rel.target == target && rel.target_mode.is_none())
        {
            return existing.id.clone();
        }

        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: None,
        });
        self.modified = true;
        id
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn next_id(&self) -> String {
        let highest = self
            .entries
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        let mut candidate = highest + 1;
        while self.get(&format!("rId{candidate}")).is_some() {
            candidate += 1;
        }
        format!("rId{candidate}")
    }

    pub fn to_part_bytes(&self) -> Vec<u8> {
        let mut root = Element::new(PACKAGE_RELS_NAMESPACE, "", "Relationships");
        root.declarations.push((None, PACKAGE_RELS_NAMESPACE.to_string()));

        for rel in &self.entries {
            let mut el = Element::new(PACKAGE_RELS_NAMESPACE, "", "Relationship")
                .with_attribute("Id", rel.id.as_str())
                .with_attribute("Type", rel.rel_type.as_str())
                .with_attribute("Target", rel.target.as_str());
            if let Some(mode) = &rel.target_mode {
                el.set_attribute("TargetMode", mode.as_str());
            }
            root.push(el);
        }

        root.to_part_bytes()
    }
}

/// Resolves a relationship target against the directory of the part that owns it.
///
/// `resolve_target("ppt/slides/slide1.xml", "../media/image1.png")` yields `ppt/media/image1.png`;
/// absolute targets (`/ppt/...`) are taken from the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    }
    let dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(dir.split('/').chain(target.split('/')))
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Relationship target that points from `source_part` to `target_part`.
///
/// This is the inverse of [`resolve_target`]: from `ppt/slides/slide1.xml` the part
/// `ppt/media/image1.png` is reached as `../media/image1.png`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = source_part
        .rsplit_once('/')
        .map(|(dir, _)| dir.split('/').collect())
        .unwrap_or_default();
    let to: Vec<&str> = target_part.split('/').collect();

    let common = from
        .iter()
        .zip(&to[..to.len().saturating_sub(1)])
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments = vec![".."; from.len() - common];
    segments.extend(&to[common..]);
    segments.join("/")
}

/// Path of the relationships part that belongs to `part`.
///
/// For `ppt/slides/slide1.xml` this is `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}
