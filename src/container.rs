use super::{Error, Result, Slide};
use crate::constants::{
    CONTENT_TYPES_NAMESPACE, CONTENT_TYPES_PATH, MEDIA_DIR, PRESENTATION_PATH, P_NAMESPACE, RELS_NAMESPACE,
    SLIDE_LAYOUT_NAMESPACE, SLIDE_MASTER_NAMESPACE, SLIDE_NAMESPACE,
};
use crate::rels::{rels_path_for, resolve_target, Relationships};
use crate::slide::InheritedGeometry;
use crate::types::ImageAsset;
use crate::xml::Element;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// One archive member, held in memory until the package is written again.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// Holds the internal representation of a loaded PowerPoint (pptx) container.
///
/// `PptxContainer` reads every member of the archive into memory so that slides, relationships
/// and media can be rewritten and the package saved again. Members that are never touched are
/// written back byte for byte, in their original order.
#[derive(Debug, Clone)]
pub struct PptxContainer {
    entries: Vec<Entry>,
    /// Media part written for each image key.
    media: HashMap<String, String>,
    pub slide_paths: Vec<String>,
    pub slide_count: u32,
}

impl PptxContainer {
    /// Opens a PowerPoint pptx file and initializes a `PptxContainer`.
    ///
    /// # Errors
    ///
    /// Errors are returned on file access problems or when the file is not a readable package.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Loads a package from memory.
    ///
    /// Slides are listed in presentation order (`ppt/presentation.xml`, `<p:sldIdLst>`). Packages
    /// without a usable slide list fall back to the numeric order of `ppt/slides/slideN.xml`.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not a zip archive, or if `ppt/presentation.xml` or its relationships are
    /// not well-formed XML.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data: content,
            });
        }

        let mut container = Self {
            entries,
            media: HashMap::new(),
            slide_paths: Vec::new(),
            slide_count: 0,
        };
        container.slide_paths = container.discover_slides()?;
        container.slide_count = container.slide_paths.len() as u32;
        Ok(container)
    }

    fn discover_slides(&self) -> Result<Vec<String>> {
        let ordered = self.slides_in_presentation_order()?;
        if !ordered.is_empty() {
            return Ok(ordered);
        }

        let mut slide_paths: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .filter(|name| Slide::extract_slide_number(name).is_some() && name.starts_with("ppt/slides/slide"))
            .map(str::to_string)
            .collect();
        slide_paths.sort_by_key(|name| Slide::extract_slide_number(name));
        Ok(slide_paths)
    }

    fn slides_in_presentation_order(&self) -> Result<Vec<String>> {
        let (Some(presentation), Some(rels_data)) =
            (self.read(PRESENTATION_PATH), self.read(&rels_path_for(PRESENTATION_PATH)))
        else {
            return Ok(Vec::new());
        };

        let root = Element::parse(presentation)?;
        let rels = Relationships::parse(rels_data)?;

        let Some(list) = root.child(P_NAMESPACE, "sldIdLst") else {
            return Ok(Vec::new());
        };

        Ok(list
            .elements()
            .filter(|el| el.is(P_NAMESPACE, "sldId"))
            .filter_map(|el| el.attribute_ns(RELS_NAMESPACE, "id"))
            .filter_map(|id| rels.get(id))
            .filter(|rel| rel.rel_type == SLIDE_NAMESPACE)
            .map(|rel| resolve_target(PRESENTATION_PATH, &rel.target))
            .filter(|path| self.contains(path))
            .collect())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.read(path).is_some()
    }

    /// Reads a file from the PPTX archive by its internal path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPart`] if the package has no such member.
    pub fn read_file_from_archive(&self, path: &str) -> Result<&[u8]> {
        self.read(path).ok_or_else(|| Error::MissingPart(path.to_string()))
    }

    fn read(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| !entry.is_dir && entry.name == path)
            .map(|entry| entry.data.as_slice())
    }

    /// Replaces the content of a member, or appends a new deflated member.
    pub fn write_file(&mut self, path: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|entry| !entry.is_dir && entry.name == path) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: path.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Loads a slide and its relationships from the package.
    ///
    /// # Errors
    ///
    /// Fails if the slide part is missing or cannot be parsed.
    pub fn load_slide(&self, slide_path: &str) -> Result<Slide> {
        let slide_data = self.read_file_from_archive(slide_path)?;
        let rels_data = self.read(&rels_path_for(slide_path));
        Slide::parse(slide_data, slide_path.to_string(), rels_data)
    }

    /// Placeholder positions from the slide's layout and the layout's master.
    ///
    /// A slide without a layout part (or a layout without a master) inherits nothing.
    ///
    /// # Errors
    ///
    /// Fails if a linked layout or master part is not well-formed.
    pub fn inherited_geometry(&self, slide: &Slide) -> Result<InheritedGeometry> {
        let mut geometry = InheritedGeometry::default();
        let Some(layout) = self.linked_part(&slide.rel_path, &slide.rels, SLIDE_LAYOUT_NAMESPACE)? else {
            return Ok(geometry);
        };
        geometry.layout = layout.shapes.placeholders();

        if let Some(master) = self.linked_part(&layout.rel_path, &layout.rels, SLIDE_MASTER_NAMESPACE)? {
            geometry.master = master.shapes.placeholders();
        }
        Ok(geometry)
    }

    fn linked_part(&self, source: &str, rels: &Relationships, rel_type: &str) -> Result<Option<Slide>> {
        let target = rels
            .of_type(rel_type)
            .map(|rel| resolve_target(source, &rel.target))
            .find(|path| self.contains(path));
        match target {
            Some(path) => self.load_slide(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Writes a slide back into the package.
    ///
    /// The relationships part is only rewritten when relationships were added.
    pub fn store_slide(&mut self, slide: Slide) {
        let (path, data, rels) = slide.into_part_bytes();
        if rels.is_modified() {
            self.write_file(&rels_path_for(&path), rels.to_part_bytes());
        }
        self.write_file(&path, data);
    }

    /// Stores an image as a new media part and returns its path inside the package.
    ///
    /// The part is named `ppt/media/image<N>.<ext>` with the first free `N`, and a `Default`
    /// content type for the extension is registered if the package has none yet.
    ///
    /// # Errors
    ///
    /// Fails if `[Content_Types].xml` is missing or malformed.
    pub fn add_media(&mut self, asset: &ImageAsset) -> Result<String> {
        let format = asset.format();
        self.ensure_content_type(format.extension(), format.content_type())?;

        let mut n = self
            .entries
            .iter()
            .filter(|entry| entry.name.starts_with(MEDIA_DIR))
            .count()
            + 1;
        let path = loop {
            let candidate = format!("{MEDIA_DIR}/image{n}.{}", format.extension());
            if !self.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };

        self.write_file(&path, asset.data.clone());
        Ok(path)
    }

    /// Media part for an image key, stored on first use.
    ///
    /// A key is only reused while its bytes are unchanged; a different asset under the same
    /// key gets a part of its own.
    pub fn media_part_for(&mut self, key: &str, asset: &ImageAsset) -> Result<String> {
        if let Some(part) = self.media.get(key) {
            if self.read(part) == Some(asset.data.as_slice()) {
                return Ok(part.clone());
            }
        }
        let part = self.add_media(asset)?;
        self.media.insert(key.to_string(), part.clone());
        Ok(part)
    }

    fn ensure_content_type(&mut self, extension: &str, content_type: &str) -> Result<()> {
        let mut root = Element::parse(self.read_file_from_archive(CONTENT_TYPES_PATH)?)?;

        let registered = root.elements().any(|el| {
            el.is(CONTENT_TYPES_NAMESPACE, "Default")
                && el.attribute("Extension").is_some_and(|e| e.eq_ignore_ascii_case(extension))
        });
        if registered {
            return Ok(());
        }

        let default = root
            .sibling("Default")
            .with_attribute("Extension", extension)
            .with_attribute("ContentType", content_type);
        // defaults go before the first override
        let at = root
            .position(CONTENT_TYPES_NAMESPACE, "Override")
            .unwrap_or(root.children.len());
        root.insert_children(at, [default]);

        self.write_file(CONTENT_TYPES_PATH, root.to_part_bytes());
        Ok(())
    }

    /// Serializes the package into a new zip archive.
    ///
    /// # Errors
    ///
    /// Fails only if the zip writer fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
