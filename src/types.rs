use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;

/// Text placeholder values keyed by the name used inside `{key}`.
pub type TextTokens = BTreeMap<String, String>;

/// Image assets keyed by the name used inside `{IMAGE:key}`.
pub type ImageAssets = BTreeMap<String, ImageAsset>;

/// Position and size of a shape in slide coordinates (EMU).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Child indices leading from a slide's root shape list to a shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShapePath(pub Vec<usize>);

impl ShapePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ShapePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// Picture formats accepted for inserted images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
}

impl PictureFormat {
    /// Best-effort format guess from a filename extension (case-insensitive).
    ///
    /// This looks at the name only, never at the bytes. Unknown or missing extensions map to PNG.
    pub fn from_filename(filename: Option<&str>) -> Self {
        let extension = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => PictureFormat::Jpeg,
            Some("png") => PictureFormat::Png,
            Some("gif") => PictureFormat::Gif,
            Some("bmp") => PictureFormat::Bmp,
            Some("tif") | Some("tiff") => PictureFormat::Tiff,
            _ => PictureFormat::Png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Jpeg => "jpeg",
            PictureFormat::Png => "png",
            PictureFormat::Gif => "gif",
            PictureFormat::Bmp => "bmp",
            PictureFormat::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PictureFormat::Jpeg => "image/jpeg",
            PictureFormat::Png => "image/png",
            PictureFormat::Gif => "image/gif",
            PictureFormat::Bmp => "image/bmp",
            PictureFormat::Tiff => "image/tiff",
        }
    }
}

/// An image supplied by the caller for an `{IMAGE:key}` placeholder.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl ImageAsset {
    pub fn new(filename: Option<String>, data: Vec<u8>) -> Self {
        Self { filename, data }
    }

    pub fn format(&self) -> PictureFormat {
        PictureFormat::from_filename(self.filename.as_deref())
    }

    /// Decodes the image header and returns its pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes are not a readable image and
    /// [`Error::InvalidImage`] for images with a zero dimension.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let reader = image::io::Reader::new(Cursor::new(&self.data)).with_guessed_format()?;
        let (width, height) = reader.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!("image has a zero dimension ({width}x{height})")));
        }
        Ok((width, height))
    }
}

/// An image placeholder found on a slide, waiting to be replaced by its asset.
#[derive(Debug, Clone)]
pub struct PendingImageInsertion<'a> {
    pub key: String,
    pub asset: &'a ImageAsset,
    pub anchor: Anchor,
    pub path: ShapePath,
    /// Row and column when the placeholder sat in a table cell.
    pub cell: Option<(usize, usize)>,
}
