//! Fills placeholders in PowerPoint (`.pptx`) templates.
//!
//! Text placeholders are written as `{key}` and may be split over several formatting runs.
//! Image placeholders are written as `{IMAGE:key}`; the shape or table cell holding one is
//! replaced by the matching picture, scaled to fit and centered in the placeholder's box.
//!
//! ```no_run
//! use pptx_templater::{FillConfig, ImageAsset, ImageAssets, Templater, TextTokens};
//!
//! let template = std::fs::read("template.pptx")?;
//!
//! let mut tokens = TextTokens::new();
//! tokens.insert("name".to_string(), "Ann".to_string());
//! let mut assets = ImageAssets::new();
//! assets.insert("logo".to_string(), ImageAsset::new(Some("logo.png".into()), std::fs::read("logo.png")?));
//!
//! let filled = Templater::new(FillConfig::default()).fill_bytes(&template, &tokens, &assets)?;
//! for skipped in filled.report.skipped() {
//!     eprintln!("{skipped}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod constants;
mod container;
mod engine;
mod fit;
mod locate;
mod rels;
mod report;
mod request;
mod shape;
mod slide;
mod text;
mod types;
mod xml;

pub use config::{FillConfig, FillConfigBuilder, KeyOrder};
pub use container::PptxContainer;
pub use engine::{FillJob, Filled, Templater};
pub use fit::{fit_within, insert_image, place_image};
pub use locate::{image_placeholder, locate_image_placeholders, LocatedImages};
pub use rels::{Relationship, Relationships};
pub use report::{Diagnostic, Event, Report};
pub use request::{map_images, EncodedImage, ResolvedRequest, TemplateRequest};
pub use shape::{
    walk_text_sites, Formatting, GroupShape, Inline, Paragraph, Placeholder, Run, ShapeNode, Table, TableCell, TableRow,
    TableShape, TextBody, TextShape, TextSite, Transform,
};
pub use slide::{InheritedGeometry, Slide};
pub use text::{resolve_text, Substitutions, TextOutcome};
pub use types::*;
pub use xml::{Element, XmlNode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
