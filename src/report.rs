use crate::types::{Anchor, ShapePath};
use std::fmt;

/// Something that happened while filling a template.
///
/// Most events are informational; the rest describe placeholders that were skipped, and are
/// reported through [`Report::skipped`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A paragraph's text changed.
    TextReplaced,
    /// An `{IMAGE:key}` placeholder was found.
    ImagePlaceholder { key: String },
    ImageInserted { key: String, anchor: Anchor },
    ImageDecodeFailed { key: String, reason: String },
    /// The placeholder shape has no position of its own.
    MissingAnchor { key: String },
    UnsupportedShape { tag: String },
    /// A mapping entry points past the end of the supplied images.
    UnmatchedIndex { key: String, index: i64, available: usize },
    /// Images were supplied but no mapping names them.
    UnmappedImages { count: usize },
    ShapeRemoved,
}

impl Event {
    /// Whether the event means some placeholder was left as it was.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Event::ImageDecodeFailed { .. }
                | Event::MissingAnchor { .. }
                | Event::UnsupportedShape { .. }
                | Event::UnmatchedIndex { .. }
                | Event::UnmappedImages { .. }
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::TextReplaced => write!(f, "text replaced"),
            Event::ImagePlaceholder { key } => write!(f, "image placeholder '{key}' found"),
            Event::ImageInserted { key, anchor } => write!(
                f,
                "image '{key}' inserted at ({:.0}, {:.0}) size {:.0}x{:.0}",
                anchor.x, anchor.y, anchor.width, anchor.height
            ),
            Event::ImageDecodeFailed { key, reason } => write!(f, "image '{key}' could not be decoded: {reason}"),
            Event::MissingAnchor { key } => write!(f, "placeholder '{key}' has no position, skipped"),
            Event::UnsupportedShape { tag } => write!(f, "unsupported shape <{tag}> not searched"),
            Event::UnmatchedIndex { key, index, available } => {
                write!(f, "image index {index} for '{key}' out of bounds ({available} images)")
            }
            Event::UnmappedImages { count } => write!(f, "{count} images supplied without a mapping, ignored"),
            Event::ShapeRemoved => write!(f, "placeholder shape removed"),
        }
    }
}

/// An event and where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based slide number in presentation order; `None` for request-level events.
    pub slide: Option<usize>,
    pub path: Option<ShapePath>,
    pub event: Event,
}

impl Diagnostic {
    pub fn new(slide: Option<usize>, path: Option<ShapePath>, event: Event) -> Self {
        Self { slide, path, event }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(slide) = self.slide {
            write!(f, "slide {slide} ")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path} ")?;
        }
        write!(f, "{}", self.event)
    }
}

/// Summary of one template fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub slides: usize,
    pub paragraphs_rewritten: usize,
    pub images_inserted: usize,
    pub shapes_removed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Records a diagnostic, updates the counters and emits it as a tracing event.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic.event {
            Event::TextReplaced => self.paragraphs_rewritten += 1,
            Event::ImageInserted { .. } => self.images_inserted += 1,
            Event::ShapeRemoved => self.shapes_removed += 1,
            _ => {}
        }

        let slide = diagnostic.slide.unwrap_or(0);
        let path = diagnostic.path.as_ref().map(ToString::to_string).unwrap_or_default();
        match &diagnostic.event {
            event if event.is_skip() => tracing::warn!(slide, path = %path, "{event}"),
            event @ Event::ImageInserted { .. } => tracing::info!(slide, path = %path, "{event}"),
            event => tracing::debug!(slide, path = %path, "{event}"),
        }

        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics for placeholders that were left untouched.
    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.event.is_skip())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.diagnostics.iter().map(|d| &d.event)
    }
}
