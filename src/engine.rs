use crate::config::FillConfig;
use crate::container::PptxContainer;
use crate::fit::{insert_image, place_image};
use crate::locate::locate_image_placeholders;
use crate::report::{Diagnostic, Event, Report};
use crate::request::ResolvedRequest;
use crate::slide::Slide;
use crate::text::resolve_text;
use crate::types::{ImageAssets, TextTokens};
use crate::Result;
use rayon::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A filled document held in memory.
#[derive(Debug, Clone)]
pub struct Filled {
    pub bytes: Vec<u8>,
    pub report: Report,
}

/// One independent document for [`Templater::fill_batch`].
#[derive(Debug, Clone)]
pub struct FillJob {
    pub template: Vec<u8>,
    pub tokens: TextTokens,
    pub assets: ImageAssets,
}

/// Fills `{key}` and `{IMAGE:key}` placeholders in presentation templates.
///
/// Each slide is processed in three steps: text tokens are substituted, image placeholders are
/// located, then pictures are inserted and the standalone placeholder shapes removed. Problems
/// with single placeholders never abort a fill; they are recorded in the returned [`Report`].
///
/// # Example
///
/// ```no_run
/// use pptx_templater::{FillConfig, ImageAssets, Templater, TextTokens};
///
/// let template = std::fs::read("template.pptx")?;
/// let mut tokens = TextTokens::new();
/// tokens.insert("name".to_string(), "Ann".to_string());
///
/// let templater = Templater::new(FillConfig::default());
/// let filled = templater.fill_bytes(&template, &tokens, &ImageAssets::new())?;
/// std::fs::write("out.pptx", &filled.bytes)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Templater {
    config: FillConfig,
}

impl Templater {
    pub fn new(config: FillConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fills every slide of an opened package in place.
    ///
    /// # Errors
    ///
    /// Only structural failures are returned: a slide or package part that cannot be read or
    /// parsed. The container may be partially modified in that case and should be discarded.
    pub fn fill(&self, container: &mut PptxContainer, tokens: &TextTokens, assets: &ImageAssets) -> Result<Report> {
        let mut report = Report::default();
        self.fill_into(container, tokens, assets, &mut report)?;
        Ok(report)
    }

    fn fill_into(
        &self,
        container: &mut PptxContainer,
        tokens: &TextTokens,
        assets: &ImageAssets,
        report: &mut Report,
    ) -> Result<()> {
        info!(
            slides = container.slide_count,
            tokens = tokens.len(),
            images = assets.len(),
            "processing presentation"
        );

        for (index, slide_path) in container.slide_paths.clone().iter().enumerate() {
            let mut slide = container.load_slide(slide_path)?;
            self.fill_slide(container, &mut slide, index + 1, tokens, assets, report)?;
            container.store_slide(slide);
            report.slides += 1;
        }

        info!(
            slides = report.slides,
            paragraphs = report.paragraphs_rewritten,
            images = report.images_inserted,
            skipped = report.skipped().count(),
            "presentation processed"
        );
        Ok(())
    }

    fn fill_slide(
        &self,
        container: &mut PptxContainer,
        slide: &mut Slide,
        number: usize,
        tokens: &TextTokens,
        assets: &ImageAssets,
        report: &mut Report,
    ) -> Result<()> {
        debug!(slide = number, path = %slide.rel_path, "processing slide");
        let order = self.config.key_order;

        let text = resolve_text(&mut slide.shapes, tokens, order);
        for path in text.rewritten {
            report.record(Diagnostic::new(Some(number), Some(path), Event::TextReplaced));
        }
        for (path, tag) in text.unsupported {
            report.record(Diagnostic::new(Some(number), Some(path), Event::UnsupportedShape { tag }));
        }

        if !self.config.replace_images || assets.is_empty() {
            return Ok(());
        }

        if slide.has_unanchored_placeholders() {
            let geometry = container.inherited_geometry(slide)?;
            let inherited = slide.inherit_anchors(&geometry);
            debug!(slide = number, inherited, "placeholder positions taken from layout");
        }

        let located = locate_image_placeholders(&mut slide.shapes, assets, order);
        for (path, key) in located.unanchored {
            report.record(Diagnostic::new(Some(number), Some(path), Event::MissingAnchor { key }));
        }

        for pending in &located.insertions {
            let here = Some(pending.path.clone());
            report.record(Diagnostic::new(Some(number), here.clone(), Event::ImagePlaceholder { key: pending.key.clone() }));

            let anchor = match place_image(pending.asset, pending.anchor) {
                Ok(anchor) => anchor,
                Err(err) => {
                    report.record(Diagnostic::new(
                        Some(number),
                        here,
                        Event::ImageDecodeFailed { key: pending.key.clone(), reason: err.to_string() },
                    ));
                    continue;
                }
            };

            insert_image(container, slide, &pending.key, pending.asset, anchor)?;
            report.record(Diagnostic::new(
                Some(number),
                here,
                Event::ImageInserted { key: pending.key.clone(), anchor },
            ));
        }

        // removals do not depend on whether the insertion succeeded
        for path in slide.remove_shapes(&located.removals) {
            report.record(Diagnostic::new(Some(number), Some(path), Event::ShapeRemoved));
        }
        Ok(())
    }

    /// Opens a package from memory, fills it and serializes the result.
    ///
    /// # Errors
    ///
    /// See [`Templater::fill`]; additionally fails if `template` is not a readable package.
    pub fn fill_bytes(&self, template: &[u8], tokens: &TextTokens, assets: &ImageAssets) -> Result<Filled> {
        let mut container = PptxContainer::from_bytes(template)?;
        let report = self.fill(&mut container, tokens, assets)?;
        Ok(Filled { bytes: container.to_bytes()?, report })
    }

    /// Like [`Templater::fill_bytes`], with request-level notices recorded in the report first.
    pub fn fill_request(&self, template: &[u8], request: &ResolvedRequest) -> Result<Filled> {
        let mut container = PptxContainer::from_bytes(template)?;

        let mut report = Report::default();
        for notice in &request.notices {
            report.record(Diagnostic::new(None, None, notice.clone()));
        }
        self.fill_into(&mut container, &request.tokens, &request.assets, &mut report)?;

        Ok(Filled { bytes: container.to_bytes()?, report })
    }

    /// Fills a template and writes the result to a new, uniquely named temporary `.pptx` file.
    ///
    /// The file is only created once the document was produced, so a failed fill leaves nothing
    /// behind. It is deleted when the returned handle is dropped unless it is persisted.
    pub fn fill_to_temp_file(
        &self,
        template: &[u8],
        tokens: &TextTokens,
        assets: &ImageAssets,
    ) -> Result<(NamedTempFile, Report)> {
        let filled = self.fill_bytes(template, tokens, assets)?;
        let file = self.write_temp_file(&filled)?;
        Ok((file, filled.report))
    }

    /// Writes filled bytes to a new temporary file named after [`FillConfig::temp_prefix`].
    pub fn write_temp_file(&self, filled: &Filled) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .suffix(".pptx")
            .tempfile()?;
        file.write_all(&filled.bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = filled.bytes.len(), "output written");
        Ok(file)
    }

    /// Fills independent documents in parallel.
    ///
    /// Results are returned in job order; one failing job does not affect the others.
    pub fn fill_batch(&self, jobs: Vec<FillJob>) -> Vec<Result<Filled>> {
        jobs.into_par_iter()
            .map(|job| self.fill_bytes(&job.template, &job.tokens, &job.assets))
            .collect()
    }
}
