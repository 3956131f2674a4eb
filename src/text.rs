use crate::config::KeyOrder;
use crate::shape::{walk_text_sites, GroupShape, Paragraph, TextSite};
use crate::types::{ShapePath, TextTokens};

/// What a text pass changed, reported back to the caller instead of being logged here.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextOutcome {
    /// One entry per rewritten paragraph, naming the shape that holds it.
    pub rewritten: Vec<ShapePath>,
    /// Nodes that were skipped because the traversal does not understand them.
    pub unsupported: Vec<(ShapePath, String)>,
}

/// `{key}` placeholders paired with their replacement, in substitution order.
pub struct Substitutions<'t> {
    pairs: Vec<(String, &'t str)>,
}

impl<'t> Substitutions<'t> {
    pub fn new(tokens: &'t TextTokens, order: KeyOrder) -> Self {
        let pairs = order
            .arrange(tokens)
            .into_iter()
            .map(|(key, value)| (format!("{{{key}}}"), value.as_str()))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replaces every literal occurrence of each placeholder, one key after the other.
    ///
    /// Each key gets a single left-to-right pass, so a value that contains its own placeholder
    /// is not expanded again.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (placeholder, value) in &self.pairs {
            if result.contains(placeholder.as_str()) {
                result = result.replace(placeholder.as_str(), value);
            }
        }
        result
    }

    /// Rewrites one paragraph.
    ///
    /// The runs between two line breaks (or fields) are merged first because a placeholder may
    /// be split over several runs by formatting. When the merged text of such a stretch changes,
    /// all of it goes to the stretch's first run (keeping that run's formatting) and its other
    /// runs are emptied. Breaks stay between the texts they separated. Returns `true` if the
    /// paragraph changed.
    pub fn apply_to_paragraph(&self, paragraph: &mut Paragraph) -> bool {
        let mut changed = false;
        for mut segment in paragraph.segments_mut() {
            let original: String = segment.iter().map(|run| run.text.as_str()).collect();
            if !original.contains('{') {
                continue;
            }

            let replaced = self.apply(&original);
            if replaced == original {
                continue;
            }

            let mut runs = segment.iter_mut();
            if let Some(first) = runs.next() {
                first.text = replaced;
            }
            for run in runs {
                run.text.clear();
            }
            changed = true;
        }
        changed
    }
}

/// Substitutes `{key}` placeholders in every paragraph reachable from `root`.
pub fn resolve_text(root: &mut GroupShape, tokens: &TextTokens, order: KeyOrder) -> TextOutcome {
    let substitutions = Substitutions::new(tokens, order);
    let mut outcome = TextOutcome::default();

    walk_text_sites(root, &mut |path, site| {
        let body = match site {
            TextSite::Shape { shape, .. } => shape.body_mut(),
            TextSite::Cell { cell, .. } => cell.body_mut(),
            TextSite::Unsupported { tag } => {
                outcome.unsupported.push((path.clone(), tag));
                return;
            }
        };

        if substitutions.is_empty() {
            return;
        }
        if let Some(body) = body {
            for paragraph in &mut body.paragraphs {
                if substitutions.apply_to_paragraph(paragraph) {
                    outcome.rewritten.push(path.clone());
                }
            }
        }
    });

    outcome
}
