use crate::config::KeyOrder;
use crate::shape::{walk_text_sites, GroupShape, TextSite};
use crate::types::{ImageAsset, ImageAssets, PendingImageInsertion, ShapePath};

/// Result of scanning one shape tree for `{IMAGE:key}` placeholders.
///
/// Nothing is inserted or removed while scanning, with one exception: a matching table cell
/// has its text cleared right away, because cells stay in place and only lose their text.
#[derive(Debug, Default)]
pub struct LocatedImages<'a> {
    /// Standalone shapes whose placeholder will be replaced by a picture.
    pub removals: Vec<ShapePath>,
    pub insertions: Vec<PendingImageInsertion<'a>>,
    /// Placeholders without a usable position, even after layout inheritance, with their key.
    pub unanchored: Vec<(ShapePath, String)>,
    pub unsupported: Vec<(ShapePath, String)>,
}

impl LocatedImages<'_> {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }
}

/// The literal placeholder for an image key, e.g. `{IMAGE:logo}`.
pub fn image_placeholder(key: &str) -> String {
    format!("{{IMAGE:{key}}}")
}

/// Finds every text shape and table cell that contains an image placeholder for one of `assets`.
///
/// Only one placeholder is honored per shape or cell: the keys are tried in `order` and the
/// first one present wins.
pub fn locate_image_placeholders<'a>(
    root: &mut GroupShape,
    assets: &'a ImageAssets,
    order: KeyOrder,
) -> LocatedImages<'a> {
    let candidates: Vec<(String, &'a str, &'a ImageAsset)> = order
        .arrange(assets)
        .into_iter()
        .map(|(key, asset)| (image_placeholder(key), key, asset))
        .collect();

    let mut located = LocatedImages::default();
    if candidates.is_empty() {
        return located;
    }

    let first_match = |text: &str| {
        candidates
            .iter()
            .find(|(placeholder, _, _)| text.contains(placeholder.as_str()))
            .map(|(_, key, asset)| (*key, *asset))
    };

    walk_text_sites(root, &mut |path, site| match site {
        TextSite::Shape { shape, anchor } => {
            let Some((key, asset)) = first_match(&shape.text()) else {
                return;
            };
            let Some(anchor) = anchor else {
                located.unanchored.push((path.clone(), key.to_string()));
                return;
            };
            located.removals.push(path.clone());
            located.insertions.push(PendingImageInsertion {
                key: key.to_string(),
                asset,
                anchor,
                path: path.clone(),
                cell: None,
            });
        }
        TextSite::Cell { cell, row, column, anchor } => {
            let Some((key, asset)) = first_match(&cell.text()) else {
                return;
            };
            let Some(anchor) = anchor else {
                located.unanchored.push((path.clone(), key.to_string()));
                return;
            };
            cell.clear_text();
            located.insertions.push(PendingImageInsertion {
                key: key.to_string(),
                asset,
                anchor,
                path: path.clone(),
                cell: Some((row, column)),
            });
        }
        TextSite::Unsupported { tag } => located.unsupported.push((path.clone(), tag)),
    });

    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Paragraph, Run, ShapeNode, Table, TableCell, TableRow, TableShape, TextShape};
    use crate::types::Anchor;

    fn asset() -> ImageAsset {
        ImageAsset::new(Some("logo.png".into()), Vec::new())
    }

    fn assets(keys: &[&str]) -> ImageAssets {
        keys.iter().map(|k| (k.to_string(), asset())).collect()
    }

    fn text_shape(anchor: Option<Anchor>, text: &str) -> ShapeNode {
        ShapeNode::Text(TextShape::new(anchor, vec![Paragraph::new(vec![Run::new(text)])]))
    }

    #[test]
    fn test_standalone_shape_is_marked_for_removal() {
        let anchor = Anchor::new(10.0, 10.0, 100.0, 50.0);
        let mut root = GroupShape::new(vec![text_shape(None, "title"), text_shape(Some(anchor), "{IMAGE:logo}")]);
        let assets = assets(&["logo"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());

        assert_eq!(located.removals, vec![ShapePath(vec![1])]);
        assert_eq!(located.insertions.len(), 1);
        assert_eq!(located.insertions[0].key, "logo");
        assert_eq!(located.insertions[0].anchor, anchor);
        assert_eq!(located.insertions[0].cell, None);
    }

    #[test]
    fn test_placeholder_split_over_runs_is_found() {
        let paragraph = Paragraph::new(vec![Run::new("{IMA"), Run::new("GE:lo"), Run::new("go}")]);
        let anchor = Anchor::new(0.0, 0.0, 10.0, 10.0);
        let mut root = GroupShape::new(vec![ShapeNode::Text(TextShape::new(Some(anchor), vec![paragraph]))]);
        let assets = assets(&["logo"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());
        assert_eq!(located.insertions.len(), 1);
    }

    #[test]
    fn test_first_key_wins_per_shape() {
        let anchor = Anchor::new(0.0, 0.0, 10.0, 10.0);
        let mut root = GroupShape::new(vec![text_shape(Some(anchor), "{IMAGE:zeta} {IMAGE:alpha}")]);
        let assets = assets(&["alpha", "zeta"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());

        assert_eq!(located.insertions.len(), 1);
        assert_eq!(located.insertions[0].key, "alpha");
        assert_eq!(located.removals.len(), 1);
    }

    #[test]
    fn test_table_cell_is_cleared_not_removed() {
        let cells = vec![
            TableCell::new(vec![Paragraph::new(vec![Run::new("name")])]),
            TableCell::new(vec![Paragraph::new(vec![Run::new("{IMAGE:sig}")])]),
        ];
        let table = Table::new(vec![100.0, 80.0], vec![TableRow::new(40.0, cells)]);
        let frame = Anchor::new(1000.0, 2000.0, 180.0, 40.0);
        let mut root = GroupShape::new(vec![ShapeNode::Table(TableShape::new(Some(frame), table))]);
        let assets = assets(&["sig"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());

        assert!(located.removals.is_empty());
        assert_eq!(located.insertions.len(), 1);
        assert_eq!(located.insertions[0].anchor, Anchor::new(1100.0, 2000.0, 80.0, 40.0));
        assert_eq!(located.insertions[0].cell, Some((0, 1)));

        let ShapeNode::Table(table) = &root.children[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.table.rows[0].cells[1].text(), "");
        assert_eq!(table.table.rows[0].cells[0].text(), "name");
    }

    #[test]
    fn test_groups_are_searched_but_never_removed() {
        let anchor = Anchor::new(5.0, 5.0, 10.0, 10.0);
        let group = GroupShape::new(vec![text_shape(Some(anchor), "{IMAGE:logo}")]);
        let mut root = GroupShape::new(vec![ShapeNode::Group(group)]);
        let assets = assets(&["logo"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());
        assert_eq!(located.removals, vec![ShapePath(vec![0, 0])]);
    }

    #[test]
    fn test_unknown_keys_and_missing_anchor() {
        let mut root = GroupShape::new(vec![text_shape(None, "{IMAGE:logo}"), text_shape(None, "{IMAGE:other}")]);
        let assets = assets(&["logo"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());

        assert!(located.is_empty());
        assert_eq!(located.unanchored, vec![(ShapePath(vec![0]), "logo".to_string())]);
    }

    #[test]
    fn test_second_pass_finds_nothing() {
        let anchor = Anchor::new(0.0, 0.0, 10.0, 10.0);
        let mut root = GroupShape::new(vec![text_shape(Some(anchor), "{IMAGE:logo}")]);
        let assets = assets(&["logo"]);

        let located = locate_image_placeholders(&mut root, &assets, KeyOrder::default());
        for path in located.removals.iter().rev() {
            root.remove(path.indices());
        }

        let again = locate_image_placeholders(&mut root, &assets, KeyOrder::default());
        assert!(again.is_empty());
    }
}
