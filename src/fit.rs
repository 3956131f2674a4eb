use crate::constants::IMAGE_NAMESPACE;
use crate::container::PptxContainer;
use crate::rels::relative_target;
use crate::slide::Slide;
use crate::types::{Anchor, ImageAsset};
use crate::Result;

/// Scales an image of `pixel_width` x `pixel_height` to fit inside `target` and centers it.
///
/// The scale factor is the smaller of the two axis ratios, so the result never leaves the
/// target box and keeps the source aspect ratio. One dimension always fills the box exactly.
pub fn fit_within(pixel_width: u32, pixel_height: u32, target: Anchor) -> Anchor {
    let image_width = f64::from(pixel_width);
    let image_height = f64::from(pixel_height);

    let scale_x = target.width / image_width;
    let scale_y = target.height / image_height;
    let scale = scale_x.min(scale_y);

    let width = image_width * scale;
    let height = image_height * scale;

    Anchor {
        x: target.x + (target.width - width) / 2.0,
        y: target.y + (target.height - height) / 2.0,
        width,
        height,
    }
}

/// Decodes the asset's pixel size and fits it into `target`.
///
/// # Errors
///
/// Fails when the image bytes cannot be decoded.
pub fn place_image(asset: &ImageAsset, target: Anchor) -> Result<Anchor> {
    let (width, height) = asset.dimensions()?;
    Ok(fit_within(width, height, target))
}

/// Adds `asset` to the package and places it on the slide at `anchor`.
///
/// The media part is shared with earlier insertions of the same key and bytes. Returns the new
/// picture's shape id.
///
/// # Errors
///
/// Fails if the package content types cannot be updated.
pub fn insert_image(
    container: &mut PptxContainer,
    slide: &mut Slide,
    key: &str,
    asset: &ImageAsset,
    anchor: Anchor,
) -> Result<u32> {
    let part = container.media_part_for(key, asset)?;
    let rel_id = slide.rels.ensure(IMAGE_NAMESPACE, &relative_target(&slide.rel_path, &part));
    Ok(slide.add_picture(&rel_id, key, anchor))
}
