use crate::report::Event;
use crate::types::{ImageAsset, ImageAssets, TextTokens};
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A fill request as sent by callers of the service front end.
///
/// ```json
/// {
///   "data": { "name": "Ann" },
///   "imageMapping": { "logo": 0 },
///   "images": [{ "filename": "logo.png", "data": "iVBORw0KGgo..." }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    #[serde(default)]
    pub data: TextTokens,
    #[serde(default)]
    pub image_mapping: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub images: Vec<EncodedImage>,
}

/// An image carried inline in a request, base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodedImage {
    #[serde(default)]
    pub filename: Option<String>,
    pub data: String,
}

/// Text tokens and image assets ready for [`crate::Templater`], plus anything noticed on the way.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRequest {
    pub tokens: TextTokens,
    pub assets: ImageAssets,
    pub notices: Vec<Event>,
}

impl TemplateRequest {
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] for malformed or mistyped JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes inline images, appends `uploaded` and maps the result through `imageMapping`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Base64`] if an inline image is not valid base64. Bad mapping
    /// indices are not errors; they end up in [`ResolvedRequest::notices`].
    pub fn resolve(self, uploaded: Vec<ImageAsset>) -> Result<ResolvedRequest> {
        let mut images = Vec::with_capacity(self.images.len() + uploaded.len());
        for encoded in self.images {
            let data = STANDARD.decode(encoded.data.trim())?;
            images.push(ImageAsset::new(encoded.filename, data));
        }
        images.extend(uploaded);

        let (assets, notices) = map_images(self.image_mapping.as_ref(), &images);
        Ok(ResolvedRequest { tokens: self.data, assets, notices })
    }
}

/// Picks the image for each mapped key by its position in `images`.
pub fn map_images(mapping: Option<&BTreeMap<String, i64>>, images: &[ImageAsset]) -> (ImageAssets, Vec<Event>) {
    let mut assets = ImageAssets::new();
    let mut notices = Vec::new();

    let Some(mapping) = mapping.filter(|m| !m.is_empty()) else {
        if !images.is_empty() {
            notices.push(Event::UnmappedImages { count: images.len() });
        }
        return (assets, notices);
    };

    for (key, &index) in mapping {
        match usize::try_from(index).ok().and_then(|i| images.get(i)) {
            Some(asset) => {
                assets.insert(key.clone(), asset.clone());
            }
            None => notices.push(Event::UnmatchedIndex {
                key: key.clone(),
                index,
                available: images.len(),
            }),
        }
    }

    (assets, notices)
}
