//! Fills a template with a few text tokens and an optional logo.
//!
//! Run with: cargo run --example fill_template <template.pptx> [logo.png]

use pptx_templater::{FillConfig, ImageAsset, ImageAssets, KeyOrder, Result, Templater, TextTokens};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let template_path = if args.len() > 1 {
        &args[1]
    } else {
        eprintln!("Usage: cargo run --example fill_template <template.pptx> [logo.png]");
        return Ok(());
    };

    let mut tokens = TextTokens::new();
    tokens.insert("name".to_string(), "Ann".to_string());
    tokens.insert("date".to_string(), "2024-05-01".to_string());

    let mut assets = ImageAssets::new();
    if let Some(logo) = args.get(2) {
        let filename = Path::new(logo).file_name().map(|n| n.to_string_lossy().into_owned());
        assets.insert("logo".to_string(), ImageAsset::new(filename, std::fs::read(logo)?));
    }

    // Prefer "{name_full}" over "{name}" when both keys are given
    let config = FillConfig::builder()
        .key_order(KeyOrder::LongestFirst)
        .build();

    let template = std::fs::read(template_path)?;
    let (file, report) = Templater::new(config).fill_to_temp_file(&template, &tokens, &assets)?;

    println!(
        "Filled {} slides: {} paragraphs, {} images",
        report.slides, report.paragraphs_rewritten, report.images_inserted
    );
    for diagnostic in report.skipped() {
        println!("skipped: {diagnostic}");
    }

    let (_, path) = file.keep().map_err(|e| e.error)?;
    println!("Output written to {}", path.display());

    Ok(())
}
