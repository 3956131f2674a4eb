use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use pptx_templater::{FillConfig, ImageAsset, KeyOrder, TemplateRequest, Templater};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "pptx-fill", version, about = "Fill {key} and {IMAGE:key} placeholders in a .pptx template")]
struct Cli {
    /// Template presentation.
    template: PathBuf,

    /// Request JSON with `data`, `imageMapping` and optional inline `images`.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Image file; indices in `imageMapping` count inline images first, then these in order.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Output path. Without it the result goes to a new temporary file whose path is printed.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Order in which overlapping keys are tried.
    #[arg(long, value_enum, default_value_t = Order::Lexicographic)]
    key_order: Order,

    /// Leave image placeholders untouched.
    #[arg(long, default_value_t = false)]
    no_images: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    Lexicographic,
    LongestFirst,
}

impl From<Order> for KeyOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Lexicographic => KeyOrder::Lexicographic,
            Order::LongestFirst => KeyOrder::LongestFirst,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let template = fs::read(&cli.template)
        .with_context(|| format!("read template {}", cli.template.display()))?;

    let request = match &cli.request {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("read request {}", path.display()))?;
            TemplateRequest::from_json(&json).with_context(|| format!("parse request {}", path.display()))?
        }
        None => TemplateRequest::default(),
    };

    let uploaded = cli
        .images
        .iter()
        .map(|path| {
            let data = fs::read(path).with_context(|| format!("read image {}", path.display()))?;
            let filename = path.file_name().map(|name| name.to_string_lossy().into_owned());
            Ok(ImageAsset::new(filename, data))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let resolved = request.resolve(uploaded).context("decode request images")?;

    let config = FillConfig::builder()
        .key_order(cli.key_order.into())
        .replace_images(!cli.no_images)
        .build();
    let templater = Templater::new(config);

    let filled = templater
        .fill_request(&template, &resolved)
        .with_context(|| format!("fill {}", cli.template.display()))?;

    let written = match cli.out {
        Some(path) => {
            fs::write(&path, &filled.bytes).with_context(|| format!("write {}", path.display()))?;
            path
        }
        None => {
            let file = templater.write_temp_file(&filled).context("write temporary output")?;
            let (_, path) = file.keep().context("keep temporary output")?;
            path
        }
    };

    let report = &filled.report;
    eprintln!(
        "{} slides, {} paragraphs rewritten, {} images inserted, {} skipped",
        report.slides,
        report.paragraphs_rewritten,
        report.images_inserted,
        report.skipped().count()
    );
    for skipped in report.skipped() {
        eprintln!("  {skipped}");
    }
    println!("{}", written.display());

    Ok(())
}
