use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Crop PDF pages to a margin, their content bounding box or their rendered ink.
#[derive(Debug, Parser)]
#[command(name = "pdfcrop", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute crop boxes and write them to a new PDF
    Crop(CropArgs),

    /// Print media box, crop box and content bounding boxes per page
    Boxes(BoxesArgs),
}

#[derive(Debug, Args)]
pub struct CropArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output PDF path
    #[arg(short, long, value_name = "OUT", required_unless_present = "dry_run")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Margin used on even pages instead of the main strategy
    #[arg(long, value_name = "M")]
    pub even_margin: Option<String>,

    /// Use the mirrored strategy on even pages (margins swap left and right)
    #[arg(long)]
    pub flip: bool,

    /// Padding added around the computed box, in 1/72 inch
    #[arg(long, value_name = "PT", default_value_t = 0.0)]
    pub padding: f64,

    #[command(flatten)]
    pub aspect: AspectArgs,

    #[command(flatten)]
    pub pages: PageArgs,

    /// Compute and print crop boxes without writing a file
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Where the raw crop box comes from. At most one may be given.
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct SourceArgs {
    /// Margin inset from the media box: 1-4 comma-separated lengths, '%' for
    /// a percentage of the page (e.g. '36', '10%', '20,40', '1,2,3,4')
    #[arg(long, value_name = "M")]
    pub margin: Option<String>,

    /// Bounding box of all drawn content
    #[arg(long)]
    pub bbox: bool,

    /// Bounding box of text only
    #[arg(long)]
    pub text_bbox: bool,

    /// Bounding box of non-white pixels of the rendered page
    #[arg(long)]
    pub raster_bbox: bool,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct AspectArgs {
    /// Grow crop boxes to an aspect ratio: '1.5', '4:3' or a paper size like 'a4'
    #[arg(long, value_name = "A")]
    pub aspect: Option<String>,

    /// Grow crop boxes to the aspect ratio of each page's media box
    #[arg(long)]
    pub preserve_aspect: bool,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Pages to process (e.g. '1,3-5', '-1', 'b2:', '--3'). Default: all pages
    #[arg(long, value_name = "SEL", allow_hyphen_values = true)]
    pub pages: Option<String>,

    /// Only even pages
    #[arg(long, conflicts_with = "odd")]
    pub even: bool,

    /// Only odd pages
    #[arg(long)]
    pub odd: bool,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct BoxesArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub pages: PageArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
