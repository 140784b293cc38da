use std::path::Path;

use pdfcrop::{CropError, Document, PageSelector, Parity, Rect};

use crate::cli::PageArgs;

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found
/// or cannot be parsed as a valid PDF.
pub fn open_document(file: &Path) -> Result<Document, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Document::open_file(file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Build the page selector from `--pages`, `--even` and `--odd`.
pub fn page_selector(args: &PageArgs) -> Result<PageSelector, CropError> {
    let selector = match args.pages.as_deref() {
        Some(literal) => literal.parse()?,
        None => PageSelector::all(),
    };
    let parity = if args.even {
        Parity::Even
    } else if args.odd {
        Parity::Odd
    } else {
        Parity::All
    };
    Ok(selector.with_parity(parity))
}

/// Print an error to stderr and return the failure exit code.
pub fn fail(err: impl std::fmt::Display) -> i32 {
    eprintln!("Error: {err}");
    1
}

/// `x0 y0 x1 y1` with two decimals.
pub fn format_rect(rect: &Rect) -> String {
    format!(
        "{:.2} {:.2} {:.2} {:.2}",
        rect.min_x, rect.min_y, rect.max_x, rect.max_y
    )
}

pub fn format_optional_rect(rect: Option<&Rect>) -> String {
    rect.map_or_else(|| "-".to_string(), format_rect)
}
