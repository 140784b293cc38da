use pdfcrop::{CropError, Document, Rect, TrackerMode};

use crate::cli::{BoxesArgs, OutputFormat};
use crate::shared::{fail, format_optional_rect, format_rect, open_document, page_selector};

/// Boxes of one page as reported by `pdfcrop boxes`.
struct PageBoxes {
    page: usize,
    media_box: Rect,
    crop_box: Option<Rect>,
    bbox: Option<Rect>,
    text_bbox: Option<Rect>,
}

pub fn run(args: &BoxesArgs) -> Result<(), i32> {
    let selector = page_selector(&args.pages).map_err(fail)?;
    let doc = open_document(&args.file)?;

    let mut report = Vec::new();
    for page in selector.pages(doc.page_count()) {
        report.push(page_boxes(&doc, page).map_err(fail)?);
    }

    match args.format {
        OutputFormat::Text => {
            for boxes in &report {
                println!("--- Page {} ---", boxes.page);
                println!("media:     {}", format_rect(&boxes.media_box));
                println!("crop:      {}", format_optional_rect(boxes.crop_box.as_ref()));
                println!("bbox:      {}", format_optional_rect(boxes.bbox.as_ref()));
                println!("text-bbox: {}", format_optional_rect(boxes.text_bbox.as_ref()));
            }
        }
        OutputFormat::Json => {
            for boxes in &report {
                let obj = serde_json::json!({
                    "page": boxes.page,
                    "media_box": boxes.media_box,
                    "crop_box": boxes.crop_box,
                    "bbox": boxes.bbox,
                    "text_bbox": boxes.text_bbox,
                });
                println!("{obj}");
            }
        }
    }
    Ok(())
}

fn page_boxes(doc: &Document, page_number: usize) -> Result<PageBoxes, CropError> {
    let page = doc.page(page_number - 1)?;
    Ok(PageBoxes {
        page: page_number,
        media_box: page.media_box(),
        crop_box: page.crop_box()?,
        bbox: page.vector_bounds(TrackerMode::All)?,
        text_bbox: page.vector_bounds(TrackerMode::TextOnly)?,
    })
}
