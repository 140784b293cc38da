use pdfcrop_core::{CropError, CropPipeline, PageSelector, Rect};
use tracing::{debug, info};

use crate::document::Document;

/// Crop box computed for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageCrop {
    /// 1-based page number.
    pub page: usize,
    pub media_box: Rect,
    pub crop_box: Rect,
}

/// Crop boxes of the selected pages, in page order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropPlan {
    pub page_count: usize,
    pub pages: Vec<PageCrop>,
}

impl CropPlan {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageCrop> {
        self.pages.iter()
    }

    pub fn get(&self, page: usize) -> Option<&PageCrop> {
        self.pages.iter().find(|c| c.page == page)
    }
}

/// Runs a [`CropPipeline`] over the pages chosen by a [`PageSelector`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cropper {
    pipeline: CropPipeline,
    selector: PageSelector,
}

impl Cropper {
    /// Crop every page with `pipeline`.
    pub fn new(pipeline: CropPipeline) -> Self {
        Self {
            pipeline,
            selector: PageSelector::all(),
        }
    }

    pub fn with_selector(mut self, selector: PageSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn pipeline(&self) -> &CropPipeline {
        &self.pipeline
    }

    pub fn selector(&self) -> &PageSelector {
        &self.selector
    }

    /// Compute crop boxes without modifying the document.
    ///
    /// # Errors
    ///
    /// The error of the first failing page, in page order.
    pub fn plan(&self, doc: &Document) -> Result<CropPlan, CropError> {
        let page_count = doc.page_count();
        let pages = self.selector.pages(page_count);
        debug!(
            selected = pages.len(),
            reads_content = self.pipeline.strategy().reads_content(),
            "planning crop"
        );
        let results = self.crop_pages(doc, &pages);
        let pages = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(CropPlan { page_count, pages })
    }

    /// Compute crop boxes and write them into `doc`.
    ///
    /// Nothing is written unless every selected page succeeds.
    pub fn apply(&self, doc: &mut Document) -> Result<CropPlan, CropError> {
        let plan = self.plan(doc)?;
        for crop in &plan.pages {
            doc.set_crop_box(crop.page - 1, crop.crop_box)?;
        }
        info!(pages = plan.len(), "crop boxes written");
        Ok(plan)
    }

    fn crop_page(&self, doc: &Document, page_number: usize) -> Result<PageCrop, CropError> {
        let page = doc.page(page_number - 1)?;
        let crop_box = self.pipeline.crop_box(&page)?;
        debug!(page = page_number, ?crop_box, "crop box");
        Ok(PageCrop {
            page: page_number,
            media_box: page.media_box(),
            crop_box,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn crop_pages(&self, doc: &Document, pages: &[usize]) -> Vec<Result<PageCrop, CropError>> {
        self.crop_pages_in_order(doc, pages)
    }

    fn crop_pages_in_order(
        &self,
        doc: &Document,
        pages: &[usize],
    ) -> Vec<Result<PageCrop, CropError>> {
        // stop at the first failure; later pages are never measured
        let mut results = Vec::with_capacity(pages.len());
        for &page in pages {
            let result = self.crop_page(doc, page);
            let failed = result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    #[cfg(feature = "parallel")]
    fn crop_pages(&self, doc: &Document, pages: &[usize]) -> Vec<Result<PageCrop, CropError>> {
        use rayon::prelude::*;

        // margins only read the media box, not worth a thread each
        if !self.pipeline.strategy().reads_content() {
            return self.crop_pages_in_order(doc, pages);
        }
        pages
            .par_iter()
            .map(|&page| self.crop_page(doc, page))
            .collect()
    }
}
