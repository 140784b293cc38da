//! Crop box computation: strategy, padding, aspect forcing, clipping.

use crate::aspect::Aspect;
use crate::error::CropError;
use crate::geometry::Rect;
use crate::strategy::{CropStrategy, PageExtents};

/// Target ratio for aspect forcing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectTarget {
    /// Keep the ratio of the page's media box.
    PreserveMedia,
    Ratio(Aspect),
}

impl AspectTarget {
    fn ratio_for(&self, media: &Rect) -> Option<f64> {
        match self {
            AspectTarget::Ratio(aspect) => Some(aspect.ratio()),
            AspectTarget::PreserveMedia if media.height() > 0.0 && media.width() > 0.0 => {
                Some(media.width() / media.height())
            }
            AspectTarget::PreserveMedia => None,
        }
    }
}

/// Per-page crop box computation.
///
/// Steps run in fixed order: raw box from the strategy (the media box when
/// the page is blank), padding, aspect forcing, clipping to the media box.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropPipeline {
    strategy: CropStrategy,
    padding: f64,
    aspect: Option<AspectTarget>,
}

impl CropPipeline {
    pub fn new(strategy: CropStrategy) -> Self {
        Self {
            strategy,
            padding: 0.0,
            aspect: None,
        }
    }

    /// Set symmetric padding in 1/72 inch.
    ///
    /// # Errors
    ///
    /// [`CropError::InvalidPadding`] if `padding` is negative or not finite.
    pub fn with_padding(mut self, padding: f64) -> Result<Self, CropError> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(CropError::InvalidPadding(padding));
        }
        self.padding = padding;
        Ok(self)
    }

    pub fn with_aspect(mut self, aspect: Option<AspectTarget>) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn strategy(&self) -> &CropStrategy {
        &self.strategy
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn aspect(&self) -> Option<AspectTarget> {
        self.aspect
    }

    /// Final crop box of `page`.
    pub fn crop_box<P: PageExtents + ?Sized>(&self, page: &P) -> Result<Rect, CropError> {
        let media = page.media_box();
        let raw = self
            .strategy
            .raw_box(page)
            .map_err(|e| e.on_page(page.page_number()))?;
        Ok(self.finish(raw, &media))
    }

    /// Apply padding, aspect forcing and clipping to a raw box.
    pub fn finish(&self, raw: Option<Rect>, media: &Rect) -> Rect {
        let mut rect = raw.unwrap_or(*media);
        if self.padding > 0.0 {
            rect = rect.outset(self.padding);
        }
        if let Some(ratio) = self.aspect.and_then(|a| a.ratio_for(media)) {
            rect = force_aspect(&rect, ratio);
        }
        clip(&rect, media)
    }
}

/// Grow `rect` along its short side until `width / height == ratio`.
///
/// Width growth is centred; height growth keeps the top edge fixed.
/// A box with no area is returned unchanged.
pub fn force_aspect(rect: &Rect, ratio: f64) -> Rect {
    let w = rect.width();
    let h = rect.height();
    if (w == 0.0 && h == 0.0) || ratio.is_nan() || ratio <= 0.0 {
        return *rect;
    }
    let mut out = *rect;
    if w < h * ratio {
        let new_w = h * ratio;
        out.min_x = rect.min_x - 0.5 * (new_w - w);
        out.max_x = out.min_x + new_w;
    } else if w > h * ratio {
        let new_h = w / ratio;
        out.min_y = rect.max_y - new_h;
    }
    out
}

/// Snap edges outside `media` back onto it. Idempotent.
pub fn clip(rect: &Rect, media: &Rect) -> Rect {
    rect.clip_to(media)
}
