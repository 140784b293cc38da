//! Page margins and the lengths they are made of.

use std::fmt;
use std::str::FromStr;

use crate::error::CropError;
use crate::geometry::Rect;

/// A length in 1/72 inch, or a percentage of a reference span.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Length {
    Absolute(f64),
    /// Percentage points, so `Percent(10.0)` is a tenth of the span.
    Percent(f64),
}

impl Length {
    pub const ZERO: Length = Length::Absolute(0.0);

    /// Resolve against the span a percentage refers to.
    pub fn resolve(&self, span: f64) -> f64 {
        match *self {
            Length::Absolute(v) => v,
            Length::Percent(p) => span * p / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (number, percent) = match token.strip_suffix('%') {
            Some(rest) => (rest.trim_end(), true),
            None => (token, false),
        };
        if number.is_empty() {
            return Err(CropError::InvalidMarginSyntax(format!(
                "empty length in '{s}'"
            )));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| CropError::InvalidMarginSyntax(format!("not a number: '{token}'")))?;
        if !value.is_finite() {
            return Err(CropError::InvalidMarginSyntax(format!(
                "not a finite number: '{token}'"
            )));
        }
        Ok(if percent {
            Length::Percent(value)
        } else {
            Length::Absolute(value)
        })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Absolute(v) => write!(f, "{v}"),
            Length::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Insets on the four sides of a page.
///
/// Percentages on `top`/`bottom` refer to the page height, on
/// `left`/`right` to the page width.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(Length::ZERO)
    }
}

impl Margin {
    pub fn new(top: Length, right: Length, bottom: Length, left: Length) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(length: Length) -> Self {
        Self::new(length, length, length, length)
    }

    /// Parse the comma-separated margin literal (1 to 4 lengths).
    ///
    /// Missing sides follow the usual shorthand: one value for all sides,
    /// two for vertical/horizontal, three for top, horizontal and bottom.
    pub fn parse(s: &str) -> Result<Self, CropError> {
        if s.trim().is_empty() {
            return Err(CropError::InvalidMarginSyntax("empty margin".to_string()));
        }
        let lengths = s
            .split(',')
            .map(Length::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        match lengths[..] {
            [all] => Ok(Self::uniform(all)),
            [vertical, horizontal] => Ok(Self::new(vertical, horizontal, vertical, horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(top, horizontal, bottom, horizontal)),
            [top, right, bottom, left] => Ok(Self::new(top, right, bottom, left)),
            _ => Err(CropError::InvalidMarginSyntax(format!(
                "expected 1 to 4 values, found {} in '{s}'",
                lengths.len()
            ))),
        }
    }

    /// The same margin with left and right swapped, for facing pages.
    pub fn flip(&self) -> Self {
        Self::new(self.top, self.left, self.bottom, self.right)
    }

    /// Inset `page` by the resolved margin.
    ///
    /// Margins wider than the page collapse that axis to the point where
    /// the opposite insets meet.
    pub fn apply(&self, page: &Rect) -> Rect {
        let w = page.width();
        let h = page.height();
        Rect::from_edges(
            page.min_x + self.left.resolve(w),
            page.min_y + self.bottom.resolve(h),
            page.max_x - self.right.resolve(w),
            page.max_y - self.top.resolve(h),
        )
    }
}

impl FromStr for Margin {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Margin::parse(s)
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.top, self.right, self.bottom, self.left)
    }
}
