//! Target aspect ratios and the named paper sizes they can be taken from.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CropError;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$|^\.\d+$").expect("valid number regex"));
static RATIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*:\s*(\d+(?:\.\d+)?)$").expect("valid ratio regex")
});

/// A named paper size in millimetres, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PaperSize {
    const fn new(name: &'static str, width_mm: f64, height_mm: f64) -> Self {
        Self {
            name,
            width_mm,
            height_mm,
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }

    /// Look a paper size up by name, ignoring ASCII case. `_` and `-` are
    /// interchangeable, so `jis_b5` finds `JIS-B5`.
    pub fn lookup(name: &str) -> Option<&'static PaperSize> {
        let wanted = name.trim().replace('_', "-");
        PAPER_SIZES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(&wanted))
    }

    pub fn all() -> &'static [PaperSize] {
        PAPER_SIZES
    }
}

static PAPER_SIZES: &[PaperSize] = &[
    PaperSize::new("A0", 841.0, 1189.0),
    PaperSize::new("A1", 594.0, 841.0),
    PaperSize::new("A2", 420.0, 594.0),
    PaperSize::new("A3", 297.0, 420.0),
    PaperSize::new("A4", 210.0, 297.0),
    PaperSize::new("A5", 148.0, 210.0),
    PaperSize::new("A6", 105.0, 148.0),
    PaperSize::new("A7", 74.0, 105.0),
    PaperSize::new("A8", 52.0, 74.0),
    PaperSize::new("A9", 37.0, 52.0),
    PaperSize::new("A10", 26.0, 37.0),
    PaperSize::new("B0", 1000.0, 1414.0),
    PaperSize::new("B1", 707.0, 1000.0),
    PaperSize::new("B2", 500.0, 707.0),
    PaperSize::new("B3", 353.0, 500.0),
    PaperSize::new("B4", 250.0, 353.0),
    PaperSize::new("B5", 176.0, 250.0),
    PaperSize::new("B6", 125.0, 176.0),
    PaperSize::new("B7", 88.0, 125.0),
    PaperSize::new("B8", 62.0, 88.0),
    PaperSize::new("B9", 44.0, 62.0),
    PaperSize::new("B10", 31.0, 44.0),
    PaperSize::new("C0", 917.0, 1297.0),
    PaperSize::new("C1", 648.0, 917.0),
    PaperSize::new("C2", 458.0, 648.0),
    PaperSize::new("C3", 324.0, 458.0),
    PaperSize::new("C4", 229.0, 324.0),
    PaperSize::new("C5", 162.0, 229.0),
    PaperSize::new("C6", 114.0, 162.0),
    PaperSize::new("C7", 81.0, 114.0),
    PaperSize::new("C8", 57.0, 81.0),
    PaperSize::new("C9", 40.0, 57.0),
    PaperSize::new("C10", 28.0, 40.0),
    PaperSize::new("Letter", 215.9, 279.4),
    PaperSize::new("Legal", 215.9, 355.6),
    PaperSize::new("Tabloid", 279.4, 431.8),
    PaperSize::new("Ledger", 431.8, 279.4),
    PaperSize::new("Executive", 184.15, 266.7),
    PaperSize::new("JIS-B4", 257.0, 364.0),
    PaperSize::new("JIS-B5", 182.0, 257.0),
];

/// A positive width/height ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aspect(f64);

impl Aspect {
    /// Wrap a ratio, rejecting zero, negative and non-finite values.
    pub fn new(ratio: f64) -> Result<Self, CropError> {
        if ratio.is_finite() && ratio > 0.0 {
            Ok(Self(ratio))
        } else {
            Err(CropError::InvalidAspectSyntax(format!(
                "ratio must be positive, got {ratio}"
            )))
        }
    }

    pub fn ratio(&self) -> f64 {
        self.0
    }

    /// Accepts a decimal ratio (`0.75`), a `W:H` pair (`3:4`) or a paper
    /// size name (`a4`).
    pub fn parse(s: &str) -> Result<Self, CropError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CropError::InvalidAspectSyntax("empty aspect".to_string()));
        }
        if NUMBER_RE.is_match(s) {
            let value: f64 = s
                .parse()
                .map_err(|_| CropError::InvalidAspectSyntax(format!("not a number: '{s}'")))?;
            return Self::new(value);
        }
        if let Some(caps) = RATIO_RE.captures(s) {
            let w: f64 = caps[1]
                .parse()
                .map_err(|_| CropError::InvalidAspectSyntax(format!("bad width in '{s}'")))?;
            let h: f64 = caps[2]
                .parse()
                .map_err(|_| CropError::InvalidAspectSyntax(format!("bad height in '{s}'")))?;
            if h == 0.0 {
                return Err(CropError::InvalidAspectSyntax(format!(
                    "zero height in '{s}'"
                )));
            }
            return Self::new(w / h);
        }
        if s.chars().any(|c| c.is_ascii_alphabetic()) {
            return PaperSize::lookup(s)
                .map(|p| Aspect(p.aspect_ratio()))
                .ok_or_else(|| CropError::UnknownPaperSize(s.to_string()));
        }
        Err(CropError::InvalidAspectSyntax(format!(
            "expected a number, W:H or a paper size, got '{s}'"
        )))
    }
}

impl FromStr for Aspect {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aspect::parse(s)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
