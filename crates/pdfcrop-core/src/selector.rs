//! Page selection: `"1,3-5,-1"`, `"b2:"`, `"--3"` and parity filters.
//!
//! Selectors are parsed once and stored in their literal form. Indices
//! counted from the back are resolved against a concrete page count by
//! [`PageSelector::matcher`], so one parsed selector can be reused across
//! documents of different lengths.

use std::str::FromStr;

use crate::error::CropError;

/// A 1-indexed page position, counted from the front or (negative) from the back.
///
/// `-1` is the last page. Literal indices are never zero; a normalized
/// index of `0` names a position before the first page and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageIndex(i64);

impl PageIndex {
    pub const FIRST: PageIndex = PageIndex(1);
    pub const LAST: PageIndex = PageIndex(-1);

    pub fn from_front(page: usize) -> Self {
        PageIndex(page as i64)
    }

    /// `from_back(1)` is the last page.
    pub fn from_back(k: usize) -> Self {
        PageIndex(-(k as i64))
    }

    pub fn is_from_back(&self) -> bool {
        self.0 < 0
    }

    /// Resolve against a document of `total` pages.
    pub fn normalize(&self, total: usize) -> PageIndex {
        if self.0 >= 0 {
            *self
        } else {
            PageIndex((total as i64 + self.0 + 1).max(0))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// One comma-separated item of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageRange {
    Single(PageIndex),
    /// Inclusive on both ends.
    Bounded { first: PageIndex, last: PageIndex },
}

impl PageRange {
    /// Resolve back indices. Normalizing twice gives the same range.
    pub fn normalize(&self, total: usize) -> PageRange {
        match *self {
            PageRange::Single(index) => PageRange::Single(index.normalize(total)),
            PageRange::Bounded { first, last } => PageRange::Bounded {
                first: first.normalize(total),
                last: last.normalize(total),
            },
        }
    }

    /// Inclusive `(first, last)` bounds after normalization.
    fn resolved_bounds(&self, total: usize) -> (i64, i64) {
        match self.normalize(total) {
            PageRange::Single(index) => (index.value(), index.value()),
            PageRange::Bounded { first, last } => (first.value(), last.value()),
        }
    }
}

impl FromStr for PageRange {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(range_error(format!("empty page range in '{s}'")));
        }
        if let Some(value) = lex_bound(token) {
            return Ok(PageRange::Single(checked_index(value, token)?));
        }
        for (pos, ch) in token.char_indices() {
            if ch != '-' && ch != ':' {
                continue;
            }
            let left = token[..pos].trim();
            let right = token[pos + 1..].trim();
            let first = if left.is_empty() {
                Some(1)
            } else {
                lex_bound(left)
            };
            let last = if right.is_empty() {
                Some(-1)
            } else {
                lex_bound(right)
            };
            if let (Some(first), Some(last)) = (first, last) {
                return Ok(PageRange::Bounded {
                    first: checked_index(first, token)?,
                    last: checked_index(last, token)?,
                });
            }
        }
        Err(range_error(format!("invalid page range: '{token}'")))
    }
}

/// Lexes `12`, `-12` or `b12` into a signed index. Zero is returned as is.
fn lex_bound(s: &str) -> Option<i64> {
    let (digits, sign) = if let Some(rest) = s.strip_prefix('-') {
        (rest.trim_start(), -1)
    } else if let Some(rest) = s.strip_prefix('b') {
        (rest.trim_start(), -1)
    } else {
        (s, 1)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(|v| sign * v)
}

fn checked_index(value: i64, token: &str) -> Result<PageIndex, CropError> {
    if value == 0 {
        return Err(range_error(format!(
            "page 0 is invalid (pages start at 1) in '{token}'"
        )));
    }
    Ok(PageIndex(value))
}

fn range_error(message: String) -> CropError {
    CropError::InvalidPageRangeSyntax(message)
}

/// Additional even/odd page filter, ANDed with the range match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    #[default]
    All,
    Even,
    Odd,
}

impl Parity {
    pub fn accepts(&self, page: usize) -> bool {
        match self {
            Parity::All => true,
            Parity::Even => page % 2 == 0,
            Parity::Odd => page % 2 == 1,
        }
    }
}

/// An ordered list of page ranges plus a parity filter.
///
/// An empty range list selects every page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSelector {
    ranges: Vec<PageRange>,
    parity: Parity,
}

impl PageSelector {
    /// Selects every page.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(ranges: Vec<PageRange>) -> Self {
        Self {
            ranges,
            parity: Parity::All,
        }
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }

    /// Resolve the selector against a document of `total` pages.
    pub fn matcher(&self, total: usize) -> PageMatcher {
        PageMatcher {
            bounds: self
                .ranges
                .iter()
                .map(|r| r.resolved_bounds(total))
                .collect(),
            parity: self.parity,
        }
    }

    /// Selected 1-indexed page numbers of a `total`-page document, in order.
    pub fn pages(&self, total: usize) -> Vec<usize> {
        let matcher = self.matcher(total);
        (1..=total).filter(|&p| matcher.matches(p)).collect()
    }
}

impl FromStr for PageSelector {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(range_error("empty page selector".to_string()));
        }
        let ranges = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(PageRange::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageSelector::new(ranges))
    }
}

/// A selector resolved for one document; cheap to evaluate per page.
#[derive(Debug, Clone)]
pub struct PageMatcher {
    bounds: Vec<(i64, i64)>,
    parity: Parity,
}

impl PageMatcher {
    /// Whether the 1-indexed `page` is selected.
    pub fn matches(&self, page: usize) -> bool {
        if !self.parity.accepts(page) {
            return false;
        }
        if self.bounds.is_empty() {
            return true;
        }
        let page = page as i64;
        self.bounds
            .iter()
            .any(|&(first, last)| first <= page && page <= last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(literal: &str, total: usize) -> Vec<usize> {
        literal.parse::<PageSelector>().unwrap().pages(total)
    }

    fn matches(literal: &str, page: usize, total: usize) -> bool {
        literal
            .parse::<PageSelector>()
            .unwrap()
            .matcher(total)
            .matches(page)
    }

    #[test]
    fn single_page() {
        assert!(matches("42", 42, 100));
        assert!(!matches("42", 27, 100));
    }

    #[test]
    fn negative_single_counts_from_back() {
        assert!(matches("-1", 100, 100));
        assert!(matches("-2", 99, 100));
        assert!(!matches("-2", 100, 100));
        assert!(matches("b1", 100, 100));
        assert!(matches("b 3", 98, 100));
    }

    #[test]
    fn comma_separated() {
        assert_eq!(selected("1,2,4", 100), vec![1, 2, 4]);
        assert_eq!(selected("3,-1", 5), vec![3, 5]);
    }

    #[test]
    fn bounded_range_with_dash_or_colon() {
        assert_eq!(selected("3-8", 20), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(selected("3:8", 20), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn back_indexed_upper_bound() {
        let pages = selected("3--2", 100);
        assert_eq!(pages.first(), Some(&3));
        assert_eq!(pages.last(), Some(&99));
        assert_eq!(pages.len(), 97);
        assert_eq!(selected("3:b2", 100), pages);
    }

    #[test]
    fn omitted_bounds() {
        assert_eq!(selected("5-", 7), vec![5, 6, 7]);
        assert_eq!(selected(":3", 7), vec![1, 2, 3]);
        assert_eq!(selected("--3", 7), vec![1, 2, 3, 4, 5]);
        assert_eq!(selected("-", 3), vec![1, 2, 3]);
    }

    #[test]
    fn multiple_ranges() {
        assert!(matches("11:20,31:40", 31, 100));
        assert!(!matches("11:20,31:40", 30, 100));
    }

    #[test]
    fn whitespace_tolerance() {
        assert_eq!(selected(" 1 , 3 - 5 ", 5), vec![1, 3, 4, 5]);
    }

    #[test]
    fn duplicates_are_harmless() {
        assert_eq!(selected("1,1,2,1-2", 5), vec![1, 2]);
    }

    #[test]
    fn back_index_matches_same_page_as_front_index() {
        for total in 1..=12 {
            for k in 1..=total {
                let back = PageSelector::new(vec![PageRange::Single(PageIndex::from_back(k))]);
                let front = PageSelector::new(vec![PageRange::Single(PageIndex::from_front(
                    total - k + 1,
                ))]);
                assert_eq!(back.pages(total), front.pages(total), "N={total} k={k}");
            }
        }
    }

    #[test]
    fn empty_selector_matches_every_page() {
        for total in 1..=10 {
            let matcher = PageSelector::all().matcher(total);
            assert!((1..=total).all(|p| matcher.matches(p)));
        }
    }

    #[test]
    fn back_index_past_front_matches_nothing() {
        assert_eq!(selected("-10", 3), Vec::<usize>::new());
        assert_eq!(selected("-10:-9", 3), Vec::<usize>::new());
    }

    #[test]
    fn parity_is_anded_with_ranges() {
        let sel: PageSelector = "2-7".parse().unwrap();
        assert_eq!(sel.clone().with_parity(Parity::Even).pages(10), vec![2, 4, 6]);
        assert_eq!(sel.with_parity(Parity::Odd).pages(10), vec![3, 5, 7]);
        assert_eq!(PageSelector::all().with_parity(Parity::Odd).pages(5), vec![1, 3, 5]);
    }

    #[test]
    fn normalize_is_idempotent_and_keeps_literal() {
        let range: PageRange = "b3-b1".parse().unwrap();
        let once = range.normalize(10);
        assert_eq!(once.normalize(10), once);
        assert_eq!(
            once,
            PageRange::Bounded {
                first: PageIndex::from_front(8),
                last: PageIndex::from_front(10)
            }
        );
        assert_eq!(
            range,
            PageRange::Bounded {
                first: PageIndex::from_back(3),
                last: PageIndex::LAST
            }
        );
        let far: PageRange = "-20".parse().unwrap();
        let n = far.normalize(5);
        assert_eq!(n.normalize(5), n);
    }

    #[test]
    fn page_zero_is_invalid() {
        for bad in ["0", "b0", "-0", "0-3", "2:0"] {
            let err = bad.parse::<PageSelector>().unwrap_err();
            assert!(err.to_string().contains("page 0"), "'{bad}' gave {err}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["", "  ", "abc", "1-2-3", "x:4", "1.5", "3 4"] {
            let err = bad.parse::<PageSelector>().unwrap_err();
            assert!(
                matches!(err, CropError::InvalidPageRangeSyntax(_)),
                "'{bad}' gave {err:?}"
            );
        }
    }
}
