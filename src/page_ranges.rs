//! Page ranges
//!
//! One-based, inclusive page selections as the service expects them:
//! `{"start": 3, "end": 4}` for a closed range, `{"start": 5}` for "page 5
//! to the end of the document".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl PageRange {
    fn validate(&self) -> Result<(), String> {
        if self.start == 0 {
            return Err("page numbers start at 1".to_string());
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(format!("page range {}-{} ends before it starts", self.start, end));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRanges {
    ranges: Vec<PageRange>,
}

impl PageRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single_page(&mut self, page: u32) -> &mut Self {
        self.ranges.push(PageRange {
            start: page,
            end: Some(page),
        });
        self
    }

    pub fn add_range(&mut self, start: u32, end: u32) -> &mut Self {
        self.ranges.push(PageRange {
            start,
            end: Some(end),
        });
        self
    }

    /// All pages from `start` to the end of the document.
    pub fn add_all_from(&mut self, start: u32) -> &mut Self {
        self.ranges.push(PageRange { start, end: None });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        self.ranges.iter().try_for_each(PageRange::validate)
    }
}

impl FromIterator<PageRange> for PageRanges {
    fn from_iter<I: IntoIterator<Item = PageRange>>(iter: I) -> Self {
        PageRanges {
            ranges: iter.into_iter().collect(),
        }
    }
}
