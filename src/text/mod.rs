//! # Styled Text
//!
//! Plain text plus a set of non-owning formatting spans. A span is a tag
//! (bold, font size, link, ...) with an optional value and a list of byte
//! ranges into the text. Ranges of one tag need not be sorted or contiguous.
//!
//! Every operation that cuts or joins text moves the ranges along with it,
//! so for each byte of the original text the set of tags painted over it is
//! the same before and after, wherever that byte ends up.

pub mod measure;
pub mod metrics;

pub use measure::{
    FontDescription, LineMetrics, MeasureRequest, TextMeasurer, TextMetrics, WrapMode,
};
pub use metrics::{FontMetrics, MetricsMeasurer};

use serde::{Deserialize, Serialize};

use crate::error::{QuireError, Result};

/// The formatting a span applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagKind {
    Bold,
    Italic,
    Underline,
    Superscript,
    /// Value: family name.
    FontFace,
    /// Value: size in points.
    FontSize,
    /// Value: `#rrggbb`.
    FontColor,
    /// Value: `#rrggbb`.
    Highlight,
    /// Value: target URL.
    Link,
}

/// One formatting span over a set of byte ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTag {
    pub kind: TagKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub ranges: Vec<(usize, usize)>,
}

impl TextTag {
    pub fn new(kind: TagKind, ranges: Vec<(usize, usize)>) -> Self {
        Self {
            kind,
            value: None,
            ranges,
        }
    }

    pub fn with_value(kind: TagKind, value: &str, ranges: Vec<(usize, usize)>) -> Self {
        Self {
            kind,
            value: Some(value.to_string()),
            ranges,
        }
    }

    /// Does this tag paint the byte at `offset`?
    pub fn covers(&self, offset: usize) -> bool {
        self.ranges.iter().any(|&(s, e)| s <= offset && offset < e)
    }

    fn same_format(&self, other: &TextTag) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

/// Text with formatting spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyledText {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<TextTag>,
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        StyledText::plain(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self {
            text,
            tags: Vec::new(),
        }
    }
}

impl StyledText {
    /// Text without any formatting.
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tags: Vec::new(),
        }
    }

    /// Text with spans. Every range must be non-empty, lie inside the text
    /// and start and end on character boundaries.
    pub fn new(text: &str, tags: Vec<TextTag>) -> Result<Self> {
        let styled = Self {
            text: text.to_string(),
            tags,
        };
        styled.validate()?;
        Ok(styled)
    }

    /// Check the span invariant `0 <= start < end <= len` on char boundaries.
    pub fn validate(&self) -> Result<()> {
        let len = self.text.len();
        for tag in &self.tags {
            for &(start, end) in &tag.ranges {
                if start >= end
                    || end > len
                    || !self.text.is_char_boundary(start)
                    || !self.text.is_char_boundary(end)
                {
                    return Err(QuireError::InvalidSpan { start, end, len });
                }
            }
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn tags(&self) -> &[TextTag] {
        &self.tags
    }

    /// Tags painted over the byte at `offset`.
    pub fn tags_at(&self, offset: usize) -> impl Iterator<Item = &TextTag> {
        self.tags.iter().filter(move |t| t.covers(offset))
    }

    /// Paint `kind` over `range`, merging into an existing tag of the same
    /// kind and value.
    pub fn add_tag(
        &mut self,
        kind: TagKind,
        value: Option<&str>,
        range: (usize, usize),
    ) -> Result<()> {
        let (start, end) = range;
        let len = self.text.len();
        if start >= end
            || end > len
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return Err(QuireError::InvalidSpan { start, end, len });
        }
        let tag = TextTag {
            kind,
            value: value.map(str::to_string),
            ranges: vec![range],
        };
        self.merge_tag(tag);
        Ok(())
    }

    /// Append unformatted text.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append another styled text, shifting its spans by the current length.
    pub fn push_styled(&mut self, other: StyledText) {
        let shift = self.text.len();
        self.text.push_str(&other.text);
        for mut tag in other.tags {
            for range in &mut tag.ranges {
                range.0 += shift;
                range.1 += shift;
            }
            self.merge_tag(tag);
        }
    }

    fn merge_tag(&mut self, tag: TextTag) {
        match self.tags.iter_mut().find(|t| t.same_format(&tag)) {
            Some(existing) => existing.ranges.extend(tag.ranges),
            None => self.tags.push(tag),
        }
    }

    /// Split the text at byte offset `at`. `self` keeps `[0, at)` with its
    /// spans clipped to that range; the returned text holds `[at, len)` with
    /// spans shifted left by `at`. Tags left without ranges are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `at` is past the end or not on a char boundary, like
    /// [`String::split_off`].
    pub fn split_off(&mut self, at: usize) -> StyledText {
        let tail_text = self.text.split_off(at);
        let tail_len = tail_text.len();

        let mut tail_tags = Vec::new();
        for tag in &mut self.tags {
            let tail_ranges = clip_ranges(&tag.ranges, at, at + tail_len, at);
            if !tail_ranges.is_empty() {
                tail_tags.push(TextTag {
                    kind: tag.kind,
                    value: tag.value.clone(),
                    ranges: tail_ranges,
                });
            }
            tag.ranges = clip_ranges(&tag.ranges, 0, at, 0);
        }
        self.tags.retain(|t| !t.ranges.is_empty());

        StyledText {
            text: tail_text,
            tags: tail_tags,
        }
    }
}

/// Intersect each range with `[lo, hi)` and shift the result left by `shift`.
fn clip_ranges(
    ranges: &[(usize, usize)],
    lo: usize,
    hi: usize,
    shift: usize,
) -> Vec<(usize, usize)> {
    ranges
        .iter()
        .filter_map(|&(s, e)| {
            let s = s.max(lo);
            let e = e.min(hi);
            (s < e).then(|| (s - shift, e - shift))
        })
        .collect()
}
