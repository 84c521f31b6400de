//! Geometric primitives attached to span groups.
//!
//! Boxes are axis-aligned rectangles in page-relative normalized coordinates.
//! A [`BoxGroup`] is the geometric footprint of one span group, generally one
//! box per text line per page.

pub mod merge;

pub use merge::{merge_boxes, BoxMerger};

use serde::{Deserialize, Serialize};

use crate::span::SpanType;

/// A rectangle on a single page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    /// X coordinate of the left edge
    pub left: f32,
    /// Y coordinate of the top edge
    pub top: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
    /// Zero-based page index
    pub page: usize,
}

impl PageBox {
    /// Create a new box from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_sents::geometry::PageBox;
    ///
    /// let b = PageBox::new(0.1, 0.2, 0.5, 0.05, 0);
    /// assert_eq!(b.width, 0.5);
    /// assert_eq!(b.page, 0);
    /// ```
    pub fn new(left: f32, top: f32, width: f32, height: f32, page: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
            page,
        }
    }

    /// Create a box from two corner points on a page.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_sents::geometry::PageBox;
    ///
    /// let b = PageBox::from_points(0.25, 0.5, 0.75, 1.0, 2);
    /// assert_eq!(b.width, 0.5);
    /// assert_eq!(b.height, 0.5);
    /// assert_eq!(b.page, 2);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32, page: usize) -> Self {
        Self {
            left: x0,
            top: y0,
            width: x1 - x0,
            height: y1 - y0,
            page,
        }
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Compute the union of this box with another.
    ///
    /// Returns the smallest box that contains both. The page of `self` is kept;
    /// callers only union boxes that share a page.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_sents::geometry::PageBox;
    ///
    /// let b1 = PageBox::new(0.0, 0.0, 0.5, 0.5, 0);
    /// let b2 = PageBox::new(0.25, 0.25, 0.5, 0.5, 0);
    /// let union = b1.union(&b2);
    ///
    /// assert_eq!(union.left, 0.0);
    /// assert_eq!(union.right(), 0.75);
    /// assert_eq!(union.bottom(), 0.75);
    /// ```
    pub fn union(&self, other: &PageBox) -> PageBox {
        let x0 = self.left.min(other.left);
        let y0 = self.top.min(other.top);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        PageBox::from_points(x0, y0, x1, y1, self.page)
    }
}

/// The geometric footprint of a span group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    /// Boxes making up the footprint, in no particular order
    pub boxes: Vec<PageBox>,
    /// Optional label, usually the upstream layout classification
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpanType>,
}

impl BoxGroup {
    /// Create a box group from boxes and an optional label.
    pub fn new(boxes: Vec<PageBox>, kind: Option<SpanType>) -> Self {
        Self { boxes, kind }
    }

    /// Union two box groups; `self`'s label takes precedence.
    pub fn union(&self, other: &BoxGroup) -> BoxGroup {
        let mut boxes = self.boxes.clone();
        boxes.extend(other.boxes.iter().copied());
        BoxGroup {
            boxes,
            kind: self.kind.or(other.kind),
        }
    }
}
