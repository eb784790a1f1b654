//! Row-packing flow layout.
//!
//! Elements are packed left to right in insertion order and wrap onto a new
//! row when the next one would overrun the padded container width. Each row is
//! then placed horizontally per [`FlowAlignment`] and the rows are stacked
//! vertically per [`VerticalAlignment`], with every element centered on its
//! row's horizontal center line.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use lattice_layout::{FlowAlignment, FlowLayout, LayoutElement, LayoutManager, Leaf, Surface};
//!
//! let surface = Rc::new(RefCell::new(Surface::new(215, 100)));
//! let mut flow = FlowLayout::new()
//!     .with_alignment(FlowAlignment::Left)
//!     .with_hgap(5)
//!     .with_hpadding(5);
//!
//! let a = Rc::new(RefCell::new(Leaf::new(95, 20)));
//! let b = Rc::new(RefCell::new(Leaf::new(95, 20)));
//! flow.add_element(a.clone());
//! flow.add_element(b.clone());
//! flow.set_container(surface);
//!
//! assert_eq!(a.borrow().bounds().x, 5);
//! assert_eq!(b.borrow().bounds().x, 105);
//! ```

use std::fmt;
use std::ops::Range;

use lattice_core::geometry::{Point, Size};
use lattice_core::{debug, trace};

use crate::anchor::text_enum;
use crate::element::{
    ContainerHandle, ElementHandle, bound_container, descend, focus_owner, restore_focus,
    same_element, usable_size,
};
use crate::LayoutManager;

/// Default horizontal and vertical gap between elements.
pub const DEFAULT_GAP: u16 = 5;

/// Default padding between the container edges and the content.
pub const DEFAULT_PADDING: u16 = 5;

/// Horizontal placement of each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "String"))]
pub enum FlowAlignment {
    /// Flush left, `hgap` apart.
    Left,
    /// Unused width split into `n + 1` equal gaps around and between elements.
    #[default]
    Center,
    /// Row kept rigid with `hgap` spacing and centered as a block.
    CenterStatic,
    /// Flush right, `hgap` apart.
    Right,
}

/// Vertical placement of the stack of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "String"))]
pub enum VerticalAlignment {
    /// First row starts at `vpadding`; rows are `vgap` apart.
    #[default]
    Top,
    /// Unused height split into `rows + 1` equal gaps.
    Center,
    /// Rows kept `vgap` apart and centered as a block.
    CenterStatic,
    /// Rows kept `vgap` apart; last row ends `vpadding` above the bottom edge.
    Bottom,
}

impl FlowAlignment {
    pub const ALL: [Self; 4] = [Self::Left, Self::Center, Self::CenterStatic, Self::Right];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::CenterStatic => "center-static",
            Self::Right => "right",
        }
    }

    /// Leading offset and extra per-slot gap for a row with `free` unused
    /// pixels and `count` elements.
    const fn row_spacing(self, free: i32, count: i32) -> (i32, i32) {
        match self {
            Self::Left => (0, 0),
            Self::Right => (free, 0),
            Self::CenterStatic => (free / 2, 0),
            Self::Center => {
                let slot = free / (count + 1);
                (slot, slot)
            }
        }
    }
}

impl VerticalAlignment {
    pub const ALL: [Self; 4] = [Self::Top, Self::Center, Self::CenterStatic, Self::Bottom];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::CenterStatic => "center-static",
            Self::Bottom => "bottom",
        }
    }
}

text_enum!(FlowAlignment, "flow alignment");
text_enum!(VerticalAlignment, "vertical alignment");

/// Split `widths` into rows no wider than `max_width`.
///
/// An element that alone exceeds `max_width` still gets a row of its own.
/// Returned ranges index into `widths` and cover it exactly, in order.
pub fn pack_rows(widths: &[i32], max_width: i32, hgap: i32) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut running = 0;

    for (i, &width) in widths.iter().enumerate() {
        if running + width + hgap > max_width {
            if start == i {
                // Nothing on this row yet: the element gets a row to itself.
                rows.push(i..i + 1);
                start = i + 1;
                running = 0;
            } else {
                rows.push(start..i);
                start = i;
                running = width + hgap;
            }
        } else {
            running += width + hgap;
        }
    }

    if start < widths.len() {
        rows.push(start..widths.len());
    }
    rows
}

/// A flow layout over an insertion-ordered list of elements.
pub struct FlowLayout {
    alignment: FlowAlignment,
    vertical_alignment: VerticalAlignment,
    hgap: u16,
    vgap: u16,
    hpadding: u16,
    vpadding: u16,
    elements: Vec<ElementHandle>,
    container: Option<ContainerHandle>,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            alignment: FlowAlignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            hgap: DEFAULT_GAP,
            vgap: DEFAULT_GAP,
            hpadding: DEFAULT_PADDING,
            vpadding: DEFAULT_PADDING,
            elements: Vec::new(),
            container: None,
        }
    }
}

impl fmt::Debug for FlowLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowLayout")
            .field("alignment", &self.alignment)
            .field("vertical_alignment", &self.vertical_alignment)
            .field("hgap", &self.hgap)
            .field("vgap", &self.vgap)
            .field("hpadding", &self.hpadding)
            .field("vpadding", &self.vpadding)
            .field("elements", &self.elements.len())
            .field("bound", &self.container.is_some())
            .finish()
    }
}

impl FlowLayout {
    /// Centered rows, top-aligned, default gaps and padding.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: FlowAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_hgap(mut self, hgap: u16) -> Self {
        self.hgap = hgap;
        self
    }

    #[must_use]
    pub fn with_vgap(mut self, vgap: u16) -> Self {
        self.vgap = vgap;
        self
    }

    #[must_use]
    pub fn with_hpadding(mut self, hpadding: u16) -> Self {
        self.hpadding = hpadding;
        self
    }

    #[must_use]
    pub fn with_vpadding(mut self, vpadding: u16) -> Self {
        self.vpadding = vpadding;
        self
    }

    pub fn alignment(&self) -> FlowAlignment {
        self.alignment
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn hgap(&self) -> u16 {
        self.hgap
    }

    pub fn vgap(&self) -> u16 {
        self.vgap
    }

    pub fn hpadding(&self) -> u16 {
        self.hpadding
    }

    pub fn vpadding(&self) -> u16 {
        self.vpadding
    }

    // Setters only record the value; positions change on the next revalidate.

    pub fn set_alignment(&mut self, alignment: FlowAlignment) {
        self.alignment = alignment;
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        self.vertical_alignment = alignment;
    }

    pub fn set_hgap(&mut self, hgap: u16) {
        self.hgap = hgap;
    }

    pub fn set_vgap(&mut self, vgap: u16) {
        self.vgap = vgap;
    }

    pub fn set_hpadding(&mut self, hpadding: u16) {
        self.hpadding = hpadding;
    }

    pub fn set_vpadding(&mut self, vpadding: u16) {
        self.vpadding = vpadding;
    }

    /// Number of managed elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn max_row_width(&self, container_width: i32) -> i32 {
        container_width - 2 * i32::from(self.hpadding)
    }

    /// Compute the top-left corner of every element for a container of
    /// `container` size, given each element's size in layout order.
    pub fn solve(&self, container: Size, sizes: &[Size]) -> Vec<Point> {
        let hgap = i32::from(self.hgap);
        let vgap = i32::from(self.vgap);
        let hpadding = i32::from(self.hpadding);
        let vpadding = i32::from(self.vpadding);
        let max_width = self.max_row_width(container.width);

        let widths: Vec<i32> = sizes.iter().map(|size| size.width).collect();
        let rows = pack_rows(&widths, max_width, hgap);
        let row_heights: Vec<i32> = rows
            .iter()
            .map(|row| sizes[row.clone()].iter().map(|s| s.height).max().unwrap_or(0))
            .collect();

        let row_count = rows.len() as i32;
        let total_heights: i32 = row_heights.iter().sum();
        let stacked = total_heights + vgap * (row_count - 1).max(0);
        let inner_height = container.height - 2 * vpadding;

        let (mut center_y, row_gap) = match self.vertical_alignment {
            VerticalAlignment::Top => (vpadding, vgap),
            VerticalAlignment::Center => {
                let gap = (inner_height - total_heights) / (row_count + 1);
                (vpadding + gap, gap)
            }
            VerticalAlignment::CenterStatic => {
                (vpadding + inner_height / 2 - stacked / 2, vgap)
            }
            VerticalAlignment::Bottom => (container.height - vpadding - stacked, vgap),
        };

        let mut positions = vec![Point::ORIGIN; sizes.len()];
        for (row, &row_height) in rows.iter().zip(&row_heights) {
            center_y += row_height / 2;

            let row_sizes = &sizes[row.clone()];
            let count = row_sizes.len() as i32;
            let content: i32 = row_sizes.iter().map(|s| s.width).sum::<i32>() + hgap * (count - 1);
            let (lead, extra) = self.alignment.row_spacing(max_width - content, count);

            let mut x = hpadding + lead;
            for (index, size) in row.clone().zip(row_sizes) {
                positions[index] = Point::new(x, center_y - size.height / 2);
                x += size.width + hgap + extra;
            }

            center_y += row_gap + row_height / 2;
        }
        positions
    }
}

impl LayoutManager for FlowLayout {
    fn add_element(&mut self, element: ElementHandle) -> bool {
        if self.contains(&element) {
            debug!(elements = self.elements.len(), "flow: duplicate add ignored");
            return false;
        }
        self.elements.push(element);
        true
    }

    fn remove_element(&mut self, element: &ElementHandle) -> bool {
        let Some(index) = self.elements.iter().position(|e| same_element(e, element)) else {
            return false;
        };
        self.elements.remove(index);
        true
    }

    fn revalidate(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        let Some((container, size)) = bound_container(self.container.as_ref()) else {
            return;
        };

        let focused = focus_owner(&self.elements);
        let sizes: Vec<Size> = self.elements.iter().map(|e| e.borrow().size()).collect();
        let positions = self.solve(size, &sizes);
        debug!(
            elements = self.elements.len(),
            width = size.width,
            height = size.height,
            alignment = %self.alignment,
            "flow: revalidate"
        );

        for (element, position) in self.elements.iter().zip(positions) {
            {
                let mut element = element.borrow_mut();
                element.set_position(position);
                descend(&mut *element);
            }
            trace!(x = position.x, y = position.y, "flow: placed");
            container.borrow_mut().render_element(element);
        }

        restore_focus(focused);
    }

    fn set_container(&mut self, container: ContainerHandle) {
        self.container = Some(container);
        self.revalidate();
    }

    fn elements(&self) -> Vec<ElementHandle> {
        self.elements.clone()
    }

    fn pack_size(&self) -> Size {
        let hgap = i32::from(self.hgap);
        let vgap = i32::from(self.vgap);
        let sizes: Vec<Size> = self.elements.iter().map(|e| e.borrow().size()).collect();
        let widths: Vec<i32> = sizes.iter().map(|s| s.width).collect();

        // An unbound or empty container does not constrain the row width.
        let max_width = match usable_size(self.container.as_ref()) {
            Some(size) => self.max_row_width(size.width),
            None => i32::MAX,
        };
        let rows = pack_rows(&widths, max_width, hgap);

        let mut width = 0;
        let mut height = 0;
        for row in &rows {
            let row_sizes = &sizes[row.clone()];
            // Rows wrap on width plus a trailing gap per element, so ask for it too.
            let claimed = row_sizes.iter().map(|s| s.width + hgap).sum::<i32>();
            width = width.max(claimed);
            height += row_sizes.iter().map(|s| s.height).max().unwrap_or(0);
        }
        height += vgap * (rows.len() as i32 - 1).max(0);

        Size::new(
            width + 2 * i32::from(self.hpadding),
            height + 2 * i32::from(self.vpadding),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{LayoutElement, Leaf, Surface};

    fn leaf(width: i32, height: i32) -> Rc<RefCell<Leaf>> {
        Rc::new(RefCell::new(Leaf::new(width, height)))
    }

    fn sizes(widths: &[i32], height: i32) -> Vec<Size> {
        widths.iter().map(|&w| Size::new(w, height)).collect()
    }

    #[test]
    fn pack_rows_wraps_on_overflow() {
        // maxWidth 205: 95+5, 95+5 fit (200); 50+5 would reach 255.
        assert_eq!(pack_rows(&[95, 95, 50], 205, 5), vec![0..2, 2..3]);
    }

    #[test]
    fn pack_rows_gives_oversized_element_its_own_row() {
        assert_eq!(pack_rows(&[10, 500, 10], 100, 5), vec![0..1, 1..2, 2..3]);
        assert_eq!(pack_rows(&[500, 10, 10], 100, 5), vec![0..1, 1..3]);
    }

    #[test]
    fn pack_rows_empty() {
        assert!(pack_rows(&[], 100, 5).is_empty());
    }

    #[test]
    fn left_alignment_wraps_third_element() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::Left);
        let points = flow.solve(Size::new(215, 200), &sizes(&[95, 95, 50], 20));
        assert_eq!(points[0].x, 5);
        assert_eq!(points[1].x, 105);
        assert_eq!(points[2].x, 5);
        assert!(points[2].y > points[0].y);
    }

    #[test]
    fn right_alignment_is_flush() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::Right);
        // maxWidth 90, content 20 + 5 + 20 = 45, free 45.
        let points = flow.solve(Size::new(100, 50), &sizes(&[20, 20], 10));
        assert_eq!(points[0].x, 50);
        assert_eq!(points[1].x, 75);
        assert_eq!(points[1].x + 20, 95);
    }

    #[test]
    fn center_distributes_free_width() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::Center);
        // maxWidth 90, content 45, free 45, three slots of 15.
        let points = flow.solve(Size::new(100, 50), &sizes(&[20, 20], 10));
        assert_eq!(points[0].x, 20);
        assert_eq!(points[1].x, 60);
    }

    #[test]
    fn center_static_keeps_gap() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::CenterStatic);
        let points = flow.solve(Size::new(100, 50), &sizes(&[20, 20], 10));
        assert_eq!(points[0].x, 5 + 22);
        assert_eq!(points[1].x - (points[0].x + 20), 5);
    }

    #[test]
    fn elements_centered_on_row_line() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::Left);
        let points = flow.solve(
            Size::new(300, 300),
            &[Size::new(10, 40), Size::new(10, 20), Size::new(10, 10)],
        );
        // Row height 40: center line at 5 + 20 = 25.
        assert_eq!(points[0].y, 5);
        assert_eq!(points[1].y, 15);
        assert_eq!(points[2].y, 20);
    }

    #[test]
    fn second_row_starts_after_vgap() {
        let flow = FlowLayout::new().with_alignment(FlowAlignment::Left);
        let points = flow.solve(Size::new(60, 300), &[Size::new(40, 30), Size::new(40, 10)]);
        // Row 1 spans 5..35, row 2 center = 35 + 5 + 5 = 45.
        assert_eq!(points[0].y, 5);
        assert_eq!(points[1].y, 40);
    }

    #[test]
    fn vertical_bottom_ends_at_padding() {
        let flow = FlowLayout::new()
            .with_alignment(FlowAlignment::Left)
            .with_vertical_alignment(VerticalAlignment::Bottom);
        let points = flow.solve(Size::new(100, 100), &[Size::new(10, 20)]);
        assert_eq!(points[0].y + 20, 95);
    }

    #[test]
    fn vertical_center_static_centers_block() {
        let flow = FlowLayout::new()
            .with_alignment(FlowAlignment::Left)
            .with_vertical_alignment(VerticalAlignment::CenterStatic);
        let points = flow.solve(Size::new(100, 110), &[Size::new(10, 20)]);
        // inner height 100, block 20: top edge 5 + 50 - 10.
        assert_eq!(points[0].y, 45);
    }

    #[test]
    fn vertical_center_spreads_rows() {
        let flow = FlowLayout::new()
            .with_alignment(FlowAlignment::Left)
            .with_vgap(0)
            .with_vpadding(0);
        let flow = flow.with_vertical_alignment(VerticalAlignment::Center);
        // Two rows of 20 in 100: gaps of 20.
        let points = flow.solve(Size::new(50, 100), &[Size::new(40, 20), Size::new(40, 20)]);
        assert_eq!(points[0].y, 20);
        assert_eq!(points[1].y, 60);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut flow = FlowLayout::new();
        let a = leaf(10, 10);
        assert!(flow.add_element(a.clone()));
        assert!(!flow.add_element(a.clone()));
        assert_eq!(flow.len(), 1);
    }

    #[test]
    fn remove_non_member_is_noop() {
        let mut flow = FlowLayout::new();
        let a = leaf(10, 10);
        let b: ElementHandle = leaf(10, 10);
        flow.add_element(a.clone());
        assert!(!flow.remove_element(&b));
        assert!(flow.remove_element(&(a.clone() as ElementHandle)));
        assert!(flow.is_empty());
    }

    #[test]
    fn revalidate_without_container_is_noop() {
        let mut flow = FlowLayout::new();
        let a = leaf(10, 10);
        a.borrow_mut().set_position(Point::new(-7, -7));
        flow.add_element(a.clone());
        flow.revalidate();
        assert_eq!(a.borrow().position(), Point::new(-7, -7));
    }

    #[test]
    fn zero_size_container_is_noop() {
        let mut flow = FlowLayout::new();
        let a = leaf(10, 10);
        a.borrow_mut().set_position(Point::new(-7, -7));
        flow.add_element(a.clone());
        let surface = Rc::new(RefCell::new(Surface::new(0, 100)));
        flow.set_container(surface.clone());
        assert_eq!(a.borrow().position(), Point::new(-7, -7));
        assert!(surface.borrow().rendered().is_empty());
    }

    #[test]
    fn setters_do_not_relayout() {
        let surface = Rc::new(RefCell::new(Surface::new(100, 100)));
        let mut flow = FlowLayout::new().with_alignment(FlowAlignment::Left);
        let a = leaf(10, 10);
        flow.add_element(a.clone());
        flow.set_container(surface);
        let before = a.borrow().position();

        flow.set_hpadding(20);
        assert_eq!(a.borrow().position(), before);
        flow.revalidate();
        assert_eq!(a.borrow().position().x, 20);
    }

    #[test]
    fn revalidate_renders_and_restores_focus() {
        let surface = Rc::new(RefCell::new(Surface::new(200, 100)));
        let mut flow = FlowLayout::new();
        let a = leaf(10, 10);
        let b = Rc::new(RefCell::new(Leaf::new(10, 10).focused()));
        let c = Rc::new(RefCell::new(Leaf::new(10, 10).focused()));
        flow.add_element(a.clone());
        flow.add_element(b.clone());
        flow.add_element(c.clone());
        flow.set_container(surface.clone());

        assert_eq!(surface.borrow().rendered().len(), 3);
        assert_eq!(a.borrow().focus_requests(), 0);
        assert_eq!(b.borrow().focus_requests(), 1);
        assert_eq!(c.borrow().focus_requests(), 0);
    }

    #[test]
    fn pack_size_single_row_when_unbound() {
        let mut flow = FlowLayout::new();
        flow.add_element(leaf(20, 10));
        flow.add_element(leaf(30, 25));
        assert_eq!(flow.pack_size(), Size::new(5 + 20 + 5 + 30 + 5 + 5, 5 + 25 + 5));
    }

    #[test]
    fn pack_size_follows_bound_width() {
        let mut flow = FlowLayout::new();
        flow.add_element(leaf(40, 10));
        flow.add_element(leaf(40, 20));
        flow.set_container(Rc::new(RefCell::new(Surface::new(60, 100))));
        assert_eq!(flow.pack_size(), Size::new(5 + 45 + 5, 5 + 10 + 5 + 20 + 5));
    }

    #[test]
    fn alignment_parsing() {
        assert_eq!("CENTER_STATIC".parse::<FlowAlignment>(), Ok(FlowAlignment::CenterStatic));
        assert_eq!("bottom".parse::<VerticalAlignment>(), Ok(VerticalAlignment::Bottom));
        assert!("middle".parse::<FlowAlignment>().is_err());
    }
}
