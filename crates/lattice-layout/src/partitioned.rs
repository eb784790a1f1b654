//! Percentage partitions along one axis.
//!
//! Each entry claims a percentage of the primary axis (width for
//! [`PartitionDirection::Row`], height for [`PartitionDirection::Column`]).
//! Entries are laid out back to back from the origin. Spacers claim space
//! without rendering anything. The sum of all partitions never exceeds 100;
//! an add or update that would break that is refused and leaves the layout
//! untouched.
//!
//! Band edges are rounded from the running percentage total, so the bands of
//! a full layout tile the axis exactly and never overrun it.

use std::fmt;

use lattice_core::geometry::{Point, Rect, Size};
use lattice_core::{debug, trace};

use crate::anchor::{PartitionAlignment, Third, text_enum};
use crate::element::{
    ContainerHandle, ElementHandle, bound_container, descend, focus_owner, restore_focus,
    same_element,
};
use crate::{LayoutError, LayoutManager};

/// Total percentage available to one layout.
pub const PARTITION_BUDGET: u16 = 100;

/// Partition used by [`PartitionedLayout::add_element`] and
/// [`PartitionedLayout::spacer_default`] unless overridden.
pub const DEFAULT_PARTITION_SPACE: u8 = 10;

/// Axis the partitions are laid along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "String"))]
pub enum PartitionDirection {
    /// Left to right; partitions split the width.
    Row,
    /// Top to bottom; partitions split the height.
    #[default]
    Column,
}

impl PartitionDirection {
    pub const ALL: [Self; 2] = [Self::Row, Self::Column];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }

    /// Extent of `size` along the partitioned axis.
    #[inline]
    pub const fn primary(self, size: Size) -> i32 {
        match self {
            Self::Row => size.width,
            Self::Column => size.height,
        }
    }

    /// Extent of `size` across the partitioned axis.
    #[inline]
    pub const fn cross(self, size: Size) -> i32 {
        match self {
            Self::Row => size.height,
            Self::Column => size.width,
        }
    }

    /// Split an alignment into `(primary, cross)` thirds.
    #[inline]
    const fn thirds(self, alignment: PartitionAlignment) -> (Third, Third) {
        let (horizontal, vertical) = alignment.thirds();
        match self {
            Self::Row => (horizontal, vertical),
            Self::Column => (vertical, horizontal),
        }
    }

    #[inline]
    const fn point(self, primary: i32, cross: i32) -> Point {
        match self {
            Self::Row => Point::new(primary, cross),
            Self::Column => Point::new(cross, primary),
        }
    }

    #[inline]
    const fn size(self, primary: i32, cross: i32) -> Size {
        match self {
            Self::Row => Size::new(primary, cross),
            Self::Column => Size::new(cross, primary),
        }
    }

    #[inline]
    const fn band(self, start: i32, length: i32, container: Size) -> Rect {
        match self {
            Self::Row => Rect::new(start, 0, length, container.height),
            Self::Column => Rect::new(0, start, container.width, length),
        }
    }
}

text_enum!(PartitionDirection, "partition direction");

/// One slot on the axis: an element or a spacer, with its share and alignment.
#[derive(Clone)]
pub struct PartitionEntry {
    element: Option<ElementHandle>,
    partition: u8,
    alignment: PartitionAlignment,
}

impl fmt::Debug for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionEntry")
            .field("spacer", &self.is_spacer())
            .field("partition", &self.partition)
            .field("alignment", &self.alignment)
            .finish()
    }
}

impl PartitionEntry {
    pub fn element(&self) -> Option<&ElementHandle> {
        self.element.as_ref()
    }

    pub fn partition(&self) -> u8 {
        self.partition
    }

    pub fn alignment(&self) -> PartitionAlignment {
        self.alignment
    }

    pub fn is_spacer(&self) -> bool {
        self.element.is_none()
    }
}

/// Lays entries along one axis, each in a percentage band.
pub struct PartitionedLayout {
    direction: PartitionDirection,
    entries: Vec<PartitionEntry>,
    partitions_sum: u16,
    default_partition: u8,
    default_alignment: PartitionAlignment,
    container: Option<ContainerHandle>,
}

impl Default for PartitionedLayout {
    fn default() -> Self {
        Self {
            direction: PartitionDirection::default(),
            entries: Vec::new(),
            partitions_sum: 0,
            default_partition: DEFAULT_PARTITION_SPACE,
            default_alignment: PartitionAlignment::default(),
            container: None,
        }
    }
}

impl fmt::Debug for PartitionedLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionedLayout")
            .field("direction", &self.direction)
            .field("entries", &self.entries)
            .field("partitions_sum", &self.partitions_sum)
            .field("bound", &self.container.is_some())
            .finish()
    }
}

impl PartitionedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_direction(mut self, direction: PartitionDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Partition used when an add does not name one. Clamped to 100.
    #[must_use]
    pub fn with_default_partition(mut self, partition: u8) -> Self {
        self.default_partition = partition.min(100);
        self
    }

    #[must_use]
    pub fn with_default_alignment(mut self, alignment: PartitionAlignment) -> Self {
        self.default_alignment = alignment;
        self
    }

    pub fn direction(&self) -> PartitionDirection {
        self.direction
    }

    pub fn default_partition(&self) -> u8 {
        self.default_partition
    }

    pub fn default_alignment(&self) -> PartitionAlignment {
        self.default_alignment
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&PartitionEntry> {
        self.entries.get(index)
    }

    /// Live partitions, in entry order.
    pub fn partitions(&self) -> Vec<u8> {
        self.entries.iter().map(|entry| entry.partition).collect()
    }

    pub fn partitions_sum(&self) -> u16 {
        self.partitions_sum
    }

    /// Percentage still available to new entries.
    pub fn remaining(&self) -> u16 {
        PARTITION_BUDGET - self.partitions_sum
    }

    fn fits(&self, partition: u8, replacing: u8) -> bool {
        partition <= 100
            && self.partitions_sum - u16::from(replacing) + u16::from(partition)
                <= PARTITION_BUDGET
    }

    fn push(
        &mut self,
        element: Option<ElementHandle>,
        partition: u8,
        alignment: PartitionAlignment,
    ) -> bool {
        if !self.fits(partition, 0) {
            debug!(
                partition,
                sum = self.partitions_sum,
                "partitioned: add over budget"
            );
            return false;
        }
        if let Some(element) = element.as_ref()
            && self.contains(element)
        {
            debug!("partitioned: duplicate add ignored");
            return false;
        }
        self.partitions_sum += u16::from(partition);
        self.entries.push(PartitionEntry {
            element,
            partition,
            alignment,
        });
        true
    }

    /// Add `element` with its own share of the axis and the default alignment.
    pub fn add_with_partition(&mut self, element: ElementHandle, partition: u8) -> bool {
        self.push(Some(element), partition, self.default_alignment)
    }

    /// Add `element` with an explicit share and alignment.
    ///
    /// Refused when `partition > 100`, when the total would exceed 100, or
    /// when the element is already present.
    pub fn add_aligned(
        &mut self,
        element: ElementHandle,
        partition: u8,
        alignment: PartitionAlignment,
    ) -> bool {
        self.push(Some(element), partition, alignment)
    }

    /// Reserve `partition` percent of the axis without rendering anything.
    pub fn spacer(&mut self, partition: u8) -> bool {
        self.push(None, partition, self.default_alignment)
    }

    /// Reserve the default partition.
    pub fn spacer_default(&mut self) -> bool {
        self.spacer(self.default_partition)
    }

    /// Change the share of entry `index`.
    ///
    /// A bad index is an error. A share that would push the total past 100
    /// is refused with `Ok(false)`.
    pub fn set_partition(&mut self, index: usize, partition: u8) -> Result<bool, LayoutError> {
        let len = self.entries.len();
        let current = self
            .entries
            .get(index)
            .map(|entry| entry.partition)
            .ok_or(LayoutError::PartitionIndexOutOfBounds { index, len })?;
        if !self.fits(partition, current) {
            debug!(
                index,
                partition,
                sum = self.partitions_sum,
                "partitioned: update over budget"
            );
            return Ok(false);
        }
        self.partitions_sum = self.partitions_sum - u16::from(current) + u16::from(partition);
        self.entries[index].partition = partition;
        Ok(true)
    }

    /// Remove entry `index`, returning its share to the budget.
    pub fn remove_at(&mut self, index: usize) -> Option<PartitionEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.partitions_sum -= u16::from(entry.partition);
        Some(entry)
    }

    /// Switch axis. Relayouts only when the direction actually changes.
    pub fn set_direction(&mut self, direction: PartitionDirection) {
        if self.direction == direction {
            return;
        }
        self.direction = direction;
        self.revalidate();
    }

    /// Band of every entry for a container of `container` size.
    ///
    /// Each band is its own share of the axis rounded half up. A band that
    /// would run past the axis end is cut off there.
    pub fn bands(&self, container: Size) -> Vec<Rect> {
        self.spans(self.direction.primary(container))
            .into_iter()
            .map(|(start, length)| self.direction.band(start, length, container))
            .collect()
    }

    /// `(start, length)` of every entry along a primary axis of `axis`.
    fn spans(&self, axis: i32) -> Vec<(i32, i32)> {
        let axis = axis.max(0);
        let mut cursor = 0;
        self.entries
            .iter()
            .map(|entry| {
                let share = (i64::from(entry.partition) * i64::from(axis) + 50) / 100;
                let length = i32::try_from(share).unwrap_or(i32::MAX).min(axis - cursor);
                let span = (cursor, length);
                cursor += length;
                span
            })
            .collect()
    }

    fn place(
        &self,
        band: Rect,
        container: Size,
        alignment: PartitionAlignment,
        size: Size,
    ) -> Point {
        let direction = self.direction;
        let (primary_third, cross_third) = direction.thirds(alignment);
        let (band_start, band_length) = match direction {
            PartitionDirection::Row => (band.x, band.width),
            PartitionDirection::Column => (band.y, band.height),
        };
        let primary = primary_third.align(band_start, band_length, direction.primary(size));
        let cross = cross_third.align(0, direction.cross(container), direction.cross(size));
        direction.point(primary, cross)
    }
}

impl LayoutManager for PartitionedLayout {
    /// Add with the default partition and alignment.
    fn add_element(&mut self, element: ElementHandle) -> bool {
        self.push(Some(element), self.default_partition, self.default_alignment)
    }

    fn remove_element(&mut self, element: &ElementHandle) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.element.as_ref().is_some_and(|e| same_element(e, element)))
        else {
            return false;
        };
        self.remove_at(index).is_some()
    }

    fn revalidate(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let Some((container, size)) = bound_container(self.container.as_ref()) else {
            return;
        };

        let focused = focus_owner(self.entries.iter().filter_map(|entry| entry.element.as_ref()));
        let bands = self.bands(size);
        debug!(
            direction = %self.direction,
            entries = self.entries.len(),
            sum = self.partitions_sum,
            width = size.width,
            height = size.height,
            "partitioned: revalidate"
        );

        for (entry, band) in self.entries.iter().zip(bands) {
            let Some(handle) = entry.element.as_ref() else {
                trace!(band = ?band, "partitioned: spacer");
                continue;
            };
            {
                let mut element = handle.borrow_mut();
                let position = self.place(band, size, entry.alignment, element.size());
                element.set_position(position);
                descend(&mut *element);
                trace!(band = ?band, x = position.x, y = position.y, "partitioned: placed");
            }
            container.borrow_mut().render_element(handle);
        }

        restore_focus(focused);
    }

    fn set_container(&mut self, container: ContainerHandle) {
        self.container = Some(container);
        self.revalidate();
    }

    fn elements(&self) -> Vec<ElementHandle> {
        self.entries
            .iter()
            .filter_map(|entry| entry.element.clone())
            .collect()
    }

    fn pack_size(&self) -> Size {
        let direction = self.direction;
        let needs: Vec<(usize, i32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.partition > 0)
            .filter_map(|(index, entry)| {
                let element = entry.element.as_ref()?;
                Some((index, direction.primary(element.borrow().size())))
            })
            .collect();
        let cross = self
            .elements()
            .iter()
            .map(|element| direction.cross(element.borrow().size()))
            .max()
            .unwrap_or(0);

        // Smallest axis whose exact shares cover every element.
        let floor = needs
            .iter()
            .map(|&(index, need)| {
                let percent = i64::from(self.entries[index].partition);
                let axis = (i64::from(need) * 100 + percent - 1) / percent;
                i32::try_from(axis).unwrap_or(i32::MAX)
            })
            .max()
            .unwrap_or(0);

        // Rounding and the axis-end cut can still leave a band short; a
        // multiple of 100 rounds exactly, so the search ends within 100 steps.
        let holds = |axis: i32| {
            let spans = self.spans(axis);
            needs.iter().all(|&(index, need)| spans[index].1 >= need)
        };
        let primary = (floor..=floor.saturating_add(100))
            .find(|&axis| holds(axis))
            .unwrap_or(floor);
        direction.size(primary, cross)
    }
}
