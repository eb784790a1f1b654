#![forbid(unsafe_code)]

//! Layout engines.
//!
//! Three engines position host-owned elements inside a container:
//!
//! - [`FlowLayout`] - rows packed left to right, wrapped on overflow
//! - [`GridLayout`] - fixed `cols x rows` cells, one element each
//! - [`PartitionedLayout`] - percentage bands along one axis
//!
//! All three implement [`LayoutManager`]. Nothing is computed until
//! [`LayoutManager::revalidate`] runs; it reads the container size fresh,
//! places every element, hands each to the container and restores input
//! focus to whichever element held it.
//!
//! Elements that host a layout of their own (see [`Panel`]) are revalidated
//! right after they are placed, so engines nest.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use lattice_layout::{
//!     LayoutElement, LayoutManager, Leaf, PartitionDirection, PartitionedLayout, Surface,
//! };
//!
//! let mut bar = PartitionedLayout::new().with_direction(PartitionDirection::Row);
//! let left = Rc::new(RefCell::new(Leaf::new(20, 10)));
//! let right = Rc::new(RefCell::new(Leaf::new(20, 10)));
//! assert!(bar.add_with_partition(left.clone(), 30));
//! assert!(bar.add_with_partition(right.clone(), 70));
//! bar.set_container(Rc::new(RefCell::new(Surface::new(200, 10))));
//!
//! assert_eq!(left.borrow().x(), 20);
//! assert_eq!(right.borrow().x(), 120);
//! ```

pub mod anchor;
pub mod element;
pub mod error;
pub mod flow;
pub mod grid;
pub mod partitioned;
pub mod surface;

pub use anchor::{GridAnchor, PartitionAlignment, Third};
pub use element::{Container, ContainerHandle, ElementHandle, LayoutElement, same_element};
pub use error::LayoutError;
pub use flow::{FlowAlignment, FlowLayout, VerticalAlignment, pack_rows};
pub use grid::{GridCell, GridLayout, MAX_GRID_CELLS};
pub use lattice_core::geometry::{Point, Rect, Size};
pub use partitioned::{PartitionDirection, PartitionEntry, PartitionedLayout};
pub use surface::{Leaf, Panel, Surface};

/// Operations shared by every engine.
pub trait LayoutManager {
    /// Start managing `element`. Returns `false`, changing nothing, if it is
    /// already managed or the engine has no room for it.
    fn add_element(&mut self, element: ElementHandle) -> bool;

    /// Stop managing `element`. Returns `false` if it was not a member.
    fn remove_element(&mut self, element: &ElementHandle) -> bool;

    /// Recompute every position from the container's current size.
    ///
    /// A no-op without elements or without a non-empty container. Running it
    /// twice in a row yields identical positions.
    fn revalidate(&mut self);

    /// Bind to `container` and lay out into it.
    fn set_container(&mut self, container: ContainerHandle);

    /// Managed elements in layout order.
    fn elements(&self) -> Vec<ElementHandle>;

    /// Whether `element` is managed by this engine.
    fn contains(&self, element: &ElementHandle) -> bool {
        self.elements().iter().any(|e| same_element(e, element))
    }

    /// Smallest container size that shows every element at its own size.
    fn pack_size(&self) -> Size;
}

impl<L: LayoutManager + ?Sized> LayoutManager for Box<L> {
    fn add_element(&mut self, element: ElementHandle) -> bool {
        (**self).add_element(element)
    }

    fn remove_element(&mut self, element: &ElementHandle) -> bool {
        (**self).remove_element(element)
    }

    fn revalidate(&mut self) {
        (**self).revalidate();
    }

    fn set_container(&mut self, container: ContainerHandle) {
        (**self).set_container(container);
    }

    fn elements(&self) -> Vec<ElementHandle> {
        (**self).elements()
    }

    fn contains(&self, element: &ElementHandle) -> bool {
        (**self).contains(element)
    }

    fn pack_size(&self) -> Size {
        (**self).pack_size()
    }
}
