//! The element and container seams every engine is written against.
//!
//! Elements and containers are host-owned and single-threaded. Engines keep
//! shared handles to them and compare membership by identity, never by value.

use std::cell::RefCell;
use std::rc::Rc;

use lattice_core::geometry::{Point, Rect, Size};

use crate::LayoutManager;

/// Anything an engine can position.
pub trait LayoutElement {
    /// Current intrinsic size.
    fn size(&self) -> Size;

    /// Top-left corner relative to the container.
    fn position(&self) -> Point;

    /// Move the element. Only the managing engine calls this.
    fn set_position(&mut self, position: Point);

    /// Resize the element.
    fn set_size(&mut self, size: Size);

    /// Move and resize in one step.
    fn set_bounds(&mut self, bounds: Rect) {
        self.set_position(bounds.origin());
        self.set_size(bounds.size());
    }

    /// Whether the element currently owns input focus.
    fn has_focus(&self) -> bool {
        false
    }

    /// Ask for input focus. Called after a relayout moved the focus owner.
    fn request_focus(&mut self) {}

    /// The layout this element hosts, if it is itself a layout container.
    ///
    /// Engines revalidate nested layouts right after placing their host.
    fn nested_layout(&mut self) -> Option<&mut dyn LayoutManager> {
        None
    }

    fn width(&self) -> i32 {
        self.size().width
    }

    fn height(&self) -> i32 {
        self.size().height
    }

    fn x(&self) -> i32 {
        self.position().x
    }

    fn y(&self) -> i32 {
        self.position().y
    }

    /// Position and size together.
    fn bounds(&self) -> Rect {
        Rect::from_parts(self.position(), self.size())
    }
}

/// The surface an engine lays elements out into.
pub trait Container {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Make `element` part of the rendered set. Must tolerate repeats.
    fn render_element(&mut self, element: &ElementHandle);
}

/// Shared handle to a host-owned element.
pub type ElementHandle = Rc<RefCell<dyn LayoutElement>>;

/// Shared handle to a host-owned container.
pub type ContainerHandle = Rc<RefCell<dyn Container>>;

/// Identity comparison for element handles.
#[inline]
pub fn same_element(a: &ElementHandle, b: &ElementHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// First focused element in layout order.
pub(crate) fn focus_owner<'a>(
    elements: impl IntoIterator<Item = &'a ElementHandle>,
) -> Option<ElementHandle> {
    elements
        .into_iter()
        .find(|element| element.borrow().has_focus())
        .cloned()
}

/// Hand focus back to the element that held it before the relayout.
pub(crate) fn restore_focus(owner: Option<ElementHandle>) {
    if let Some(owner) = owner {
        owner.borrow_mut().request_focus();
    }
}

/// Revalidate the layout hosted by `element`, if any.
pub(crate) fn descend(element: &mut dyn LayoutElement) {
    if let Some(nested) = element.nested_layout() {
        nested.revalidate();
    }
}

/// Container size, or `None` when there is nothing to lay out into.
pub(crate) fn usable_size(container: Option<&ContainerHandle>) -> Option<Size> {
    let size = container?.borrow().size();
    (!size.is_empty()).then_some(size)
}

/// The bound container together with its size, or `None` when there is
/// nothing to lay out into.
pub(crate) fn bound_container(
    container: Option<&ContainerHandle>,
) -> Option<(ContainerHandle, Size)> {
    let container = container?;
    let size = container.borrow().size();
    (!size.is_empty()).then(|| (Rc::clone(container), size))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::Surface;

    #[test]
    fn bound_container_needs_a_non_empty_surface() {
        assert!(bound_container(None).is_none());

        let empty: ContainerHandle = Rc::new(RefCell::new(Surface::new(0, 40)));
        assert!(bound_container(Some(&empty)).is_none());
        assert!(usable_size(Some(&empty)).is_none());

        let surface: ContainerHandle = Rc::new(RefCell::new(Surface::new(30, 40)));
        let (bound, size) = bound_container(Some(&surface)).unwrap();
        assert!(std::ptr::addr_eq(Rc::as_ptr(&bound), Rc::as_ptr(&surface)));
        assert_eq!(size, Size::new(30, 40));
    }
}
