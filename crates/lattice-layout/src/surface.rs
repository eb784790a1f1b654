//! Toolkit-free adapters: a plain container, a plain element, and a panel
//! that hosts a nested layout.
//!
//! These are what the harness and the tests lay out. A real UI toolkit
//! binds its own widgets through [`LayoutElement`] and [`Container`] instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lattice_core::geometry::{Point, Rect, Size};

use crate::LayoutManager;
use crate::element::{Container, ContainerHandle, ElementHandle, LayoutElement, same_element};

/// A container with bounds and the set of elements rendered into it.
#[derive(Default)]
pub struct Surface {
    bounds: Rect,
    rendered: Vec<ElementHandle>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("bounds", &self.bounds)
            .field("rendered", &self.rendered.len())
            .finish()
    }
}

impl Surface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bounds: Rect::from_size(width, height),
            rendered: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_size(&mut self, size: Size) {
        self.bounds = Rect::from_parts(self.bounds.origin(), size);
    }

    pub fn set_position(&mut self, position: Point) {
        self.bounds = Rect::from_parts(position, self.bounds.size());
    }

    /// Elements rendered so far, first render first.
    pub fn rendered(&self) -> &[ElementHandle] {
        &self.rendered
    }

    pub fn is_rendered(&self, element: &ElementHandle) -> bool {
        self.rendered.iter().any(|e| same_element(e, element))
    }

    /// Forget everything rendered so far.
    pub fn clear(&mut self) {
        self.rendered.clear();
    }
}

impl Container for Surface {
    fn width(&self) -> i32 {
        self.bounds.width
    }

    fn height(&self) -> i32 {
        self.bounds.height
    }

    fn render_element(&mut self, element: &ElementHandle) {
        if !self.is_rendered(element) {
            self.rendered.push(element.clone());
        }
    }
}

/// A sized, focusable element with no content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaf {
    bounds: Rect,
    focused: bool,
    focus_requests: u32,
}

impl Leaf {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bounds: Rect::from_size(width, height),
            ..Self::default()
        }
    }

    /// Start out holding focus.
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// How many times focus was requested on this element.
    pub fn focus_requests(&self) -> u32 {
        self.focus_requests
    }
}

impl LayoutElement for Leaf {
    fn size(&self) -> Size {
        self.bounds.size()
    }

    fn position(&self) -> Point {
        self.bounds.origin()
    }

    fn set_position(&mut self, position: Point) {
        self.bounds = Rect::from_parts(position, self.bounds.size());
    }

    fn set_size(&mut self, size: Size) {
        self.bounds = Rect::from_parts(self.bounds.origin(), size);
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn request_focus(&mut self) {
        self.focused = true;
        self.focus_requests += 1;
    }
}

/// An element that is itself a container for a nested layout.
///
/// The panel owns its [`Surface`] and binds `layout` to it on construction.
/// Parents that place the panel see it through
/// [`LayoutElement::nested_layout`] and revalidate the inner layout right
/// after, so panels nest to any depth.
pub struct Panel<L: LayoutManager + 'static> {
    surface: Rc<RefCell<Surface>>,
    layout: L,
}

impl<L: LayoutManager + fmt::Debug + 'static> fmt::Debug for Panel<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("bounds", &self.surface.borrow().bounds())
            .field("layout", &self.layout)
            .finish()
    }
}

impl<L: LayoutManager + 'static> Panel<L> {
    /// Wrap `layout` in a zero-sized panel.
    pub fn new(mut layout: L) -> Self {
        let surface = Rc::new(RefCell::new(Surface::default()));
        let container: ContainerHandle = surface.clone();
        layout.set_container(container);
        Self { surface, layout }
    }

    /// Give the panel an initial size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.set_size(size);
        self
    }

    /// Size the panel to what its layout asks for.
    #[must_use]
    pub fn packed(self) -> Self {
        let size = self.layout.pack_size();
        self.with_size(size)
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// The inner layout. Call [`LayoutManager::revalidate`] after mutating it.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn surface(&self) -> &Rc<RefCell<Surface>> {
        &self.surface
    }
}

impl<L: LayoutManager + 'static> LayoutElement for Panel<L> {
    fn size(&self) -> Size {
        self.surface.borrow().bounds().size()
    }

    fn position(&self) -> Point {
        self.surface.borrow().bounds().origin()
    }

    fn set_position(&mut self, position: Point) {
        self.surface.borrow_mut().set_position(position);
    }

    fn set_size(&mut self, size: Size) {
        self.surface.borrow_mut().set_size(size);
    }

    fn nested_layout(&mut self) -> Option<&mut dyn LayoutManager> {
        Some(&mut self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowLayout;

    #[test]
    fn surface_renders_each_element_once() {
        let mut surface = Surface::new(10, 10);
        let a: ElementHandle = Rc::new(RefCell::new(Leaf::new(1, 1)));
        let b: ElementHandle = Rc::new(RefCell::new(Leaf::new(1, 1)));
        surface.render_element(&a);
        surface.render_element(&a);
        surface.render_element(&b);
        assert_eq!(surface.rendered().len(), 2);
        assert!(surface.is_rendered(&b));
        surface.clear();
        assert!(!surface.is_rendered(&a));
    }

    #[test]
    fn equal_leaves_are_distinct_members() {
        let a: ElementHandle = Rc::new(RefCell::new(Leaf::new(3, 3)));
        let b: ElementHandle = Rc::new(RefCell::new(Leaf::new(3, 3)));
        assert!(!same_element(&a, &b));
        assert!(same_element(&a, &a.clone()));
    }

    #[test]
    fn leaf_counts_focus_requests() {
        let mut leaf = Leaf::new(4, 4);
        assert!(!leaf.has_focus());
        leaf.request_focus();
        leaf.request_focus();
        assert!(leaf.has_focus());
        assert_eq!(leaf.focus_requests(), 2);
    }

    #[test]
    fn panel_bounds_follow_surface() {
        let mut panel = Panel::new(FlowLayout::new()).with_size(Size::new(30, 20));
        panel.set_position(Point::new(7, 9));
        assert_eq!(panel.bounds(), Rect::new(7, 9, 30, 20));
        assert_eq!(panel.surface().borrow().bounds(), Rect::new(7, 9, 30, 20));
        assert!(panel.nested_layout().is_some());
    }

    #[test]
    fn packed_panel_takes_layout_size() {
        let mut flow = FlowLayout::new().with_hgap(0).with_hpadding(0).with_vpadding(0);
        flow.add_element(Rc::new(RefCell::new(Leaf::new(10, 4))));
        flow.add_element(Rc::new(RefCell::new(Leaf::new(6, 8))));
        let panel = Panel::new(flow).packed();
        assert_eq!(panel.size(), Size::new(16, 8));
    }
}
