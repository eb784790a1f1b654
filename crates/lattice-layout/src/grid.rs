//! Fixed `cols x rows` cell grid.
//!
//! The container is divided into equal cells using integer division; the
//! remainder pixels stay unused along the right and bottom edges. Each cell
//! holds at most one element together with the size it had when it was
//! inserted. That stored size, not the element's current size, drives every
//! relayout:
//!
//! - an element hosting a nested layout is given the whole cell,
//! - an element whose stored size reaches the cell size in either dimension
//!   is clamped to the cell and pinned to the cell origin,
//! - anything smaller keeps its stored size and is placed by its
//!   [`GridAnchor`].
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use lattice_core::geometry::Rect;
//! use lattice_layout::{GridLayout, LayoutElement, LayoutManager, Leaf, Surface};
//!
//! let mut grid = GridLayout::new(2, 2).expect("non-zero grid");
//! let button = Rc::new(RefCell::new(Leaf::new(40, 40)));
//! grid.add_at(button.clone(), 0, 0).expect("cell in range");
//! grid.set_container(Rc::new(RefCell::new(Surface::new(200, 200))));
//!
//! assert_eq!(button.borrow().bounds(), Rect::new(30, 30, 40, 40));
//! ```

use std::fmt;

use lattice_core::geometry::{Point, Rect, Size};
use lattice_core::{debug, trace};

use crate::anchor::GridAnchor;
use crate::element::{
    ContainerHandle, ElementHandle, bound_container, descend, focus_owner, restore_focus,
    same_element,
};
use crate::{LayoutError, LayoutManager};

/// One occupied cell.
#[derive(Clone)]
pub struct GridCell {
    element: ElementHandle,
    original_size: Size,
    anchor: GridAnchor,
}

impl fmt::Debug for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridCell")
            .field("original_size", &self.original_size)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

impl GridCell {
    fn capture(element: ElementHandle, anchor: GridAnchor) -> Self {
        let original_size = element.borrow().size();
        Self {
            element,
            original_size,
            anchor,
        }
    }

    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    /// Size recorded when the element entered the grid.
    pub fn original_size(&self) -> Size {
        self.original_size
    }

    pub fn anchor(&self) -> GridAnchor {
        self.anchor
    }

    /// Bounds for this cell's element inside `cell`.
    ///
    /// `hosts_layout` marks an element that carries a nested layout.
    pub fn bounds_in(&self, cell: Rect, hosts_layout: bool) -> Rect {
        let original = self.original_size;

        if hosts_layout {
            return cell;
        }

        if original.width >= cell.width || original.height >= cell.height {
            return Rect::from_parts(cell.origin(), original.min(cell.size()));
        }

        Rect::from_parts(anchored_origin(cell, original, self.anchor), original)
    }
}

/// Upper bound on `cols * rows`; cells are stored densely.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// A grid of single-occupancy cells addressed as `(x, y)` = `(column, row)`.
pub struct GridLayout {
    cols: usize,
    rows: usize,
    /// Column-major: index `x * rows + y`.
    cells: Vec<Option<GridCell>>,
    container: Option<ContainerHandle>,
}

impl fmt::Debug for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayout")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("occupied", &self.occupied().count())
            .field("bound", &self.container.is_some())
            .finish()
    }
}

impl GridLayout {
    /// Create an empty grid.
    ///
    /// Both dimensions must be in `1..=u16::MAX` and the grid may hold at
    /// most [`MAX_GRID_CELLS`] cells.
    pub fn new(cols: usize, rows: usize) -> Result<Self, LayoutError> {
        let max = usize::from(u16::MAX);
        let cells = cols.checked_mul(rows).unwrap_or(usize::MAX);
        if cols == 0 || rows == 0 || cols > max || rows > max || cells > MAX_GRID_CELLS {
            return Err(LayoutError::InvalidGridDimensions { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            cells: vec![None; cols * rows],
            container: None,
        })
    }

    /// A square `n x n` grid.
    pub fn square(n: usize) -> Result<Self, LayoutError> {
        Self::new(n, n)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, LayoutError> {
        if x >= self.cols || y >= self.rows {
            return Err(LayoutError::CellOutOfBounds {
                x,
                y,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(x * self.rows + y)
    }

    fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.rows, index % self.rows)
    }

    fn occupied(&self) -> impl Iterator<Item = (usize, &GridCell)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.as_ref().map(|cell| (index, cell)))
    }

    /// The cell at `(x, y)`, if occupied.
    pub fn cell(&self, x: usize, y: usize) -> Result<Option<&GridCell>, LayoutError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index].as_ref())
    }

    /// True when every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Coordinates of `element`, if it is in the grid.
    pub fn position_of(&self, element: &ElementHandle) -> Option<(usize, usize)> {
        self.occupied()
            .find(|(_, cell)| same_element(&cell.element, element))
            .map(|(index, _)| self.coords(index))
    }

    /// Place `element` in the first free cell, scanning columns left to right
    /// and each column top to bottom.
    ///
    /// Returns `false` if the element is already in the grid or no cell is free.
    pub fn add_with_anchor(&mut self, element: ElementHandle, anchor: GridAnchor) -> bool {
        if self.contains(&element) {
            debug!("grid: duplicate add ignored");
            return false;
        }
        let Some(slot) = self.cells.iter_mut().find(|cell| cell.is_none()) else {
            debug!(cols = self.cols, rows = self.rows, "grid: no free cell");
            return false;
        };
        *slot = Some(GridCell::capture(element, anchor));
        true
    }

    /// Place `element` at `(x, y)` with the default anchor.
    pub fn add_at(
        &mut self,
        element: ElementHandle,
        x: usize,
        y: usize,
    ) -> Result<bool, LayoutError> {
        self.add_at_with_anchor(element, x, y, GridAnchor::default())
    }

    /// Place `element` at `(x, y)`.
    ///
    /// Coordinates outside the grid are an error. An occupied cell keeps its
    /// occupant and the call returns `Ok(false)`, as does re-adding an element
    /// that is already in the grid.
    pub fn add_at_with_anchor(
        &mut self,
        element: ElementHandle,
        x: usize,
        y: usize,
        anchor: GridAnchor,
    ) -> Result<bool, LayoutError> {
        let index = self.index(x, y)?;
        if self.cells[index].is_some() {
            debug!(x, y, "grid: cell occupied");
            return Ok(false);
        }
        if self.contains(&element) {
            debug!(x, y, "grid: duplicate add ignored");
            return Ok(false);
        }
        self.cells[index] = Some(GridCell::capture(element, anchor));
        Ok(true)
    }

    /// Clear the cell at `(x, y)`. Returns whether it was occupied.
    pub fn remove_at(&mut self, x: usize, y: usize) -> Result<bool, LayoutError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index].take().is_some())
    }

    /// The rectangle of cell `(x, y)` inside a container of `container` size.
    pub fn cell_rect(&self, x: usize, y: usize, container: Size) -> Rect {
        let cell = self.cell_size(container);
        Rect::new(
            x as i32 * cell.width,
            y as i32 * cell.height,
            cell.width,
            cell.height,
        )
    }

    /// Size of one cell. Remainder pixels are discarded.
    pub fn cell_size(&self, container: Size) -> Size {
        Size::new(
            container.width / self.cols as i32,
            container.height / self.rows as i32,
        )
    }
}

impl LayoutManager for GridLayout {
    fn add_element(&mut self, element: ElementHandle) -> bool {
        self.add_with_anchor(element, GridAnchor::default())
    }

    fn remove_element(&mut self, element: &ElementHandle) -> bool {
        let Some(slot) = self
            .cells
            .iter_mut()
            .find(|cell| cell.as_ref().is_some_and(|c| same_element(&c.element, element)))
        else {
            return false;
        };
        *slot = None;
        true
    }

    fn revalidate(&mut self) {
        let Some((container, size)) = bound_container(self.container.as_ref()) else {
            return;
        };

        let focused = focus_owner(self.occupied().map(|(_, cell)| &cell.element));
        debug!(
            cols = self.cols,
            rows = self.rows,
            width = size.width,
            height = size.height,
            occupied = self.occupied().count(),
            "grid: revalidate"
        );

        for (index, cell) in self.occupied() {
            let (x, y) = self.coords(index);
            let cell_rect = self.cell_rect(x, y, size);
            {
                let mut element = cell.element.borrow_mut();
                let hosts_layout = element.nested_layout().is_some();
                let bounds = cell.bounds_in(cell_rect, hosts_layout);
                element.set_bounds(bounds);
                descend(&mut *element);
                trace!(x, y, bounds = ?bounds, "grid: placed");
            }
            container.borrow_mut().render_element(&cell.element);
        }

        restore_focus(focused);
    }

    fn set_container(&mut self, container: ContainerHandle) {
        self.container = Some(container);
        self.revalidate();
    }

    fn elements(&self) -> Vec<ElementHandle> {
        self.occupied().map(|(_, cell)| cell.element.clone()).collect()
    }

    fn pack_size(&self) -> Size {
        let largest = self
            .occupied()
            .fold(Size::ZERO, |acc, (_, cell)| acc.max(cell.original_size));
        Size::new(
            largest.width * self.cols as i32,
            largest.height * self.rows as i32,
        )
    }
}

/// Origin of a `size` box anchored inside `cell`. Assumes the box fits.
pub fn anchored_origin(cell: Rect, size: Size, anchor: GridAnchor) -> Point {
    let free_x = cell.width - size.width;
    let free_y = cell.height - size.height;
    let (horizontal, vertical) = anchor.thirds();
    cell.origin().offset(
        free_x / 2 + horizontal.shift_from_center(free_x),
        free_y / 2 + vertical.shift_from_center(free_y),
    )
}
