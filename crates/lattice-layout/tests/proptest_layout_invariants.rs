//! Property-based invariant tests for the layout engines.
//!
//! 1. Flow placement is deterministic across revalidations.
//! 2. LEFT and RIGHT rows never overlap horizontally.
//! 3. CENTER rows hand out exactly the unused row width as gaps.
//! 4. Occupied grid cells render into disjoint boxes.
//! 5. Grid overflow is clamped to the cell, never shrunk further.
//! 6. The partition sum always matches the live partitions and stays <= 100.
//! 7. Partition bands follow their rounded shares and never overrun the axis.

use std::cell::RefCell;
use std::rc::Rc;

use lattice_layout::{
    ElementHandle, FlowAlignment, FlowLayout, GridLayout, LayoutElement, LayoutManager, Leaf,
    PartitionDirection, PartitionedLayout, Size, Surface, pack_rows,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn sizes_strategy(max_len: usize) -> impl Strategy<Value = Vec<Size>> {
    prop::collection::vec(
        (1i32..=120, 1i32..=60).prop_map(|(w, h)| Size::new(w, h)),
        1..=max_len,
    )
}

fn alignment_strategy() -> impl Strategy<Value = FlowAlignment> {
    prop::sample::select(FlowAlignment::ALL.to_vec())
}

fn leaves(sizes: &[Size]) -> Vec<Rc<RefCell<Leaf>>> {
    sizes
        .iter()
        .map(|s| Rc::new(RefCell::new(Leaf::new(s.width, s.height))))
        .collect()
}

fn flow(alignment: FlowAlignment, hgap: u16, hpadding: u16) -> FlowLayout {
    FlowLayout::new()
        .with_alignment(alignment)
        .with_hgap(hgap)
        .with_hpadding(hpadding)
}

#[derive(Debug, Clone)]
enum PartitionOp {
    Add(u8),
    Spacer(u8),
    RemoveAt(usize),
    Set(usize, u8),
}

fn partition_op() -> impl Strategy<Value = PartitionOp> {
    prop_oneof![
        (0u8..=120).prop_map(PartitionOp::Add),
        (0u8..=60).prop_map(PartitionOp::Spacer),
        (0usize..8).prop_map(PartitionOp::RemoveAt),
        (0usize..8, 0u8..=100).prop_map(|(i, p)| PartitionOp::Set(i, p)),
    ]
}

proptest! {
    #[test]
    fn flow_revalidate_is_deterministic(
        sizes in sizes_strategy(12),
        alignment in alignment_strategy(),
        hgap in 0u16..=10,
        hpadding in 0u16..=10,
        width in 1i32..=600,
        height in 1i32..=400,
    ) {
        let elements = leaves(&sizes);
        let mut layout = flow(alignment, hgap, hpadding);
        for element in &elements {
            layout.add_element(element.clone());
        }
        layout.set_container(Rc::new(RefCell::new(Surface::new(width, height))));
        let first: Vec<_> = elements.iter().map(|e| e.borrow().position()).collect();
        layout.revalidate();
        let second: Vec<_> = elements.iter().map(|e| e.borrow().position()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn flow_rows_do_not_overlap(
        sizes in sizes_strategy(12),
        right in any::<bool>(),
        hgap in 0u16..=10,
        hpadding in 0u16..=10,
        width in 1i32..=600,
    ) {
        let alignment = if right { FlowAlignment::Right } else { FlowAlignment::Left };
        let layout = flow(alignment, hgap, hpadding);
        let container = Size::new(width, 300);
        let positions = layout.solve(container, &sizes);
        let widths: Vec<i32> = sizes.iter().map(|s| s.width).collect();
        let max_width = width - 2 * i32::from(hpadding);

        for row in pack_rows(&widths, max_width, i32::from(hgap)) {
            for i in row.start..row.end - 1 {
                prop_assert!(
                    positions[i + 1].x >= positions[i].x + sizes[i].width,
                    "element {} at {:?} overlaps {} at {:?}",
                    i + 1, positions[i + 1], i, positions[i]
                );
            }
        }
    }

    #[test]
    fn flow_center_gaps_sum_to_free_width(
        sizes in sizes_strategy(10),
        hgap in 0u16..=10,
        hpadding in 0u16..=10,
        width in 1i32..=600,
    ) {
        let layout = flow(FlowAlignment::Center, hgap, hpadding);
        let hgap = i32::from(hgap);
        let hpadding = i32::from(hpadding);
        let positions = layout.solve(Size::new(width, 300), &sizes);
        let widths: Vec<i32> = sizes.iter().map(|s| s.width).collect();
        let max_width = width - 2 * hpadding;

        for row in pack_rows(&widths, max_width, hgap) {
            let first = row.start;
            let last = row.end - 1;
            let count = row.len() as i32;
            let content: i32 = widths[row.clone()].iter().sum();

            let leading = positions[first].x - hpadding;
            let trailing = hpadding + max_width - (positions[last].x + widths[last]);
            let between: i32 = (first..last)
                .map(|i| positions[i + 1].x - (positions[i].x + widths[i]) - hgap)
                .sum();

            prop_assert_eq!(
                leading + between + trailing,
                max_width - content - (count - 1) * hgap
            );
        }
    }

    #[test]
    fn grid_cells_render_disjoint(
        cols in 1usize..=5,
        rows in 1usize..=5,
        sizes in sizes_strategy(25),
        width in 50i32..=500,
        height in 50i32..=500,
    ) {
        let mut grid = GridLayout::new(cols, rows).unwrap();
        let elements = leaves(&sizes);
        for element in &elements {
            grid.add_element(element.clone());
        }
        grid.set_container(Rc::new(RefCell::new(Surface::new(width, height))));

        let placed: Vec<_> = grid.elements().iter().map(|e| e.borrow().bounds()).collect();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                prop_assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn grid_overflow_stays_visible(
        cols in 1usize..=4,
        rows in 1usize..=4,
        size in (1i32..=300, 1i32..=300),
        width in 20i32..=400,
        height in 20i32..=400,
    ) {
        let mut grid = GridLayout::new(cols, rows).unwrap();
        let element = Rc::new(RefCell::new(Leaf::new(size.0, size.1)));
        grid.add_element(element.clone());
        let container = Size::new(width, height);
        grid.set_container(Rc::new(RefCell::new(Surface::new(width, height))));

        let cell = grid.cell_size(container);
        let rendered = element.borrow().size();
        if size.0 >= cell.width || size.1 >= cell.height {
            prop_assert_eq!(rendered.width, cell.width.min(size.0));
            prop_assert_eq!(rendered.height, cell.height.min(size.1));
        } else {
            prop_assert_eq!(rendered, Size::new(size.0, size.1));
        }
    }

    #[test]
    fn partition_sum_is_conserved(ops in prop::collection::vec(partition_op(), 0..40)) {
        let mut layout = PartitionedLayout::new();
        for op in ops {
            match op {
                PartitionOp::Add(p) => {
                    let element: ElementHandle = Rc::new(RefCell::new(Leaf::new(1, 1)));
                    layout.add_with_partition(element, p);
                }
                PartitionOp::Spacer(p) => {
                    layout.spacer(p);
                }
                PartitionOp::RemoveAt(i) => {
                    layout.remove_at(i);
                }
                PartitionOp::Set(i, p) => {
                    let _ = layout.set_partition(i, p);
                }
            }
            let live: u16 = layout.partitions().iter().map(|&p| u16::from(p)).sum();
            prop_assert_eq!(layout.partitions_sum(), live);
            prop_assert!(layout.partitions_sum() <= 100);
        }
    }

    #[test]
    fn partition_bands_tile_within_axis(
        shares in prop::collection::vec(0u8..=40, 1..8),
        row in any::<bool>(),
        axis in 0i32..=2_000,
    ) {
        let direction = if row { PartitionDirection::Row } else { PartitionDirection::Column };
        let mut layout = PartitionedLayout::new().with_direction(direction);
        for &share in &shares {
            layout.spacer(share);
        }
        let container = Size::new(axis, axis);
        let bands = layout.bands(container);

        let mut cursor = 0;
        for (band, share) in bands.iter().zip(layout.partitions()) {
            let (start, length) = match direction {
                PartitionDirection::Row => (band.x, band.width),
                PartitionDirection::Column => (band.y, band.height),
            };
            let rounded = (i32::from(share) * axis + 50) / 100;
            prop_assert_eq!(start, cursor);
            prop_assert!(length >= 0);
            prop_assert_eq!(length, rounded.min(axis - cursor));
            cursor += length;
        }
        prop_assert!(cursor <= axis);
    }
}
