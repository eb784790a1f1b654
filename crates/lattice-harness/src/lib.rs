#![forbid(unsafe_code)]

//! Headless scene runner.
//!
//! A scene is a JSON tree of layout nodes and leaves:
//!
//! ```json
//! {"width": 200, "height": 100, "root": {
//!     "kind": "partitioned", "direction": "row", "children": [
//!         {"partition": 30, "node": {"kind": "leaf", "id": "nav", "width": 40, "height": 90}},
//!         {"partition": 10},
//!         {"partition": 60, "node": {"kind": "grid", "id": "body", "cols": 2, "rows": 2,
//!             "width": 120, "height": 100, "children": [
//!                 {"at": [1, 0], "anchor": "top-right",
//!                  "node": {"kind": "leaf", "id": "logo", "width": 20, "height": 20}}
//!         ]}}
//!     ]
//! }}
//! ```
//!
//! The root is bound to a surface of the scene size and revalidated once;
//! nested layouts become [`Panel`]s sized from `width`/`height`, or from the
//! layout's pack size when those are omitted. Every node with an `id` yields
//! one placement record, relative to its parent container. Records come in
//! build order: a panel's children before the panel itself.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"placement","id":"nav","x":10,"y":5,"width":40,"height":90}
//! {"event":"complete","elements":3,"checksum":"fnv1a64:..."}
//! ```
//!
//! # Environment
//!
//! - `LATTICE_HARNESS_SCENE`: scene path when none is given on the command line
//! - `LATTICE_HARNESS_WIDTH` / `LATTICE_HARNESS_HEIGHT`: override the scene size
//! - `LATTICE_HARNESS_REVALIDATE_TWICE`: revalidate again and fail if anything moved

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lattice_core::{debug, info};
use lattice_layout::{
    ContainerHandle, ElementHandle, FlowAlignment, FlowLayout, GridAnchor, GridLayout,
    LayoutElement, LayoutError, LayoutManager, Leaf, Panel, PartitionAlignment,
    PartitionDirection, PartitionedLayout, Size, Surface, VerticalAlignment,
};
use serde::{Deserialize, Serialize};

pub const SCENE_ENV: &str = "LATTICE_HARNESS_SCENE";
pub const WIDTH_ENV: &str = "LATTICE_HARNESS_WIDTH";
pub const HEIGHT_ENV: &str = "LATTICE_HARNESS_HEIGHT";
pub const REVALIDATE_TWICE_ENV: &str = "LATTICE_HARNESS_REVALIDATE_TWICE";

const CHECKSUM_ALGO: &str = "fnv1a64";
const FNV64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01B3;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum HarnessError {
    /// No scene path on the command line or in the environment.
    MissingScene,
    Io(io::Error),
    Json(serde_json::Error),
    Layout(LayoutError),
    /// The scene root, or a node used as a layout, is a leaf.
    NotALayout { id: String },
    /// Two nodes share an id.
    DuplicateId(String),
    /// An engine refused a child (full grid, occupied cell, partition budget).
    Rejected { parent: String, child: String },
    /// A second revalidate moved an element.
    NotIdempotent { id: String },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingScene => write!(f, "no scene given: pass a path or set {SCENE_ENV}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "invalid scene: {err}"),
            Self::Layout(err) => write!(f, "layout error: {err}"),
            Self::NotALayout { id } => write!(f, "leaf {id:?} cannot host children"),
            Self::DuplicateId(id) => write!(f, "duplicate node id {id:?}"),
            Self::Rejected { parent, child } => {
                write!(f, "{parent} refused child {child}")
            }
            Self::NotIdempotent { id } => {
                write!(f, "{id:?} moved on a second revalidate")
            }
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for HarnessError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<LayoutError> for HarnessError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

// ============================================================================
// Scene description
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub width: i32,
    pub height: i32,
    pub root: SceneNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SceneNode {
    Leaf(LeafNode),
    Flow(FlowNode),
    Grid(GridNode),
    Partitioned(PartitionedNode),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeafNode {
    pub id: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub focused: bool,
}

/// Id and size of a nested layout's panel. Ignored on the scene root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelFrame {
    pub id: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowNode {
    #[serde(flatten)]
    pub frame: PanelFrame,
    pub alignment: Option<FlowAlignment>,
    pub vertical_alignment: Option<VerticalAlignment>,
    pub hgap: Option<u16>,
    pub vgap: Option<u16>,
    pub hpadding: Option<u16>,
    pub vpadding: Option<u16>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridNode {
    #[serde(flatten)]
    pub frame: PanelFrame,
    pub cols: usize,
    pub rows: usize,
    #[serde(default)]
    pub children: Vec<GridChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridChild {
    /// Explicit `[x, y]` cell; the first free cell otherwise.
    pub at: Option<[usize; 2]>,
    pub anchor: Option<GridAnchor>,
    pub node: SceneNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartitionedNode {
    #[serde(flatten)]
    pub frame: PanelFrame,
    pub direction: Option<PartitionDirection>,
    pub default_partition: Option<u8>,
    pub default_alignment: Option<PartitionAlignment>,
    #[serde(default)]
    pub children: Vec<PartitionChild>,
}

/// A partitioned entry. Without a `node` it is a spacer.
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionChild {
    pub partition: Option<u8>,
    pub alignment: Option<PartitionAlignment>,
    pub node: Option<SceneNode>,
}

impl SceneNode {
    fn label(&self) -> String {
        let (kind, id) = match self {
            Self::Leaf(decl) => ("leaf", Some(decl.id.as_str())),
            Self::Flow(decl) => ("flow", decl.frame.id.as_deref()),
            Self::Grid(decl) => ("grid", decl.frame.id.as_deref()),
            Self::Partitioned(decl) => ("partitioned", decl.frame.id.as_deref()),
        };
        match id {
            Some(id) => format!("{kind} {id:?}"),
            None => kind.to_string(),
        }
    }
}

pub fn parse_scene(json: &str) -> Result<Scene, HarnessError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_scene(path: &Path) -> Result<Scene, HarnessError> {
    let json = std::fs::read_to_string(path)?;
    parse_scene(&json)
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub scene_path: Option<PathBuf>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub revalidate_twice: bool,
}

impl HarnessConfig {
    /// Read the `LATTICE_HARNESS_*` variables.
    pub fn from_env() -> Self {
        Self {
            scene_path: env_string(SCENE_ENV).map(PathBuf::from),
            width: env_i32(WIDTH_ENV),
            height: env_i32(HEIGHT_ENV),
            revalidate_twice: env_flag(REVALIDATE_TWICE_ENV).unwrap_or(false),
        }
    }

    fn container_size(&self, scene: &Scene) -> Size {
        Size::new(
            self.width.unwrap_or(scene.width),
            self.height.unwrap_or(scene.height),
        )
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    ))
}

fn env_i32(name: &str) -> Option<i32> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<i32>().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ============================================================================
// Building
// ============================================================================

#[derive(Default)]
struct Builder {
    registry: Vec<(String, ElementHandle)>,
}

impl Builder {
    fn register(&mut self, id: &str, handle: &ElementHandle) -> Result<(), HarnessError> {
        if self.registry.iter().any(|(existing, _)| existing == id) {
            return Err(HarnessError::DuplicateId(id.to_string()));
        }
        self.registry.push((id.to_string(), handle.clone()));
        Ok(())
    }

    fn layout(&mut self, node: &SceneNode) -> Result<Box<dyn LayoutManager>, HarnessError> {
        let parent = node.label();
        let refused = |child: &SceneNode| HarnessError::Rejected {
            parent: parent.clone(),
            child: child.label(),
        };

        match node {
            SceneNode::Leaf(decl) => Err(HarnessError::NotALayout {
                id: decl.id.clone(),
            }),
            SceneNode::Flow(decl) => {
                let mut flow = FlowLayout::new();
                if let Some(alignment) = decl.alignment {
                    flow = flow.with_alignment(alignment);
                }
                if let Some(alignment) = decl.vertical_alignment {
                    flow = flow.with_vertical_alignment(alignment);
                }
                if let Some(hgap) = decl.hgap {
                    flow = flow.with_hgap(hgap);
                }
                if let Some(vgap) = decl.vgap {
                    flow = flow.with_vgap(vgap);
                }
                if let Some(hpadding) = decl.hpadding {
                    flow = flow.with_hpadding(hpadding);
                }
                if let Some(vpadding) = decl.vpadding {
                    flow = flow.with_vpadding(vpadding);
                }
                for child in &decl.children {
                    let element = self.element(child)?;
                    if !flow.add_element(element) {
                        return Err(refused(child));
                    }
                }
                Ok(Box::new(flow))
            }
            SceneNode::Grid(decl) => {
                let mut grid = GridLayout::new(decl.cols, decl.rows)?;
                for child in &decl.children {
                    let element = self.element(&child.node)?;
                    let anchor = child.anchor.unwrap_or_default();
                    let added = match child.at {
                        Some([x, y]) => grid.add_at_with_anchor(element, x, y, anchor)?,
                        None => grid.add_with_anchor(element, anchor),
                    };
                    if !added {
                        return Err(refused(&child.node));
                    }
                }
                Ok(Box::new(grid))
            }
            SceneNode::Partitioned(decl) => {
                let mut layout = PartitionedLayout::new();
                if let Some(direction) = decl.direction {
                    layout = layout.with_direction(direction);
                }
                if let Some(partition) = decl.default_partition {
                    layout = layout.with_default_partition(partition);
                }
                if let Some(alignment) = decl.default_alignment {
                    layout = layout.with_default_alignment(alignment);
                }
                for (index, child) in decl.children.iter().enumerate() {
                    let partition = child.partition.unwrap_or(layout.default_partition());
                    let alignment = child.alignment.unwrap_or(layout.default_alignment());
                    let added = match child.node.as_ref() {
                        Some(node) => {
                            let element = self.element(node)?;
                            if layout.add_aligned(element, partition, alignment) {
                                true
                            } else {
                                return Err(refused(node));
                            }
                        }
                        None => layout.spacer(partition),
                    };
                    if !added {
                        return Err(HarnessError::Rejected {
                            parent: parent.clone(),
                            child: format!("spacer #{index}"),
                        });
                    }
                }
                Ok(Box::new(layout))
            }
        }
    }

    fn element(&mut self, node: &SceneNode) -> Result<ElementHandle, HarnessError> {
        let frame = match node {
            SceneNode::Leaf(decl) => {
                let mut leaf = Leaf::new(decl.width, decl.height);
                if decl.focused {
                    leaf = leaf.focused();
                }
                let handle: ElementHandle = Rc::new(RefCell::new(leaf));
                self.register(&decl.id, &handle)?;
                return Ok(handle);
            }
            SceneNode::Flow(decl) => &decl.frame,
            SceneNode::Grid(decl) => &decl.frame,
            SceneNode::Partitioned(decl) => &decl.frame,
        };

        let panel = Panel::new(self.layout(node)?);
        let packed = panel.layout().pack_size();
        let size = Size::new(
            frame.width.unwrap_or(packed.width),
            frame.height.unwrap_or(packed.height),
        );
        debug!(node = %node.label(), width = size.width, height = size.height, "harness: panel");
        let handle: ElementHandle = Rc::new(RefCell::new(panel.with_size(size)));
        if let Some(id) = frame.id.as_deref() {
            self.register(id, &handle)?;
        }
        Ok(handle)
    }
}

// ============================================================================
// Running
// ============================================================================

/// Where one identified node ended up, relative to its parent container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRun {
    pub container: Size,
    pub placements: Vec<Placement>,
    pub checksum: String,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Placement(&'a Placement),
    Complete {
        elements: usize,
        checksum: &'a str,
    },
}

fn snapshot(registry: &[(String, ElementHandle)]) -> Vec<Placement> {
    registry
        .iter()
        .map(|(id, handle)| {
            let bounds = handle.borrow().bounds();
            Placement {
                id: id.clone(),
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            }
        })
        .collect()
}

fn fnv1a64_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

/// Stable hash of a placement list. Identical layouts hash identically on
/// every platform.
pub fn placements_checksum(placements: &[Placement]) -> String {
    let mut hash = FNV64_OFFSET_BASIS;
    for placement in placements {
        hash = fnv1a64_extend(hash, placement.id.as_bytes());
        hash = fnv1a64_extend(hash, &[0]);
        for value in [placement.x, placement.y, placement.width, placement.height] {
            hash = fnv1a64_extend(hash, &value.to_le_bytes());
        }
    }
    format!("{CHECKSUM_ALGO}:{hash:016x}")
}

/// Build `scene`, lay it out once and collect the placements.
pub fn run_scene(scene: &Scene, config: &HarnessConfig) -> Result<SceneRun, HarnessError> {
    let container = config.container_size(scene);
    let mut builder = Builder::default();
    let mut root = builder.layout(&scene.root)?;

    let surface: ContainerHandle = Rc::new(RefCell::new(Surface::new(
        container.width,
        container.height,
    )));
    root.set_container(surface);
    let placements = snapshot(&builder.registry);

    if config.revalidate_twice {
        root.revalidate();
        let again = snapshot(&builder.registry);
        if let Some((before, _)) = placements.iter().zip(&again).find(|(a, b)| a != b) {
            return Err(HarnessError::NotIdempotent {
                id: before.id.clone(),
            });
        }
    }

    let checksum = placements_checksum(&placements);
    info!(
        width = container.width,
        height = container.height,
        elements = placements.len(),
        checksum = %checksum,
        "harness: scene laid out"
    );
    Ok(SceneRun {
        container,
        placements,
        checksum,
    })
}

/// One JSON object per placement, then a completion record.
pub fn to_jsonl(run: &SceneRun) -> Result<String, HarnessError> {
    let mut out = String::new();
    for placement in &run.placements {
        out.push_str(&serde_json::to_string(&Record::Placement(placement))?);
        out.push('\n');
    }
    out.push_str(&serde_json::to_string(&Record::Complete {
        elements: run.placements.len(),
        checksum: &run.checksum,
    })?);
    out.push('\n');
    Ok(out)
}
