//! Bulk-loaded bounding-box tree for viewport culling and brush selection.
//!
//! DESIGN
//! ======
//! The tree is packed once with Sort-Tile-Recursive and never updated in
//! place: callers rebuild it at the start of a gesture from the shapes' rotated
//! bounds. Shapes created or deleted mid-gesture are not visible until the
//! next `load`. Queries return keys in load order so results are stable.

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

use crate::bounds::{Bounds, common_bounds};

/// Maximum children per tree node.
const NODE_CAPACITY: usize = 9;

enum Node {
    Leaf { bbox: Bounds, items: Vec<usize> },
    Branch { bbox: Bounds, children: Vec<Node> },
}

impl Node {
    fn bbox(&self) -> &Bounds {
        match self {
            Self::Leaf { bbox, .. } | Self::Branch { bbox, .. } => bbox,
        }
    }

    fn collect(&self, query: &Bounds, entries: &[Bounds], out: &mut Vec<usize>) {
        if !self.bbox().collides(query) {
            return;
        }
        match self {
            Self::Leaf { items, .. } => {
                out.extend(items.iter().copied().filter(|&i| entries[i].collides(query)));
            }
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect(query, entries, out);
                }
            }
        }
    }
}

/// Static R-tree keyed by `K`.
pub struct SpatialIndex<K> {
    keys: Vec<K>,
    boxes: Vec<Bounds>,
    root: Option<Node>,
}

impl<K> Default for SpatialIndex<K> {
    fn default() -> Self {
        Self { keys: Vec::new(), boxes: Vec::new(), root: None }
    }
}

impl<K> SpatialIndex<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `entries` and repack the tree.
    pub fn load(&mut self, entries: impl IntoIterator<Item = (K, Bounds)>) {
        let (keys, boxes): (Vec<K>, Vec<Bounds>) = entries.into_iter().unzip();
        self.keys = keys;
        self.boxes = boxes;
        self.root = build(&self.boxes);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.boxes.clear();
        self.root = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Union of every stored box.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.root.as_ref().map(|n| *n.bbox())
    }

    /// Keys whose box intersects `query` (touching edges count), in load order.
    #[must_use]
    pub fn search(&self, query: &Bounds) -> Vec<&K> {
        let Some(root) = &self.root else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        root.collect(query, &self.boxes, &mut hits);
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.keys[i]).collect()
    }

    /// Whether anything intersects `query`.
    #[must_use]
    pub fn collides(&self, query: &Bounds) -> bool {
        !self.search(query).is_empty()
    }

    /// Tree height; a single leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Branch { children, .. } => 1 + children.iter().map(walk).max().unwrap_or(0),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }
}

fn build(boxes: &[Bounds]) -> Option<Node> {
    if boxes.is_empty() {
        return None;
    }
    let indices: Vec<usize> = (0..boxes.len()).collect();
    let mut level: Vec<Node> = tile(indices, |&i| boxes[i])
        .into_iter()
        .map(|items| {
            let member_boxes: Vec<Bounds> = items.iter().map(|&i| boxes[i]).collect();
            let bbox = common_bounds(&member_boxes).unwrap_or_default();
            Node::Leaf { bbox, items }
        })
        .collect();

    while level.len() > 1 {
        level = tile(level, |n| *n.bbox())
            .into_iter()
            .map(|children| {
                let child_boxes: Vec<Bounds> = children.iter().map(|c| *c.bbox()).collect();
                let bbox = common_bounds(&child_boxes).unwrap_or_default();
                Node::Branch { bbox, children }
            })
            .collect();
    }
    level.pop()
}

/// Partition `items` into groups of at most `NODE_CAPACITY` by sorting into
/// vertical slices on x, then runs on y within each slice.
fn tile<T>(mut items: Vec<T>, bbox: impl Fn(&T) -> Bounds) -> Vec<Vec<T>> {
    let n = items.len();
    if n <= NODE_CAPACITY {
        return vec![items];
    }
    let leaf_count = n.div_ceil(NODE_CAPACITY);
    let slice_count = (leaf_count as f64).sqrt().ceil() as usize;
    let slice_size = NODE_CAPACITY * slice_count;

    items.sort_by(|a, b| bbox(a).center().x.total_cmp(&bbox(b).center().x));

    let mut groups = Vec::with_capacity(leaf_count);
    while !items.is_empty() {
        let rest = items.split_off(slice_size.min(items.len()));
        let mut slice = std::mem::replace(&mut items, rest);
        slice.sort_by(|a, b| bbox(a).center().y.total_cmp(&bbox(b).center().y));
        while !slice.is_empty() {
            let tail = slice.split_off(NODE_CAPACITY.min(slice.len()));
            groups.push(std::mem::replace(&mut slice, tail));
        }
    }
    groups
}
