// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect, RoundedRect};
use understory_index::{Aabb2D, Backend, FlatVec, IndexGeneric, Key as AabbKey};

use crate::damage::Damage;
use crate::types::{ClipBehavior, LocalNode, NodeFlags, NodeId};
use crate::util::{rect_to_aabb, transform_rect_bbox};

/// Top-level region tree.
///
/// The type parameter `B` controls which spatial index backend is used. It
/// defaults to a flat-vector backend (`FlatVec<f64>`), so most callers can
/// simply use [`Tree`] without specifying `B`. Advanced callers can override
/// `B` to use an R-tree or BVH backend from `understory_index`.
pub struct Tree<B: Backend<f64> = FlatVec<f64>> {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    pub(crate) free_list: Vec<usize>,
    pub(crate) epoch: u64,
    pub(crate) index: IndexGeneric<f64, NodeId, B>,
}

impl<B: Backend<f64> + core::fmt::Debug> core::fmt::Debug for Tree<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("epoch", &self.epoch)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<B> Default for Tree<B>
where
    B: Backend<f64> + Default,
{
    fn default() -> Self {
        Self::with_backend(B::default())
    }
}

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
}

/// Filters applied during hit testing and rectangle intersection.
///
/// Used by [`Tree::hit_test_point`] and [`Tree::intersect_rect`].
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Bitfield of required node flags. Only nodes containing all these flags will be included.
    pub required_flags: NodeFlags,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            required_flags: NodeFlags::empty(),
        }
    }
}

impl QueryFilter {
    /// Create a new empty filter (includes all nodes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to only visible nodes.
    pub fn visible(mut self) -> Self {
        self.required_flags |= NodeFlags::VISIBLE;
        self
    }

    /// Filter to only pickable nodes.
    pub fn pickable(mut self) -> Self {
        self.required_flags |= NodeFlags::PICKABLE;
        self
    }

    /// Filter to only focusable nodes.
    pub fn focusable(mut self) -> Self {
        self.required_flags |= NodeFlags::FOCUSABLE;
        self
    }

    /// Check if a node's flags satisfy this filter.
    pub fn matches(&self, node_flags: NodeFlags) -> bool {
        node_flags.contains(self.required_flags)
    }
}

#[derive(Clone, Debug, Default)]
struct WorldNode {
    world_transform: Affine,
    world_bounds: Rect, // AABB of transformed (and clipped) local bounds
    world_clip: Option<Rect>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Dirty {
    layout: bool,
    transform: bool,
    clip: bool,
    z: bool,
    index: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    world: WorldNode,
    dirty: Dirty,
    index_key: Option<AabbKey>,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
            dirty: Dirty {
                layout: true,
                transform: true,
                clip: true,
                z: true,
                index: true,
            },
            index_key: None,
        }
    }
}

impl Tree {
    /// Create a new empty tree using the default backend (`FlatVec<f64>`).
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            index: IndexGeneric::new(),
        }
    }
}

impl<B: Backend<f64>> Tree<B> {
    /// Create a new tree with a specific backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            index: IndexGeneric::with_backend(backend),
        }
    }

    fn mark_subtree_dirty(&mut self, id: NodeId, flags: Dirty) {
        if !self.is_alive(id) {
            return;
        }
        let children = {
            let n = self.node_mut(id);
            n.dirty.layout |= flags.layout;
            n.dirty.transform |= flags.transform;
            n.dirty.clip |= flags.clip;
            n.dirty.z |= flags.z;
            n.dirty.index |= flags.index;
            n.children.clone()
        };
        for c in children {
            self.mark_subtree_dirty(c, flags);
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        if let Some(key) = self.node(id).index_key {
            self.index.remove(key);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Reparent `id` under `new_parent`.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.mark_subtree_dirty(
            id,
            Dirty {
                layout: true,
                transform: true,
                clip: true,
                z: true,
                index: true,
            },
        );
    }

    /// Update local transform.
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_transform = tf;
            n.dirty.transform = true;
            n.dirty.index = true;
        }
    }

    /// Update local clip. Application is controlled by [`ClipBehavior`].
    pub fn set_local_clip(&mut self, id: NodeId, clip: Option<RoundedRect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_clip = clip;
            n.dirty.clip = true;
            n.dirty.index = true;
        }
    }

    /// Update how local and ancestor clips are composed for this node.
    pub fn set_clip_behavior(&mut self, id: NodeId, behavior: ClipBehavior) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.clip_behavior = behavior;
            n.dirty.clip = true;
            n.dirty.index = true;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.z_index = z;
            n.dirty.z = true;
        }
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_bounds = bounds;
            n.dirty.layout = true;
            n.dirty.index = true;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
            n.dirty.index = true;
        }
    }

    /// Return the world transform for a live node as of the last [`Tree::commit`].
    ///
    /// The returned [`Affine`] maps from the node's local coordinate space into
    /// the tree's root/world space. Returns `None` for stale identifiers.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .map(|node| node.world.world_transform)
    }

    /// Return the world-space axis-aligned bounding box for a live node.
    ///
    /// This is the conservative AABB computed during [`Tree::commit`], after
    /// applying local transforms and any active clips. Returns `None` for stale
    /// identifiers.
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .map(|node| node.world.world_bounds)
    }

    /// Access a node for debugging; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably for debugging; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    /// Run the batched update and return coarse damage.
    pub fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();

        for root in roots {
            self.update_world_recursive(root, Affine::IDENTITY, None, &mut damage);
        }

        let idx_damage = self.index.commit();
        if let Some(u) = idx_damage.union() {
            let r = Rect::new(u.min_x, u.min_y, u.max_x, u.max_y);
            damage.dirty_rects.push(r);
        }

        damage
    }

    /// Hit test a world-space point. Returns the topmost node.
    ///
    /// If multiple nodes overlap with the same `z_index`, the newer [`NodeId`] wins.
    /// This tie-break is intentionally deterministic for now.
    /// In the future this may be made configurable (for example via a `TieBreakPolicy`).
    pub fn hit_test_point(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        let candidates: Vec<NodeId> = self
            .index
            .query_point(pt.x, pt.y)
            .map(|(_, id)| id)
            .collect();
        let mut best: Option<(NodeId, i32, usize)> = None;
        for id in candidates {
            let Some(node) = self.nodes[id.idx()].as_ref() else {
                continue;
            };
            if !filter.matches(node.local.flags) {
                continue;
            }
            if node.local.clip_behavior != ClipBehavior::None
                && let Some(clip) = node.local.local_clip
            {
                let world_pt = node.world.world_transform.inverse() * pt;
                if !clip.rect().contains(world_pt) {
                    continue;
                }
            }
            let depth = self.depth(id);
            match best {
                None => best = Some((id, node.local.z_index, depth)),
                Some((best_id, z_best, depth_best)) => {
                    let z = node.local.z_index;
                    if z > z_best
                        || (z == z_best
                            && (depth > depth_best
                                || (depth == depth_best && id_is_newer(id, best_id))))
                    {
                        best = Some((id, z, depth));
                    }
                }
            }
        }
        best.map(|(node, _, _)| Hit {
            node,
            path: self.path_to_root(node),
        })
    }

    /// Iterate nodes intersecting a world-space rect.
    pub fn intersect_rect<'a>(
        &'a self,
        rect: Rect,
        filter: QueryFilter,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let q = rect_to_aabb(rect);
        let ids: Vec<NodeId> = self.index.query_rect(q).map(|(_, id)| id).collect();
        ids.into_iter().filter(move |id| {
            let Some(node) = self.nodes[id.idx()].as_ref() else {
                return false;
            };
            filter.matches(node.local.flags)
        })
    }
}

#[inline]
fn id_is_newer(a: NodeId, b: NodeId) -> bool {
    (a.1 > b.1) || (a.1 == b.1 && a.0 > b.0)
}

impl<B: Backend<f64>> Tree<B> {
    // --- internals ---

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the z-index of a node if the identifier is live.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .map(|node| node.local.z_index)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .and_then(|node| node.parent)
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .map(|node| node.local.flags)
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` if no next node exists or if the current node is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }

        self.next_in_order(current)
    }

    /// Get the previous node in reverse depth-first traversal order.
    ///
    /// Returns `None` if no previous node exists or if the current node is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }

        self.prev_in_order(current)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    fn next_in_order(&self, current: NodeId) -> Option<NodeId> {
        let children = &self.node(current).children;
        if let Some(&first_child) = children.first()
            && self.is_alive(first_child)
        {
            return Some(first_child);
        }

        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    fn prev_in_order(&self, current: NodeId) -> Option<NodeId> {
        if let Some(prev_sibling) = self.prev_sibling(current) {
            return self.last_in_subtree(&[prev_sibling]);
        }

        self.parent_of(current)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        if pos > 0 {
            siblings.get(pos - 1).copied()
        } else {
            None
        }
    }

    fn last_in_subtree(&self, nodes: &[NodeId]) -> Option<NodeId> {
        if let Some(&node) = nodes.first()
            && self.is_alive(node)
        {
            let children = &self.node(node).children;
            if let Some(last_child) = children.last()
                && self.is_alive(*last_child)
            {
                return self.last_in_subtree(&[*last_child]);
            }
            return Some(node);
        }
        None
    }

    /// Return the depth of a node in the tree (1-based), or 0 if the id is stale.
    ///
    /// Roots have depth 1, direct children of roots have depth 2, and so on.
    fn depth(&self, mut id: NodeId) -> usize {
        if !self.is_alive(id) {
            return 0;
        }
        let mut d = 0;
        loop {
            d += 1;
            match self.node(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
        d
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            let parent = self.node(id).parent;
            match parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: Affine,
        parent_clip: Option<Rect>,
        damage: &mut Damage,
    ) {
        enum IndexOp {
            Update(AabbKey, Aabb2D<f64>),
            Insert(Aabb2D<f64>),
        }
        let (old_bounds, child_ids, (_local, world), index_op) = {
            let node = self.node_mut(id);
            let old = node.world.world_bounds;
            node.world.world_transform = parent_tf * node.local.local_transform;
            let mut world_bounds =
                transform_rect_bbox(node.world.world_transform, node.local.local_bounds);
            let local_clip = node
                .local
                .local_clip
                .map(|rr| transform_rect_bbox(node.world.world_transform, rr.rect()));
            let world_clip = match node.local.clip_behavior {
                ClipBehavior::None => None,
                ClipBehavior::PreferLocal => local_clip.or(parent_clip),
                ClipBehavior::Inherit => match (local_clip, parent_clip) {
                    (Some(local), Some(parent)) => Some(local.intersect(parent)),
                    (Some(local), None) => Some(local),
                    (None, Some(parent)) => Some(parent),
                    (None, None) => None,
                },
            };
            if let Some(c) = world_clip {
                world_bounds = world_bounds.intersect(c);
            }
            node.world.world_bounds = world_bounds;
            node.world.world_clip = world_clip;
            let aabb = rect_to_aabb(world_bounds);
            let op = if let Some(key) = node.index_key {
                IndexOp::Update(key, aabb)
            } else {
                IndexOp::Insert(aabb)
            };
            let child_ids = node.children.clone();
            (old, child_ids, (node.local.clone(), node.world.clone()), op)
        };

        match index_op {
            IndexOp::Update(key, aabb) => self.index.update(key, aabb),
            IndexOp::Insert(aabb) => {
                let key = self.index.insert(aabb, id);
                self.node_mut(id).index_key = Some(key);
            }
        }

        if old_bounds != world.world_bounds {
            if old_bounds.width() > 0.0 && old_bounds.height() > 0.0 {
                damage.dirty_rects.push(old_bounds);
            }
            if world.world_bounds.width() > 0.0 && world.world_bounds.height() > 0.0 {
                damage.dirty_rects.push(world.world_bounds);
            }
        }

        for child in child_ids {
            self.update_world_recursive(child, world.world_transform, world.world_clip, damage);
        }
    }
}
