//! Waypoint graph representation, builder and Dijkstra navigator.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing links.
//! Given a `NodeId n`, its outgoing links occupy the slice:
//!
//! ```text
//! link_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Link arrays are sorted by source node and indexed by `EdgeId`, so a
//! node's neighbours are a contiguous scan in Dijkstra's inner loop.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps world positions to the nearest `NodeId`.
//! Requests snap `from`/`to` to the nearest node inside the pick extents.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use loco_core::{EdgeId, NodeId};

use crate::request::resample;
use crate::{NavError, NavResult, Navigator, PathRequest};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── WaypointGraph ─────────────────────────────────────────────────────────────

/// Directed waypoint graph in CSR format plus a spatial index for snapping.
///
/// Do not construct directly; use [`WaypointGraphBuilder`].
pub struct WaypointGraph {
    /// World position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Vec3>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each link (needed for path reconstruction).
    pub link_from: Vec<NodeId>,

    pub link_to: Vec<NodeId>,

    /// Link cost in millimetres of travel (integer so the heap is `Ord`).
    pub link_cost_mm: Vec<u32>,

    spatial_idx: RTree<NodeEntry>,
}

impl WaypointGraph {
    pub fn empty() -> Self {
        WaypointGraphBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn out_links(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    pub fn position(&self, node: NodeId) -> NavResult<Vec3> {
        self.node_pos.get(node.index()).copied().ok_or(NavError::NodeNotFound(node))
    }

    /// Nearest node to `pos` whose offset lies inside `extents` on every axis.
    pub fn pick_node(&self, pos: Vec3, extents: Vec3) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&pos.to_array())
            .take_while(|e| Vec3::from_array(e.point).distance(pos) <= extents.length())
            .find(|e| (Vec3::from_array(e.point) - pos).abs().cmple(extents).all())
            .map(|e| e.id)
    }

    /// Node sequence of the cheapest route, expanding at most `max_expanded`
    /// nodes.
    pub fn shortest_route(&self, from: NodeId, to: NodeId, max_expanded: usize) -> NavResult<Vec<NodeId>> {
        let n = self.node_count();
        if from.index() >= n {
            return Err(NavError::NodeNotFound(from));
        }
        if to.index() >= n {
            return Err(NavError::NodeNotFound(to));
        }
        if from == to {
            return Ok(vec![from]);
        }

        let mut dist = vec![u32::MAX; n];
        let mut prev_link = vec![EdgeId::INVALID; n];
        dist[from.index()] = 0;

        // Secondary key NodeId keeps tie-breaking deterministic.
        let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, from)));
        let mut expanded = 0usize;

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == to {
                return Ok(self.reconstruct(&prev_link, to));
            }
            if cost > dist[node.index()] {
                continue;
            }
            expanded += 1;
            if expanded > max_expanded {
                return Err(NavError::SearchLimit(max_expanded));
            }
            for link in self.out_links(node) {
                let neighbor = self.link_to[link.index()];
                let new_cost = cost.saturating_add(self.link_cost_mm[link.index()]);
                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    prev_link[neighbor.index()] = link;
                    heap.push(Reverse((new_cost, neighbor)));
                }
            }
        }

        Err(NavError::NoPath { from, to })
    }

    fn reconstruct(&self, prev_link: &[EdgeId], to: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![to];
        let mut cur = to;
        loop {
            let l = prev_link[cur.index()];
            if l == EdgeId::INVALID {
                break;
            }
            cur = self.link_from[l.index()];
            nodes.push(cur);
        }
        nodes.reverse();
        nodes
    }
}

impl Navigator for WaypointGraph {
    fn find_path(&self, request: &PathRequest) -> NavResult<Vec<Vec3>> {
        let start = self
            .pick_node(request.from, request.pick_extents)
            .ok_or(NavError::NoNodeNear(request.from))?;
        let goal = self
            .pick_node(request.to, request.pick_extents)
            .ok_or(NavError::NoNodeNear(request.to))?;

        let route = self.shortest_route(start, goal, request.max_polygon_nodes)?;

        let mut corners = Vec::with_capacity(route.len() + 2);
        corners.push(request.from);
        corners.extend(route.iter().map(|n| self.node_pos[n.index()]));
        corners.push(request.to);

        let smooth = resample(&corners, request.step_size, request.max_smooth_nodes);
        Ok(smooth.into_iter().take(request.max_steer_points).collect())
    }
}

// ── WaypointGraphBuilder ──────────────────────────────────────────────────────

/// Construct a [`WaypointGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use loco_nav::WaypointGraphBuilder;
///
/// let mut b = WaypointGraphBuilder::new();
/// let a = b.add_node(Vec3::ZERO);
/// let c = b.add_node(Vec3::new(10.0, 0.0, 0.0));
/// b.add_link(a, c);
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.link_count(), 2); // bidirectional
/// ```
pub struct WaypointGraphBuilder {
    nodes:     Vec<Vec3>,
    raw_links: Vec<RawLink>,
}

struct RawLink {
    from:    NodeId,
    to:      NodeId,
    cost_mm: u32,
}

impl WaypointGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_links: Vec::new() }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Vec3) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** link costed by its straight-line length.
    pub fn add_directed_link(&mut self, from: NodeId, to: NodeId) {
        let (Some(a), Some(b)) = (self.nodes.get(from.index()), self.nodes.get(to.index())) else {
            log::warn!("ignoring link {from} -> {to}: unknown node");
            return;
        };
        let cost_mm = (a.distance(*b) * 1000.0).round() as u32;
        self.raw_links.push(RawLink { from, to, cost_mm });
    }

    /// Add links in both directions.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) {
        self.add_directed_link(a, b);
        self.add_directed_link(b, a);
    }

    /// Lay out an `nx × ny` grid of nodes `spacing` apart starting at
    /// `origin`, 4-connected.  Returns the node ids row by row.
    pub fn add_grid(&mut self, origin: Vec3, nx: usize, ny: usize, spacing: f32) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                ids.push(self.add_node(origin + Vec3::new(i as f32 * spacing, j as f32 * spacing, 0.0)));
            }
        }
        for j in 0..ny {
            for i in 0..nx {
                let here = ids[j * nx + i];
                if i + 1 < nx {
                    self.add_link(here, ids[j * nx + i + 1]);
                }
                if j + 1 < ny {
                    self.add_link(here, ids[(j + 1) * nx + i]);
                }
            }
        }
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Consume the builder and produce a [`WaypointGraph`].
    pub fn build(self) -> WaypointGraph {
        let node_count = self.nodes.len();

        let mut raw = self.raw_links;
        raw.sort_by_key(|l| (l.from.0, l.to.0));

        let link_from: Vec<NodeId> = raw.iter().map(|l| l.from).collect();
        let link_to: Vec<NodeId> = raw.iter().map(|l| l.to).collect();
        let link_cost_mm: Vec<u32> = raw.iter().map(|l| l.cost_mm).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &raw {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: p.to_array(), id: NodeId(i as u32) })
            .collect();

        WaypointGraph {
            node_pos: self.nodes,
            node_out_start,
            link_from,
            link_to,
            link_cost_mm,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}

impl Default for WaypointGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
