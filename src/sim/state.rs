use std::sync::Arc;

use glam::{Vec2, vec2};
use rand::Rng;
use serde::Serialize;

use super::config::SimulationConfig;
use super::forces;
use crate::error::{LayoutError, LayoutResult};
use crate::graph::Graph;
use crate::util::node_radius;

pub type LayoutRng = rand_chacha::ChaCha8Rng;

/// Fraction of each viewport axis where nodes are first placed.
const SPAWN_RANGE: (f32, f32) = (0.3, 0.7);

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> LayoutResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Whether forces may move a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub enum Anchor {
    #[default]
    Free,
    Pinned(Vec2),
}

impl Anchor {
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

/// Per-node simulation record. Index-aligned with `Graph::nodes`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimNode {
    pub id: Arc<str>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub anchor: Anchor,
}

/// Immutable view of the simulation published after every tick or pin change.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub nodes: Vec<SimNode>,
    pub alpha: f32,
    pub tick: u64,
    graph: Arc<Graph>,
}

impl Snapshot {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.graph.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.node(id).map(|node| node.position)
    }

    /// Closest node whose rendered circle contains `point`.
    pub fn node_at(&self, point: Vec2) -> Option<&SimNode> {
        self.nodes
            .iter()
            .zip(self.graph.nodes())
            .filter_map(|(sim_node, node)| {
                let distance = sim_node.position.distance(point);
                (distance <= node_radius(node.weight)).then_some((sim_node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(sim_node, _)| sim_node)
    }

    pub fn is_finite(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.position.is_finite() && node.velocity.is_finite())
    }
}

/// Working copy owned by whoever currently holds the state lock.
pub(super) struct SimState {
    pub(super) nodes: Vec<SimNode>,
    pub(super) alpha: f32,
    pub(super) ticks: u64,
    viewport: Viewport,
    rng: LayoutRng,
}

impl SimState {
    pub(super) fn new(graph: &Graph, viewport: Viewport, rng: LayoutRng) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| SimNode {
                id: Arc::from(node.id.as_str()),
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                anchor: Anchor::Free,
            })
            .collect();

        let mut state = Self {
            nodes,
            alpha: 1.0,
            ticks: 0,
            viewport,
            rng,
        };
        state.randomize();
        state
    }

    pub(super) fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scatter every node over the central part of the viewport and re-arm
    /// the clock. Pins do not survive.
    pub(super) fn randomize(&mut self) {
        let (low, high) = SPAWN_RANGE;
        for node in &mut self.nodes {
            let x = self.rng.gen_range(low..=high) * self.viewport.width;
            let y = self.rng.gen_range(low..=high) * self.viewport.height;
            node.position = vec2(x, y);
            node.velocity = Vec2::ZERO;
            node.anchor = Anchor::Free;
        }
        self.alpha = 1.0;
        self.ticks = 0;
    }

    pub(super) fn tick(&mut self, graph: &Graph, config: &SimulationConfig) {
        let alpha = self.alpha;
        forces::apply_link_force(&mut self.nodes, graph, alpha, config);
        forces::apply_charge_force(&mut self.nodes, graph, alpha, config);
        forces::apply_center_force(&mut self.nodes, self.viewport.center(), alpha, config);
        forces::integrate(&mut self.nodes, config);
        self.alpha = forces::cool(alpha, config);
        self.ticks += 1;
    }

    pub(super) fn is_converged(&self, config: &SimulationConfig) -> bool {
        self.alpha <= config.alpha_min
    }

    pub(super) fn snapshot(&self, graph: &Arc<Graph>) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            alpha: self.alpha,
            tick: self.ticks,
            graph: Arc::clone(graph),
        }
    }
}
