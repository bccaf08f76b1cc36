//! Per-tick force passes.
//!
//! Each pass adds its contribution to `SimNode::velocity`; `integrate` then
//! turns the accumulated velocity into a position change. The passes run in
//! a fixed order (link, charge, center, integrate) and each reads positions
//! that earlier passes in the same tick have not yet moved.

use glam::Vec2;

use super::config::SimulationConfig;
use super::state::{Anchor, SimNode};
use crate::graph::Graph;

/// Spring toward `link_distance` along every link whose endpoints exist.
pub(super) fn apply_link_force(
    nodes: &mut [SimNode],
    graph: &Graph,
    alpha: f32,
    config: &SimulationConfig,
) {
    for link in graph.links() {
        let Some((source, target)) = graph.resolve(link) else {
            continue;
        };
        if source == target {
            continue;
        }

        let delta = nodes[target].position - nodes[source].position;
        let distance = delta.length().max(config.min_link_distance);
        let strength = config.link_strength * (1.0 + link.weight * config.link_weight_factor);
        let factor = strength * alpha * (config.link_distance - distance) / distance;
        let force = delta * factor;

        nodes[source].velocity -= force;
        nodes[target].velocity += force;
    }
}

fn charge(weight: f32, config: &SimulationConfig) -> f32 {
    config.charge_strength * (1.0 + weight * config.charge_weight_factor)
}

/// Pairwise inverse-square repulsion. Quadratic in node count.
pub(super) fn apply_charge_force(
    nodes: &mut [SimNode],
    graph: &Graph,
    alpha: f32,
    config: &SimulationConfig,
) {
    let node_count = nodes.len();
    let charges = graph
        .nodes()
        .iter()
        .map(|node| charge(node.weight, config))
        .collect::<Vec<_>>();

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = nodes[j].position - nodes[i].position;
            let distance = delta.length().max(config.min_charge_distance);
            let factor = alpha * charges[i] * charges[j] / (distance * distance);
            let force = delta * (factor / distance);

            nodes[i].velocity -= force;
            nodes[j].velocity += force;
        }
    }
}

pub(super) fn apply_center_force(
    nodes: &mut [SimNode],
    center: Vec2,
    alpha: f32,
    config: &SimulationConfig,
) {
    let scale = config.center_strength * alpha;
    for node in nodes {
        node.velocity += (center - node.position) * scale;
    }
}

/// Damp, move, and (unless momentum is carried) clear velocity. Pinned
/// nodes are held at their pin. The per-tick step is capped at `max_step`;
/// without it high-degree nodes overshoot while alpha is still hot.
pub(super) fn integrate(nodes: &mut [SimNode], config: &SimulationConfig) {
    for node in nodes {
        match node.anchor {
            Anchor::Pinned(position) => {
                node.position = position;
                node.velocity = Vec2::ZERO;
            }
            Anchor::Free => {
                node.velocity =
                    (node.velocity * config.velocity_decay).clamp_length_max(config.max_step);
                node.position += node.velocity;
                if !config.carry_velocity {
                    node.velocity = Vec2::ZERO;
                }
            }
        }
    }
}

/// Next alpha: exponential approach toward `alpha_target`, floored at
/// `alpha_min`. Never increases.
pub(super) fn cool(alpha: f32, config: &SimulationConfig) -> f32 {
    let next = alpha + (config.alpha_target - alpha) * config.alpha_decay();
    next.max(config.alpha_min).min(alpha)
}
