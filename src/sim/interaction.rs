use glam::Vec2;
use tracing::debug;

use super::state::Anchor;
use super::Simulation;

impl Simulation {
    /// Fix a node at `position`, moving it there immediately. Unknown ids and
    /// non-finite positions are ignored. Returns whether a node was pinned.
    pub fn pin(&self, node_id: &str, position: Vec2) -> bool {
        let Some(index) = self.graph().index_of(node_id) else {
            debug!(node_id, "pin ignored for unknown node");
            return false;
        };
        if !position.is_finite() {
            debug!(node_id, "pin ignored for non-finite position");
            return false;
        }

        self.shared.with_state(|state| {
            let node = &mut state.nodes[index];
            node.anchor = Anchor::Pinned(position);
            node.position = position;
            node.velocity = Vec2::ZERO;
        });
        true
    }

    /// Pointer moved while dragging `node_id`. The node follows the pointer
    /// and stays pinned until [`Simulation::unpin`].
    pub fn drag(&self, node_id: &str, position: Vec2) -> bool {
        self.pin(node_id, position)
    }

    /// Release a pin so forces move the node again from where it was held.
    /// Returns whether a pin was cleared.
    pub fn unpin(&self, node_id: &str) -> bool {
        let Some(index) = self.graph().index_of(node_id) else {
            debug!(node_id, "unpin ignored for unknown node");
            return false;
        };

        self.shared.with_state(|state| {
            let node = &mut state.nodes[index];
            let was_pinned = node.anchor.is_pinned();
            node.anchor = Anchor::Free;
            was_pinned
        })
    }

    pub fn is_pinned(&self, node_id: &str) -> bool {
        self.snapshot()
            .node(node_id)
            .is_some_and(|node| node.anchor.is_pinned())
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;
    use rand::SeedableRng;

    use super::*;
    use crate::graph::{Graph, Link, Node};
    use crate::sim::{LayoutRng, SimulationConfig};

    fn pair_simulation() -> Simulation {
        let graph = Graph::new(
            vec![Node::new("a", "A", 10.0), Node::new("b", "B", 10.0)],
            vec![Link::new("a", "b", 5.0)],
        )
        .unwrap();
        Simulation::with_config(
            graph,
            1000.0,
            1000.0,
            SimulationConfig::default(),
            LayoutRng::seed_from_u64(99),
        )
        .unwrap()
    }

    #[test]
    fn test_pinned_node_holds_position() {
        let simulation = pair_simulation();
        assert!(simulation.pin("a", vec2(50.0, 50.0)));
        assert!(simulation.is_pinned("a"));
        assert_eq!(simulation.snapshot().position("a"), Some(vec2(50.0, 50.0)));

        let mut b_positions = Vec::new();
        for _ in 0..20 {
            assert!(simulation.step());
            let snapshot = simulation.snapshot();
            assert_eq!(snapshot.position("a"), Some(vec2(50.0, 50.0)));
            assert_eq!(snapshot.node("a").map(|node| node.velocity), Some(Vec2::ZERO));
            b_positions.push(snapshot.position("b").unwrap());
        }

        assert!(b_positions.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_unpin_resumes_motion() {
        let simulation = pair_simulation();
        simulation.pin("a", vec2(50.0, 50.0));
        for _ in 0..5 {
            simulation.step();
        }

        assert!(simulation.unpin("a"));
        assert!(!simulation.is_pinned("a"));
        assert_eq!(simulation.snapshot().position("a"), Some(vec2(50.0, 50.0)));

        simulation.step();
        assert_ne!(simulation.snapshot().position("a"), Some(vec2(50.0, 50.0)));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let simulation = pair_simulation();
        let before = simulation.snapshot();

        assert!(!simulation.pin("nobody", vec2(1.0, 1.0)));
        assert!(!simulation.drag("nobody", vec2(1.0, 1.0)));
        assert!(!simulation.unpin("nobody"));
        assert!(!simulation.is_pinned("nobody"));

        assert_eq!(simulation.snapshot().nodes, before.nodes);
    }

    #[test]
    fn test_unpin_without_pin_is_noop() {
        let simulation = pair_simulation();
        let before = simulation.snapshot();

        assert!(!simulation.unpin("b"));
        assert_eq!(simulation.snapshot().nodes, before.nodes);
    }

    #[test]
    fn test_non_finite_pin_rejected() {
        let simulation = pair_simulation();
        assert!(!simulation.pin("a", vec2(f32::NAN, 3.0)));
        assert!(!simulation.is_pinned("a"));
    }

    #[test]
    fn test_drag_follows_pointer() {
        let simulation = pair_simulation();
        simulation.drag("b", vec2(200.0, 220.0));
        simulation.step();
        simulation.drag("b", vec2(240.0, 260.0));
        simulation.step();

        let snapshot = simulation.snapshot();
        assert_eq!(snapshot.position("b"), Some(vec2(240.0, 260.0)));
        assert!(snapshot.node("b").unwrap().anchor.is_pinned());

        simulation.unpin("b");
        assert!(!simulation.is_pinned("b"));
    }

    #[test]
    fn test_pin_while_running() {
        let config = SimulationConfig {
            tick_interval_ms: 1,
            ..Default::default()
        };
        let graph = Graph::new(
            (0..8)
                .map(|index| Node::new(format!("n{index}"), "N", 1.0))
                .collect(),
            (1..8)
                .map(|index| Link::new("n0", format!("n{index}"), 1.0))
                .collect(),
        )
        .unwrap();
        let simulation =
            Simulation::with_config(graph, 800.0, 800.0, config, LayoutRng::seed_from_u64(5))
                .unwrap();
        simulation.start();

        simulation.pin("n0", vec2(400.0, 400.0));
        let pinned_at = simulation.tick_count();
        while simulation.tick_count() < pinned_at + 10 && simulation.is_running() {
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        simulation.stop();

        assert_eq!(simulation.snapshot().position("n0"), Some(vec2(400.0, 400.0)));
    }
}
