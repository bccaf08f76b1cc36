/// Rendered circle radius for a node. Grows with weight, capped at 50.
pub fn node_radius(weight: f32) -> f32 {
    20.0 + (weight.max(0.0) * 0.5).min(30.0)
}

/// Stroke width for a link of the given weight.
pub fn link_width(weight: f32) -> f32 {
    2.0 + (weight.max(0.0) * 0.2).min(5.0)
}

pub fn short_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}
