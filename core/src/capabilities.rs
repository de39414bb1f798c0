//! Entity capability surface.
//!
//! The engine's only way to touch game state. Implementations are game-SDK
//! glue and must treat an unknown or invalid target as a no-op.

/// Mutators and reads the engine needs from the game
pub trait EntityCapabilities {
    fn set_movement_speed_factor(&mut self, target: &str, factor: f64);

    fn set_visible(&mut self, target: &str, visible: bool);

    /// Add armour without exceeding `cap`
    fn add_armor(&mut self, target: &str, amount: f64, cap: f64);

    fn heal(&mut self, target: &str, amount: f64);

    /// Current health as a fraction of maximum, in `[0, 1]`
    fn health_fraction(&self, target: &str) -> f64;
}

/// Capability surface that does nothing. Every target reports full health.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapabilities;

impl EntityCapabilities for NoopCapabilities {
    fn set_movement_speed_factor(&mut self, _target: &str, _factor: f64) {}

    fn set_visible(&mut self, _target: &str, _visible: bool) {}

    fn add_armor(&mut self, _target: &str, _amount: f64, _cap: f64) {}

    fn heal(&mut self, _target: &str, _amount: f64) {}

    fn health_fraction(&self, _target: &str) -> f64 {
        1.0
    }
}
