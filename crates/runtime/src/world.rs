//! Host collaborator traits consumed by the built-in handlers.
//!
//! The engine core never touches these; only action and condition handlers
//! do, with already-resolved values. Hosts implement both traits against
//! their actual world.

use script_core::{ItemStack, Location, PlayerId};

/// Mutations the built-in actions can request from the host world.
pub trait WorldSink: Send + Sync {
    fn send_message(&self, player: PlayerId, message: &str);

    fn broadcast(&self, message: &str);

    fn teleport(&self, player: PlayerId, destination: &Location);

    fn give_item(&self, player: PlayerId, item: &ItemStack);

    fn set_block(&self, location: &Location, material: &str);

    fn create_explosion(&self, location: &Location, power: f32);
}

/// Read-only player queries used by the built-in conditions.
pub trait PlayerDirectory: Send + Sync {
    fn has_permission(&self, player: PlayerId, permission: &str) -> bool;

    fn is_online(&self, player: PlayerId) -> bool;
}
