//! Collaborators consumed by the fire-control engine.
//!
//! The engine never talks to a game server directly. Everything it needs
//! from the outside world comes through these traits, bundled together as
//! an [`Environment`]. [`crate::sandbox::Sandbox`] implements all of them in
//! memory.

mod hooks;

pub use hooks::{
    Decision, FireHooks, FirearmEvent, FirearmOutcome, FirearmStage, PreparedShot, ReloadRequest,
    ShotContext, SupplementaryTask,
};

use crate::ammo::AmmoPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of an actor for the duration of its session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity attached to a physical weapon item.
///
/// Attributes travel with this id, not with whatever in-memory item
/// handle the host happens to hold this tick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct WeaponInstanceId(pub Uuid);

impl WeaponInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WeaponInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WeaponInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Main or off hand of an actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Main,
    Off,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Main, Hand::Off];

    /// The opposite hand.
    pub fn other(&self) -> Hand {
        match self {
            Hand::Main => Hand::Off,
            Hand::Off => Hand::Main,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Hand::Main)
    }
}

/// Plain 3-component vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Position plus look angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl Location {
    /// Unit look vector. Yaw 0 faces +z, yaw 90 faces -x; positive pitch
    /// looks down.
    pub fn direction(&self) -> Vector3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let horizontal = pitch.cos();
        Vector3::new(-horizontal * yaw.sin(), -pitch.sin(), horizontal * yaw.cos())
    }
}

/// Held-input state of an actor, polled by full-automatic fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub sneaking: bool,
    pub sprinting: bool,
    pub right_clicking: bool,
    pub swimming: bool,
    pub gliding: bool,
    pub walking: bool,
    pub in_midair: bool,
    pub standing: bool,
}

/// What an actor currently holds in one hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeldItem {
    pub instance: WeaponInstanceId,
    pub weapon_id: String,
    pub amount: u32,
}

/// Wall-clock source for timing gates.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The actors and their held items.
pub trait ActorWorld {
    /// The weapon currently held in `hand`, looked up fresh on every call.
    fn held_item(&self, actor: ActorId, hand: Hand) -> Option<HeldItem>;

    /// Where the actor stands. Region rules are tested here.
    fn location(&self, actor: ActorId) -> Location;

    fn eye_location(&self, actor: ActorId) -> Location;

    fn input(&self, actor: ActorId) -> InputSnapshot;

    fn body_width(&self, _actor: ActorId) -> f64 {
        0.6
    }

    fn is_player(&self, _actor: ActorId) -> bool {
        true
    }

    /// Remove one item from the stack in `hand`; returns the amount left.
    fn consume_item(&mut self, actor: ActorId, hand: Hand) -> u32;

    /// Split stacked weapon items so only one carries weapon state.
    fn normalize_weapon_stack(&mut self, _actor: ActorId, _hand: Hand) {}

    fn reset_fall_distance(&mut self, _actor: ActorId) {}

    fn send_message(&mut self, _actor: ActorId, _message: &str) {}

    /// Melee attack delegate for melee triggers on the main hand.
    fn try_melee(
        &mut self,
        _actor: ActorId,
        _weapon_id: &str,
        _hand: Hand,
        _known_victim: Option<ActorId>,
    ) -> bool {
        false
    }
}

/// Per-actor ammunition pools outside the weapon's magazine.
pub trait AmmoInventory {
    /// Amount of `pool` the actor owns.
    fn max_ammo(&self, actor: ActorId, pool: &AmmoPool) -> u32;

    /// Remove up to `amount` from `pool`; returns what was removed.
    fn remove_ammo(&mut self, actor: ActorId, pool: &AmmoPool, amount: u32) -> u32;

    fn give_ammo(&mut self, actor: ActorId, pool: &AmmoPool, amount: u32);

    fn has_ammo(&self, actor: ActorId, pool: &AmmoPool, amount: u32) -> bool {
        self.max_ammo(actor, pool) >= amount
    }
}

/// Creates and launches projectiles. Physics stay on the host side.
pub trait ProjectileFactory {
    type Projectile;

    #[allow(clippy::too_many_arguments)]
    fn create(
        &mut self,
        actor: ActorId,
        origin: Location,
        velocity: Vector3,
        instance: WeaponInstanceId,
        weapon_id: &str,
        hand: Hand,
        template: &str,
    ) -> Self::Projectile;

    fn shoot(&mut self, projectile: Self::Projectile, origin: Location);
}

/// Answer of a region policy lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionVerdict {
    pub allowed: bool,
    pub message: Option<String>,
}

impl RegionVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    pub fn deny(message: Option<String>) -> Self {
        Self {
            allowed: false,
            message,
        }
    }
}

pub trait RegionPolicy {
    fn test_flag(&self, location: &Location, actor: Option<ActorId>, flag: &str) -> RegionVerdict;
}

pub trait PermissionCheck {
    fn has_permission(&self, actor: ActorId, weapon_id: &str) -> bool;
}

/// Everything the engine consumes, in one bound.
pub trait Environment:
    Clock
    + ActorWorld
    + AmmoInventory
    + ProjectileFactory
    + RegionPolicy
    + PermissionCheck
    + FireHooks
{
}

impl<T> Environment for T where
    T: Clock
        + ActorWorld
        + AmmoInventory
        + ProjectileFactory
        + RegionPolicy
        + PermissionCheck
        + FireHooks
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_hand_is_symmetric() {
        assert_eq!(Hand::Main.other(), Hand::Off);
        assert_eq!(Hand::Off.other(), Hand::Main);
        assert!(Hand::Main.is_main());
    }

    #[test]
    fn direction_follows_yaw_and_pitch() {
        let forward = Location::default().direction();
        assert!((forward.z - 1.0).abs() < 1e-9);
        assert!(forward.x.abs() < 1e-9);

        let down = Location {
            pitch: 90.0,
            ..Location::default()
        }
        .direction();
        assert!((down.y + 1.0).abs() < 1e-9);

        let turned = Location {
            yaw: 90.0,
            ..Location::default()
        }
        .direction();
        assert!((turned.x + 1.0).abs() < 1e-9);
        assert!((turned.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ActorId::new(), ActorId::new());
        assert_ne!(WeaponInstanceId::new(), WeaponInstanceId::new());
    }
}
