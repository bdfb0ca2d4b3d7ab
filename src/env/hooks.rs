//! Synchronous hook points around shooting, firearm cycling and reloading.
//!
//! Every hook has a permissive default, so a host only overrides the ones
//! it cares about. Hooks answer with plain records; the engine never
//! inspects their concrete type.

use super::{ActorId, Hand, WeaponInstanceId};
use crate::attributes::SelectiveFireState;
use crate::firearm::{FirearmKind, FirearmState};
use std::fmt;
use std::sync::Arc;

/// Answer of a hook that may veto or replace a value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Decision<T = ()> {
    #[default]
    Allow,
    Deny,
    Override(T),
}

impl<T> Decision<T> {
    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny)
    }

    /// The value to continue with, or `None` when denied.
    pub fn resolve(self, default: T) -> Option<T> {
        match self {
            Decision::Allow => Some(default),
            Decision::Deny => None,
            Decision::Override(value) => Some(value),
        }
    }
}

/// Who fires what from which hand.
#[derive(Clone, Copy, Debug)]
pub struct ShotContext<'a> {
    pub actor: ActorId,
    pub weapon_id: &'a str,
    pub instance: WeaponInstanceId,
    pub hand: Hand,
}

/// Shot parameters the prepare hook may rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedShot {
    pub projectile: Option<String>,
    pub projectile_speed: f64,
    pub projectiles_per_shot: u32,
    pub reset_fall_distance: bool,
}

/// Which half of the firearm cycle is being scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirearmStage {
    Open,
    Close,
}

/// Firearm action about to be scheduled.
#[derive(Clone, Copy, Debug)]
pub struct FirearmEvent<'a> {
    pub ctx: ShotContext<'a>,
    pub kind: FirearmKind,
    pub state: FirearmState,
    pub stage: FirearmStage,
    /// Configured stage delay in ticks.
    pub time: u32,
}

/// Delayed side effect attached to a firearm stage.
#[derive(Clone)]
pub struct SupplementaryTask {
    pub delay: u32,
    pub action: Arc<dyn Fn() + Send + Sync>,
}

impl SupplementaryTask {
    pub fn new(delay: u32, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
        }
    }
}

impl fmt::Debug for SupplementaryTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplementaryTask")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// What the firearm hook decided for one stage.
#[derive(Clone, Debug, Default)]
pub struct FirearmOutcome {
    /// Ticks until the stage transition runs.
    pub time: u32,
    pub extra_tasks: Vec<SupplementaryTask>,
}

impl FirearmOutcome {
    pub fn after(time: u32) -> Self {
        Self {
            time,
            extra_tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: SupplementaryTask) -> Self {
        self.extra_tasks.push(task);
        self
    }
}

/// A reload about to start.
#[derive(Clone, Copy, Debug)]
pub struct ReloadRequest<'a> {
    pub ctx: ShotContext<'a>,
    pub dual_wield: bool,
    pub is_reload_loop: bool,
}

pub trait FireHooks {
    fn pre_shoot(&mut self, _ctx: &ShotContext<'_>) -> Decision {
        Decision::Allow
    }

    fn prepare_shoot(
        &mut self,
        _ctx: &ShotContext<'_>,
        _shot: &PreparedShot,
    ) -> Decision<PreparedShot> {
        Decision::Allow
    }

    /// Answers whether the actor unscopes after the shot.
    fn post_shoot(&mut self, _ctx: &ShotContext<'_>, _unscope_after_shot: bool) -> Decision<bool> {
        Decision::Allow
    }

    /// Answers the effective shots per second.
    fn full_auto_start(&mut self, _ctx: &ShotContext<'_>, _shots_per_second: u32) -> Decision<u32> {
        Decision::Allow
    }

    fn firearm_action(&mut self, event: &FirearmEvent<'_>) -> FirearmOutcome {
        FirearmOutcome::after(event.time)
    }

    fn pre_reload(&mut self, _request: &ReloadRequest<'_>) -> Decision {
        Decision::Allow
    }

    fn reload_complete(&mut self, _ctx: &ShotContext<'_>, _loaded: u32) {}

    fn reload_cancelled(&mut self, _ctx: &ShotContext<'_>, _elapsed_ticks: u64) {}

    fn ammo_switched(&mut self, _ctx: &ShotContext<'_>, _mechanic: Option<&str>, _index: usize) {}

    fn selective_fire_switched(&mut self, _ctx: &ShotContext<'_>, _state: SelectiveFireState) {}

    fn refresh_skin(&mut self, _actor: ActorId, _weapon_id: &str, _hand: Hand) {}
}
