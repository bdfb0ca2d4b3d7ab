//! In-memory environment.
//!
//! [`Sandbox`] implements every environment trait over plain collections:
//! actors with two hands, ammo pools, a manually advanced clock, and
//! recordings of projectiles, messages and hook calls. Knobs on the struct
//! make hooks deny or override. It backs the crate's tests and is handy for
//! hosts that want to dry-run weapon definitions.

use crate::ammo::AmmoPool;
use crate::attributes::SelectiveFireState;
use crate::core::time::MILLIS_PER_TICK;
use crate::env::{
    ActorId, ActorWorld, AmmoInventory, Clock, Decision, FireHooks, FirearmEvent, FirearmOutcome,
    FirearmStage, Hand, HeldItem, InputSnapshot, Location, PermissionCheck, PreparedShot,
    ProjectileFactory, RegionPolicy, RegionVerdict, ReloadRequest, ShotContext, SupplementaryTask,
    Vector3, WeaponInstanceId,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

/// Eye height above an actor's feet.
pub const EYE_HEIGHT: f64 = 1.62;

#[derive(Clone, Debug)]
pub struct SandboxActor {
    pub main_hand: Option<HeldItem>,
    pub off_hand: Option<HeldItem>,
    pub location: Location,
    pub input: InputSnapshot,
    pub width: f64,
    pub player: bool,
}

impl Default for SandboxActor {
    fn default() -> Self {
        Self {
            main_hand: None,
            off_hand: None,
            location: Location::default(),
            input: InputSnapshot {
                standing: true,
                ..InputSnapshot::default()
            },
            width: 0.6,
            player: true,
        }
    }
}

impl SandboxActor {
    fn slot(&mut self, hand: Hand) -> &mut Option<HeldItem> {
        match hand {
            Hand::Main => &mut self.main_hand,
            Hand::Off => &mut self.off_hand,
        }
    }

    fn held(&self, hand: Hand) -> Option<&HeldItem> {
        match hand {
            Hand::Main => self.main_hand.as_ref(),
            Hand::Off => self.off_hand.as_ref(),
        }
    }
}

/// A projectile as handed to [`ProjectileFactory::shoot`].
#[derive(Clone, Debug, PartialEq)]
pub struct FiredProjectile {
    pub actor: ActorId,
    pub weapon_id: String,
    pub instance: WeaponInstanceId,
    pub hand: Hand,
    pub template: String,
    pub origin: Location,
    pub velocity: Vector3,
    pub fired_at: DateTime<Utc>,
}

/// A hook call the sandbox observed.
#[derive(Clone, Debug, PartialEq)]
pub enum HookEvent {
    FullAutoStarted { hand: Hand, shots_per_second: u32 },
    FirearmAction { stage: FirearmStage, time: u32 },
    ReloadRequested { hand: Hand, is_reload_loop: bool },
    ReloadCompleted { hand: Hand, loaded: u32 },
    ReloadCancelled { hand: Hand, elapsed_ticks: u64 },
    AmmoSwitched { index: usize, mechanic: Option<String> },
    SelectiveFireSwitched(SelectiveFireState),
    SkinRefreshed { hand: Hand },
    Melee { victim: Option<ActorId> },
}

#[derive(Debug)]
pub struct Sandbox {
    pub now: DateTime<Utc>,
    pub actors: HashMap<ActorId, SandboxActor>,
    pub ammo: HashMap<(ActorId, AmmoPool), u32>,
    pub fired: Vec<FiredProjectile>,
    pub messages: Vec<(ActorId, String)>,
    pub events: Vec<HookEvent>,
    /// Verdict of every region lookup.
    pub region: RegionVerdict,
    /// Deny the region flag at or above this height.
    pub restricted_above: Option<f64>,
    /// (actor, weapon id) pairs without permission.
    pub forbidden: HashSet<(ActorId, String)>,
    pub deny_pre_shoot: bool,
    pub deny_prepare: bool,
    pub deny_reload: bool,
    pub full_auto_override: Option<u32>,
    /// Extra tasks handed out with every firearm stage.
    pub firearm_supplements: Vec<SupplementaryTask>,
    pub melee_result: bool,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            now: Utc::now(),
            actors: HashMap::new(),
            ammo: HashMap::new(),
            fired: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
            region: RegionVerdict::allow(),
            restricted_above: None,
            forbidden: HashSet::new(),
            deny_pre_shoot: false,
            deny_prepare: false,
            deny_reload: false,
            full_auto_override: None,
            firearm_supplements: Vec::new(),
            melee_result: false,
        }
    }

    pub fn spawn_actor(&mut self) -> ActorId {
        let actor = ActorId::new();
        self.actors.insert(actor, SandboxActor::default());
        actor
    }

    pub fn actor_mut(&mut self, actor: ActorId) -> Option<&mut SandboxActor> {
        self.actors.get_mut(&actor)
    }

    /// Put a fresh instance of `weapon_id` into `hand`.
    pub fn give_weapon(&mut self, actor: ActorId, hand: Hand, weapon_id: &str) -> WeaponInstanceId {
        self.give_stack(actor, hand, weapon_id, 1)
    }

    pub fn give_stack(
        &mut self,
        actor: ActorId,
        hand: Hand,
        weapon_id: &str,
        amount: u32,
    ) -> WeaponInstanceId {
        let instance = WeaponInstanceId::new();
        let item = HeldItem {
            instance,
            weapon_id: weapon_id.to_string(),
            amount,
        };
        *self.actors.entry(actor).or_default().slot(hand) = Some(item);
        instance
    }

    pub fn take_item(&mut self, actor: ActorId, hand: Hand) -> Option<HeldItem> {
        self.actors.get_mut(&actor)?.slot(hand).take()
    }

    pub fn set_input(&mut self, actor: ActorId, input: InputSnapshot) {
        if let Some(state) = self.actors.get_mut(&actor) {
            state.input = input;
        }
    }

    /// Stock `amount` units of `pool` for `actor`.
    pub fn stock(&mut self, actor: ActorId, pool: AmmoPool, amount: u32) {
        *self.ammo.entry((actor, pool)).or_default() += amount;
    }

    pub fn stocked(&self, actor: ActorId, pool: &AmmoPool) -> u32 {
        self.ammo.get(&(actor, pool.clone())).copied().unwrap_or(0)
    }

    pub fn advance_millis(&mut self, millis: i64) {
        self.now += Duration::milliseconds(millis);
    }

    /// Move the clock forward by one nominal tick.
    pub fn advance_tick(&mut self) {
        self.advance_millis(MILLIS_PER_TICK);
    }

    pub fn shots_by(&self, actor: ActorId) -> usize {
        self.fired.iter().filter(|p| p.actor == actor).count()
    }

    pub fn count_events(&self, matches: impl Fn(&HookEvent) -> bool) -> usize {
        self.events.iter().filter(|event| matches(event)).count()
    }
}

impl Clock for Sandbox {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl ActorWorld for Sandbox {
    fn held_item(&self, actor: ActorId, hand: Hand) -> Option<HeldItem> {
        self.actors.get(&actor)?.held(hand).cloned()
    }

    fn location(&self, actor: ActorId) -> Location {
        self.actors
            .get(&actor)
            .map(|a| a.location)
            .unwrap_or_default()
    }

    fn eye_location(&self, actor: ActorId) -> Location {
        let mut eye = self.location(actor);
        eye.y += EYE_HEIGHT;
        eye
    }

    fn input(&self, actor: ActorId) -> InputSnapshot {
        self.actors.get(&actor).map(|a| a.input).unwrap_or_default()
    }

    fn body_width(&self, actor: ActorId) -> f64 {
        self.actors.get(&actor).map_or(0.6, |a| a.width)
    }

    fn is_player(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.player)
    }

    fn consume_item(&mut self, actor: ActorId, hand: Hand) -> u32 {
        let Some(slot) = self.actors.get_mut(&actor).map(|a| a.slot(hand)) else {
            return 0;
        };
        let left = match slot {
            Some(item) => {
                item.amount = item.amount.saturating_sub(1);
                item.amount
            }
            None => 0,
        };
        if left == 0 {
            *slot = None;
        }
        left
    }

    fn send_message(&mut self, actor: ActorId, message: &str) {
        self.messages.push((actor, message.to_string()));
    }

    fn try_melee(
        &mut self,
        _actor: ActorId,
        _weapon_id: &str,
        _hand: Hand,
        known_victim: Option<ActorId>,
    ) -> bool {
        self.events.push(HookEvent::Melee {
            victim: known_victim,
        });
        self.melee_result
    }
}

impl AmmoInventory for Sandbox {
    fn max_ammo(&self, actor: ActorId, pool: &AmmoPool) -> u32 {
        self.stocked(actor, pool)
    }

    fn remove_ammo(&mut self, actor: ActorId, pool: &AmmoPool, amount: u32) -> u32 {
        let stock = self.ammo.entry((actor, pool.clone())).or_default();
        let removed = amount.min(*stock);
        *stock -= removed;
        removed
    }

    fn give_ammo(&mut self, actor: ActorId, pool: &AmmoPool, amount: u32) {
        self.stock(actor, pool.clone(), amount);
    }
}

impl ProjectileFactory for Sandbox {
    type Projectile = FiredProjectile;

    fn create(
        &mut self,
        actor: ActorId,
        origin: Location,
        velocity: Vector3,
        instance: WeaponInstanceId,
        weapon_id: &str,
        hand: Hand,
        template: &str,
    ) -> FiredProjectile {
        FiredProjectile {
            actor,
            weapon_id: weapon_id.to_string(),
            instance,
            hand,
            template: template.to_string(),
            origin,
            velocity,
            fired_at: self.now,
        }
    }

    fn shoot(&mut self, projectile: FiredProjectile, _origin: Location) {
        self.fired.push(projectile);
    }
}

impl RegionPolicy for Sandbox {
    fn test_flag(
        &self,
        location: &Location,
        _actor: Option<ActorId>,
        _flag: &str,
    ) -> RegionVerdict {
        match self.restricted_above {
            Some(height) if location.y >= height => RegionVerdict::deny(None),
            _ => self.region.clone(),
        }
    }
}

impl PermissionCheck for Sandbox {
    fn has_permission(&self, actor: ActorId, weapon_id: &str) -> bool {
        !self.forbidden.contains(&(actor, weapon_id.to_string()))
    }
}

impl FireHooks for Sandbox {
    fn pre_shoot(&mut self, _ctx: &ShotContext<'_>) -> Decision {
        if self.deny_pre_shoot {
            Decision::Deny
        } else {
            Decision::Allow
        }
    }

    fn prepare_shoot(
        &mut self,
        _ctx: &ShotContext<'_>,
        _shot: &PreparedShot,
    ) -> Decision<PreparedShot> {
        if self.deny_prepare {
            Decision::Deny
        } else {
            Decision::Allow
        }
    }

    fn full_auto_start(&mut self, ctx: &ShotContext<'_>, shots_per_second: u32) -> Decision<u32> {
        let effective = self.full_auto_override.unwrap_or(shots_per_second);
        self.events.push(HookEvent::FullAutoStarted {
            hand: ctx.hand,
            shots_per_second: effective,
        });
        match self.full_auto_override {
            Some(value) => Decision::Override(value),
            None => Decision::Allow,
        }
    }

    fn firearm_action(&mut self, event: &FirearmEvent<'_>) -> FirearmOutcome {
        self.events.push(HookEvent::FirearmAction {
            stage: event.stage,
            time: event.time,
        });
        self.firearm_supplements
            .iter()
            .cloned()
            .fold(FirearmOutcome::after(event.time), FirearmOutcome::with_task)
    }

    fn pre_reload(&mut self, request: &ReloadRequest<'_>) -> Decision {
        if self.deny_reload {
            return Decision::Deny;
        }
        self.events.push(HookEvent::ReloadRequested {
            hand: request.ctx.hand,
            is_reload_loop: request.is_reload_loop,
        });
        Decision::Allow
    }

    fn reload_complete(&mut self, ctx: &ShotContext<'_>, loaded: u32) {
        self.events.push(HookEvent::ReloadCompleted {
            hand: ctx.hand,
            loaded,
        });
    }

    fn reload_cancelled(&mut self, ctx: &ShotContext<'_>, elapsed_ticks: u64) {
        self.events.push(HookEvent::ReloadCancelled {
            hand: ctx.hand,
            elapsed_ticks,
        });
    }

    fn ammo_switched(&mut self, _ctx: &ShotContext<'_>, mechanic: Option<&str>, index: usize) {
        self.events.push(HookEvent::AmmoSwitched {
            index,
            mechanic: mechanic.map(str::to_string),
        });
    }

    fn selective_fire_switched(&mut self, _ctx: &ShotContext<'_>, state: SelectiveFireState) {
        self.events.push(HookEvent::SelectiveFireSwitched(state));
    }

    fn refresh_skin(&mut self, _actor: ActorId, _weapon_id: &str, hand: Hand) {
        self.events.push(HookEvent::SkinRefreshed { hand });
    }
}
