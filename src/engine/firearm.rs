//! Driving the firearm-action cycle from shots.

use super::{target, FireControlEngine};
use crate::config::FirearmActionConfig;
use crate::env::{
    ActorId, Environment, FirearmEvent, FirearmOutcome, FirearmStage, Hand, ShotContext,
};
use crate::firearm::FirearmState;
use crate::hand::TaskOwner;
use crate::schedule::{Task, TaskHandle, TaskTarget};
use std::sync::Arc;

impl<E: Environment> FireControlEngine<E> {
    /// Start or resume the firearm action of the weapon in `hand`.
    ///
    /// From READY the cycle only starts every `frequency` shots and only for
    /// kinds that cycle on shoot. A weapon left in CLOSE just finishes its
    /// cycle; otherwise the weapon opens and the OPEN → CLOSE → READY
    /// stages are scheduled one after another.
    pub fn do_shoot_firearm_actions(&mut self, actor: ActorId, weapon_id: &str, hand: Hand) {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(weapon_id) else {
            return;
        };
        let Some(action) = &config.firearm_action else {
            return;
        };
        if self
            .hands
            .get(actor, hand)
            .is_some_and(|state| state.has_running_firearm_action())
        {
            return;
        }
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return;
        };

        let now = self.env.now();
        let tick = self.scheduler.current_tick();
        let attrs = self.attributes.get_or_init(item.instance, config);
        let state = attrs.firearm_state;
        if state == FirearmState::Ready
            && (attrs.shot_count % u64::from(action.frequency.max(1)) != 0
                || !action.kind.has_shoot_actions())
        {
            return;
        }

        let target = target(actor, hand, weapon_id, item.instance);
        if state == FirearmState::Close {
            let outcome =
                self.firearm_hook(&target, action, FirearmState::Close, FirearmStage::Close);
            self.schedule_firearm_stage(&target, FirearmState::Ready, outcome);
            return;
        }
        if state != FirearmState::Open {
            if let Err(error) =
                self.firearm
                    .change_state(item.instance, attrs, FirearmState::Open, now, tick)
            {
                tracing::warn!(%actor, weapon = weapon_id, %error, "Firearm action not started");
                return;
            }
        }
        let outcome = self.firearm_hook(&target, action, FirearmState::Open, FirearmStage::Open);
        self.schedule_firearm_stage(&target, FirearmState::Close, outcome);
    }

    /// A timed firearm stage came due.
    pub(super) fn run_firearm_stage(
        &mut self,
        handle: TaskHandle,
        target: &TaskTarget,
        to: FirearmState,
    ) {
        if let Some(state) = self.hands.existing_mut(target.actor, target.hand) {
            state.remove_firearm_task(handle);
        }
        if !self.still_held(target) {
            self.stop_firearm_actions(target.actor, target.hand);
            self.force_firearm_ready(target.instance);
            return;
        }
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(&target.weapon_id) else {
            return;
        };
        let Some(action) = &config.firearm_action else {
            return;
        };

        let now = self.env.now();
        let tick = self.scheduler.current_tick();
        let attrs = self.attributes.get_or_init(target.instance, config);
        if let Err(error) = self.firearm.change_state(target.instance, attrs, to, now, tick) {
            tracing::warn!(
                actor = %target.actor,
                weapon = %target.weapon_id,
                %error,
                "Firearm stage dropped"
            );
            self.stop_firearm_actions(target.actor, target.hand);
            self.force_firearm_ready(target.instance);
            return;
        }

        match to {
            FirearmState::Close => {
                let outcome = self.firearm_hook(target, action, to, FirearmStage::Close);
                self.schedule_firearm_stage(target, FirearmState::Ready, outcome);
            }
            FirearmState::Ready => {
                // supplementary tasks still pending die with the cycle
                self.stop_firearm_actions(target.actor, target.hand);
            }
            FirearmState::Open => {}
        }
    }

    fn firearm_hook(
        &mut self,
        target: &TaskTarget,
        action: &FirearmActionConfig,
        state: FirearmState,
        stage: FirearmStage,
    ) -> FirearmOutcome {
        let time = match stage {
            FirearmStage::Open => action.open_time,
            FirearmStage::Close => action.close_time,
        };
        let event = FirearmEvent {
            ctx: ShotContext {
                actor: target.actor,
                weapon_id: &target.weapon_id,
                instance: target.instance,
                hand: target.hand,
            },
            kind: action.kind,
            state,
            stage,
            time,
        };
        self.env.firearm_action(&event)
    }

    /// Schedule the transition into `to` plus the hook's extra tasks, all in
    /// the hand's firearm set.
    fn schedule_firearm_stage(
        &mut self,
        target: &TaskTarget,
        to: FirearmState,
        outcome: FirearmOutcome,
    ) {
        let owner = TaskOwner {
            weapon_id: target.weapon_id.clone(),
            instance: target.instance,
        };
        let stage = Task::FirearmStage {
            target: target.clone(),
            to,
        };
        let handle = self.scheduler.schedule_delayed(stage, outcome.time);
        let state = self.hands.get_mut(target.actor, target.hand);
        state.add_firearm_task(handle, owner.clone());

        for extra in outcome.extra_tasks {
            let delay = extra.delay;
            let task = Task::Supplementary {
                actor: target.actor,
                hand: target.hand,
                task: extra,
            };
            let handle = self.scheduler.schedule_delayed(task, delay);
            state.add_firearm_task(handle, owner.clone());
        }
        tracing::trace!(
            actor = %target.actor,
            to = ?to,
            delay = outcome.time,
            "Firearm stage scheduled"
        );
    }
}
