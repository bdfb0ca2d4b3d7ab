//! Emitting one shot.

use super::FireControlEngine;
use crate::env::{ActorId, Environment, Hand, Location, PreparedShot, ShotContext};
use std::sync::Arc;

impl<E: Environment> FireControlEngine<E> {
    /// Fire one shot of `weapon_id` from `origin`.
    ///
    /// The prepare hook may veto the shot or rewrite its projectile
    /// parameters. Melee shots emit no projectile and leave the delay
    /// between shots untouched.
    pub fn shoot(
        &mut self,
        actor: ActorId,
        weapon_id: &str,
        origin: Location,
        hand: Hand,
        update_spread: bool,
        is_melee: bool,
    ) {
        let weapons = Arc::clone(&self.weapons);
        let Some(config) = weapons.get(weapon_id) else {
            return;
        };
        let Some(item) = self.held_weapon(actor, hand, weapon_id) else {
            return;
        };
        let ctx = ShotContext {
            actor,
            weapon_id,
            instance: item.instance,
            hand,
        };

        let prepared = PreparedShot {
            projectile: config.shoot.projectile.clone(),
            projectile_speed: config.shoot.speed_per_tick(),
            projectiles_per_shot: config.shoot.projectiles_per_shot,
            reset_fall_distance: config.shoot.reset_fall_distance,
        };
        let Some(shot) = self.env.prepare_shoot(&ctx, &prepared).resolve(prepared) else {
            tracing::trace!(%actor, weapon = weapon_id, "Shot vetoed by prepare hook");
            return;
        };

        self.attrs(item.instance, config).shot_count += 1;
        if shot.reset_fall_distance {
            self.env.reset_fall_distance(actor);
        }
        let template = shot.projectile.as_deref().filter(|_| !is_melee);
        if let Some(template) = template {
            let velocity = origin.direction().scale(shot.projectile_speed);
            for _ in 0..shot.projectiles_per_shot {
                let projectile = self.env.create(
                    actor,
                    origin,
                    velocity,
                    item.instance,
                    weapon_id,
                    hand,
                    template,
                );
                self.env.shoot(projectile, origin);
            }
        }

        let now = self.env.now();
        if update_spread {
            self.hands.get_mut(actor, hand).add_spread_change(1.0);
        }

        let unscope = config.scope.as_ref().is_some_and(|s| s.unscope_after_shot);
        if self.env.post_shoot(&ctx, unscope).resolve(unscope) == Some(true) {
            self.hands.get_mut(actor, hand).set_zooming(false, now);
        }
        if !is_melee {
            self.hands.get_mut(actor, hand).set_last_shot_time(weapon_id, now);
        }
        tracing::trace!(
            %actor,
            weapon = weapon_id,
            ?hand,
            projectiles = shot.projectiles_per_shot,
            "Shot fired"
        );
    }
}
