use std::collections::HashSet;

use crate::action::{
    ActionBehavior, ActionError, ActionRequestData, BuffableValue, Conclusion, InstanceView,
    ServerContext,
};
use crate::engine::Broadcast;
use crate::env::{EntityInfo, SpecialDamageFlags};
use crate::state::{ActionId, EntityId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Windup,
    Charging,
    Complete,
}

impl Stage {
    fn of(view: &InstanceView<'_>) -> Self {
        let elapsed = view.time_running();
        if elapsed < view.config.exec_time_seconds {
            Self::Windup
        } else if elapsed < view.config.duration_seconds {
            Self::Charging
        } else {
            Self::Complete
        }
    }
}

/// Charge across the field, hitting everything in the way once.
///
/// `Windup → Charging → Complete`. Entering `Charging` sweeps everything
/// already touching the actor, since contact callbacks never fire for
/// pre-existing contact. Every collider is hit at most once per instance.
#[derive(Debug, Default)]
pub struct Trample {
    previous: Stage,
    collided: HashSet<EntityId>,
    was_stunned: bool,
    /// Follow-up chained once a stunned trample ends.
    stunned_prototype: Option<ActionId>,
}

impl Trample {
    fn simulate_collision_with_nearby(&mut self, ctx: &mut ServerContext<'_>) {
        let Some(actor) = ctx.actor_info() else {
            return;
        };
        let touching =
            ctx.host
                .overlap_sphere(actor.position, ctx.engine.physical_touch_distance, None);
        for other in touching {
            self.collide(ctx, other);
        }
    }

    fn collide(&mut self, ctx: &mut ServerContext<'_>, other: EntityId) {
        if other == ctx.actor || !self.collided.insert(other) {
            return;
        }
        let (Some(actor), Some(victim)) = (ctx.actor_info(), ctx.host.resolve(other)) else {
            return;
        };

        if victim.faction.is_character() {
            self.collide_with_victim(ctx, &actor, &victim);
        } else if !self.was_stunned {
            let flags = ctx.host.special_damage_flags(other);
            if !flags.contains(SpecialDamageFlags::NOT_AFFECTED_BY_SPLASH) {
                ctx.damage(other, ctx.config.splash_damage);
            }
            if flags.contains(SpecialDamageFlags::STUN_ON_TRAMPLE) {
                self.stun_self(ctx);
            }
        }
    }

    fn collide_with_victim(
        &mut self,
        ctx: &mut ServerContext<'_>,
        actor: &EntityInfo,
        victim: &EntityInfo,
    ) {
        if self.was_stunned {
            return;
        }

        // Allies are only shoved aside.
        if actor.faction.is_hostile_to(victim.faction) {
            let chance = ctx
                .host
                .buffed_value(victim.id, BuffableValue::ChanceToStunTramplers);
            if chance > 0.0 && ctx.roll_unit() < chance {
                self.stun_self(ctx);
                return;
            }

            let damage = if ctx.request.targets(victim.id) {
                ctx.config.amount
            } else {
                ctx.config.splash_damage
            };
            ctx.damage(victim.id, damage);
        }

        ctx.host.start_knockback(
            victim.id,
            actor.position,
            ctx.config.knockback_speed,
            ctx.config.knockback_duration,
        );
    }

    fn stun_self(&mut self, ctx: &mut ServerContext<'_>) {
        if self.was_stunned {
            return;
        }
        self.was_stunned = true;
        self.stunned_prototype = ctx.engine.prototypes.stunned;
        tracing::debug!(target: "engine::trample", actor = %ctx.actor, "trampler stunned");

        ctx.host.cancel_move(ctx.actor);
        ctx.cancel_other_actions();
        ctx.broadcast(Broadcast::CancelAllActions);
    }
}

impl ActionBehavior for Trample {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        self.previous = Stage::Windup;
        ctx.face_request();
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn update(&mut self, ctx: &mut ServerContext<'_>) -> Conclusion {
        let stage = Stage::of(&ctx.view());
        // A long step can skip `Charging` entirely; the sweep still runs.
        if self.previous == Stage::Windup && stage != Stage::Windup {
            self.simulate_collision_with_nearby(ctx);
            if !self.was_stunned && stage == Stage::Charging {
                let charge_time = ctx.config.duration_seconds - ctx.config.exec_time_seconds;
                ctx.host
                    .start_forward_charge(ctx.actor, ctx.config.move_speed, charge_time);
            }
        }
        self.previous = stage;

        if stage == Stage::Complete || self.was_stunned {
            Conclusion::Stop
        } else {
            Conclusion::Continue
        }
    }

    fn collision_entered(&mut self, ctx: &mut ServerContext<'_>, other: EntityId) {
        if Stage::of(&ctx.view()) == Stage::Charging {
            self.collide(ctx, other);
        }
    }

    fn chain_into_new_action(&mut self, _view: &InstanceView<'_>) -> Option<ActionRequestData> {
        if !self.was_stunned {
            return None;
        }
        self.stunned_prototype.map(ActionRequestData::new)
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.anim2);
    }
}
