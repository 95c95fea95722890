//! Lifecycle interface shared by every action variant.
//!
//! Each hook has a no-op default, so a variant only implements the hooks it
//! needs. Server hooks run inside an [`AuthoritativeActionPlayer`]; client
//! hooks run inside a [`VisualizationActionPlayer`]. One variant value only
//! ever sees one side.
//!
//! [`AuthoritativeActionPlayer`]: crate::engine::AuthoritativeActionPlayer
//! [`VisualizationActionPlayer`]: crate::engine::VisualizationActionPlayer

use crate::action::{
    ActionError, ActionRequestData, BlockingMode, BuffableValue, ClientContext, GameplayActivity,
    InstanceView, ServerContext,
};
use crate::state::EntityId;

/// What a hook wants its player to do with the instance next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conclusion {
    /// Keep running.
    Continue,
    /// Finish normally (`end` / `end_client`, then chaining).
    Stop,
    /// Abort (`cancel` / `cancel_client`).
    Cancel,
}

pub trait ActionBehavior: Send {
    // ===== server =====

    /// Starts the instance. An `Err` aborts this instance only; nothing is
    /// broadcast for it.
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError>;

    /// Per-tick step. Duration expiry is handled by the player.
    fn update(&mut self, _ctx: &mut ServerContext<'_>) -> Conclusion {
        Conclusion::Continue
    }

    fn end(&mut self, _ctx: &mut ServerContext<'_>) {}

    /// Must release everything the instance owns before returning.
    fn cancel(&mut self, _ctx: &mut ServerContext<'_>) {}

    /// Polled while the instance holds the blocking slot.
    fn should_become_non_blocking(&self, view: &InstanceView<'_>) -> bool {
        view.config.blocking_mode == BlockingMode::OnlyDuringExecTime
            && view.time_running() >= view.config.exec_time_seconds
    }

    /// Follow-up request started right after `end`.
    fn chain_into_new_action(&mut self, _view: &InstanceView<'_>) -> Option<ActionRequestData> {
        None
    }

    fn collision_entered(&mut self, _ctx: &mut ServerContext<'_>, _other: EntityId) {}

    /// Contribution to a buffable value, or `None` when not contributing.
    fn buff_value(&self, _kind: BuffableValue, _view: &InstanceView<'_>) -> Option<f32> {
        None
    }

    fn on_gameplay_activity(&mut self, _ctx: &mut ServerContext<'_>, _activity: GameplayActivity) {
    }

    // ===== client =====

    fn start_client(&mut self, _ctx: &mut ClientContext<'_>) -> Conclusion {
        Conclusion::Continue
    }

    fn update_client(&mut self, _ctx: &mut ClientContext<'_>) -> Conclusion {
        Conclusion::Continue
    }

    fn end_client(&mut self, ctx: &mut ClientContext<'_>) {
        self.cancel_client(ctx);
    }

    /// Must shut down every effect the instance spawned before returning.
    fn cancel_client(&mut self, _ctx: &mut ClientContext<'_>) {}

    fn on_anim_event_client(&mut self, _ctx: &mut ClientContext<'_>, _event: &str) {}

    fn on_stopped_charging_up_client(&mut self, _ctx: &mut ClientContext<'_>, _percent: f32) {}
}
