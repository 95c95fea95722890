use std::sync::Arc;

use crate::action::{ActionBehavior, ActionConfig, ActionRequestData, InstanceView};
use crate::state::{ActionId, InstanceId};

/// Lifecycle position of an instance. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstancePhase {
    Requested,
    Started,
    Running,
    Ending,
    Cancelling,
    Disposed,
}

/// One running execution of a request against a config.
///
/// Exclusively owned by the player that created it.
pub struct ActionInstance {
    pub(crate) id: InstanceId,
    pub(crate) request: ActionRequestData,
    pub(crate) config: Arc<ActionConfig>,
    pub(crate) time_started: f32,
    pub(crate) anticipated: bool,
    pub(crate) phase: InstancePhase,
    pub(crate) behavior: Box<dyn ActionBehavior>,
}

impl ActionInstance {
    pub(crate) fn new(
        id: InstanceId,
        request: ActionRequestData,
        config: Arc<ActionConfig>,
        time_started: f32,
    ) -> Self {
        let behavior = crate::action::logic::create(config.logic);
        Self {
            id,
            request,
            config,
            time_started,
            anticipated: false,
            phase: InstancePhase::Requested,
            behavior,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn action_id(&self) -> ActionId {
        self.request.action_id
    }

    pub fn request(&self) -> &ActionRequestData {
        &self.request
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    pub fn time_started(&self) -> f32 {
        self.time_started
    }

    pub fn is_anticipated(&self) -> bool {
        self.anticipated
    }

    pub fn phase(&self) -> InstancePhase {
        self.phase
    }

    pub fn view(&self, now: f32) -> InstanceView<'_> {
        InstanceView {
            request: &self.request,
            config: &self.config,
            time_started: self.time_started,
            now,
        }
    }

    /// True once the config's duration has elapsed. Non-positive durations
    /// never expire.
    pub(crate) fn is_expired(&self, now: f32) -> bool {
        self.config.duration_seconds > 0.0
            && now - self.time_started >= self.config.duration_seconds
    }

    /// Moves to `next` if that is forward of the current phase.
    pub(crate) fn advance(&mut self, next: InstancePhase) {
        if next > self.phase {
            self.phase = next;
        }
    }
}

impl std::fmt::Debug for ActionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInstance")
            .field("id", &self.id)
            .field("action", &self.request.action_id)
            .field("logic", &self.config.logic)
            .field("time_started", &self.time_started)
            .field("anticipated", &self.anticipated)
            .field("phase", &self.phase)
            .finish()
    }
}
