use glam::Vec3;
use serde::{Deserialize, Serialize};

use action_core::{ActionRequestData, Broadcast, EntityId};

/// What a client asks the server to do for one of its actors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientRequest {
    PlayAction(ActionRequestData),
    /// The player released a charge button.
    StopChargingUp,
    /// Walk to a point, interrupting interruptible work.
    Move(Vec3),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub actor: EntityId,
    pub request: ClientRequest,
}

impl ClientMessage {
    pub fn play(actor: EntityId, request: ActionRequestData) -> Self {
        Self {
            actor,
            request: ClientRequest::PlayAction(request),
        }
    }

    pub fn stop_charging_up(actor: EntityId) -> Self {
        Self {
            actor,
            request: ClientRequest::StopChargingUp,
        }
    }

    pub fn move_to(actor: EntityId, destination: Vec3) -> Self {
        Self {
            actor,
            request: ClientRequest::Move(destination),
        }
    }
}

/// One authoritative event about one actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub actor: EntityId,
    pub event: Broadcast,
}
