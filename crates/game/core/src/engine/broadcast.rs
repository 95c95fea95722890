use crate::action::ActionRequestData;
use crate::state::{ActionId, ReplicatedActorState};

/// Server → observer event for one actor's stream.
///
/// Delivered FIFO per actor; observers apply them in order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Broadcast {
    /// An instance started with this (possibly revised) request.
    PlayAction(ActionRequestData),
    CancelAllActions,
    CancelActionsByPrototype(ActionId),
    /// A charge was released at this fraction of full charge.
    StoppedChargingUp(f32),
    StateChanged(ReplicatedActorState),
}
