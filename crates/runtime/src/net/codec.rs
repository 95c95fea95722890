//! Bincode framing for replication messages.
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("failed to decode message: {0}")]
    Decode(String),
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(message).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use action_core::{ActionId, ActionRequestData, Broadcast, EntityId, ReplicatedActorState};
    use glam::Vec3;

    use super::*;
    use crate::net::{ClientMessage, ServerMessage};

    #[test]
    fn request_survives_the_wire() {
        let mut request = ActionRequestData::new(ActionId(3))
            .with_target(EntityId(9))
            .with_position(Vec3::new(1.0, 0.0, -2.5))
            .with_amount(2.0)
            .queued();
        request.target_ids.push(EntityId(10));
        let message = ClientMessage::play(EntityId(1), request);

        let decoded: ClientMessage = decode(&encode(&message).unwrap()).unwrap();

        assert_eq!(decoded, message);
    }

    #[test]
    fn state_change_survives_the_wire() {
        let message = ServerMessage {
            actor: EntityId(4),
            event: Broadcast::StateChanged(ReplicatedActorState {
                target: Some(EntityId(2)),
                held_object: None,
                is_stealthy: true,
            }),
        };

        let decoded: ServerMessage = decode(&encode(&message).unwrap()).unwrap();

        assert_eq!(decoded, message);
    }

    #[test]
    fn truncated_frame_is_a_decode_error() {
        let bytes = encode(&ClientMessage::stop_charging_up(EntityId(1))).unwrap();
        let err = decode::<ClientMessage>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
