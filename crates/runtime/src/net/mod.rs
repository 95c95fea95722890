//! Replication between the authoritative server and observers.
//!
//! Clients send [`ClientMessage`]s to the server; the server fans
//! [`ServerMessage`]s out to every observer. Both directions travel as
//! bincode frames through a [`ReplicationChannel`].
mod channel;
mod codec;
mod messages;

pub use channel::{ClientEndpoint, ObserverEndpoint, ReplicationChannel, ServerEndpoint};
pub use codec::{CodecError, decode, encode};
pub use messages::{ClientMessage, ClientRequest, ServerMessage};
