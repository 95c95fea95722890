//! Action players.
//!
//! [`AuthoritativeActionPlayer`] runs the real thing on the server: it owns
//! the blocking slot, the non-blocking set, and the pending queue of one
//! actor, and reports what observers need to know as [`Broadcast`]s.
//! [`VisualizationActionPlayer`] mirrors those broadcasts on every observer
//! and lets the owning client anticipate its own input.
//!
//! Both are single-threaded and tick-driven: nothing suspends, and every
//! timed phase is a pure function of accumulated `dt`.

mod authoritative;
mod broadcast;
mod visualization;

pub use authoritative::{AuthoritativeActionPlayer, PlayOutcome};
pub use broadcast::Broadcast;
pub use visualization::VisualizationActionPlayer;
