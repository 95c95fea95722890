//! Action domain: requests, configs, instances, and the variant library.
//!
//! - `request`: what a client asks for (`ActionRequestData`)
//! - `config`: immutable per-prototype tuning (`ActionConfig`)
//! - `behavior`: the lifecycle hooks every variant implements
//! - `context`: per-call views handed to hooks
//! - `instance`: one running execution of a request
//! - `logic`: the concrete variants
//! - `buff`: buffable values and gameplay activities
//! - `utils`: geometry and timing helpers shared by variants

mod behavior;
mod buff;
mod config;
mod context;
mod error;
mod instance;
pub mod logic;
mod request;
pub mod utils;

pub use behavior::{ActionBehavior, Conclusion};
pub use buff::{BuffableValue, GameplayActivity};
pub use config::{
    ActionConfig, ActionLogic, BlockingMode, EffectDescriptor, ProjectileInfo, ProjectileKind,
};
pub use context::{ClientContext, InstanceView, PlayerCommand, ServerContext};
pub use error::{ActionError, PlayError};
pub use instance::{ActionInstance, InstancePhase};
pub use request::{ActionRequestData, TargetIds};
