//! Action catalog oracle.

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::ActionConfig;
use crate::state::ActionId;

/// Read-only table mapping an action id to its immutable config.
pub trait ActionOracle: Send + Sync {
    /// Returns the config for `id`, or `None` if the catalog has no such
    /// prototype.
    fn action_config(&self, id: ActionId) -> Option<Arc<ActionConfig>>;
}

impl ActionOracle for HashMap<ActionId, Arc<ActionConfig>> {
    fn action_config(&self, id: ActionId) -> Option<Arc<ActionConfig>> {
        self.get(&id).cloned()
    }
}
