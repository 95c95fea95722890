//! Runtime configuration shared by the session and the simulation worker.
use std::env;
use std::time::Duration;

use action_core::EngineConfig;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Fixed simulation rate. Zero disables the internal clock; the worker
    /// then only advances on explicit `advance` commands.
    pub tick_hz: u32,
    /// Capacity of the command queue and of each replication channel.
    pub channel_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tick_hz: 30,
            channel_capacity: 256,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACTION_TICK_HZ` - Simulation ticks per second (default: 30)
    /// - `ACTION_CHANNEL_CAPACITY` - Channel capacity (default: 256, minimum 1)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(hz) = read_env::<u32>("ACTION_TICK_HZ") {
            config.tick_hz = hz;
        }
        if let Some(capacity) = read_env::<usize>("ACTION_CHANNEL_CAPACITY") {
            config.channel_capacity = capacity.max(1);
        }

        config
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Simulation step, or `None` when the internal clock is disabled.
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.tick_hz > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(self.tick_hz)))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
