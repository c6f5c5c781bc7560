use chrono::Utc;
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run two LWW-Element-Set replicas side by side, adding and removing random
/// elements on timers and merging after every operation.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Config {
    /// How many operations to run before stopping
    #[clap(long, env = "LWWSET_TICKS", default_value = "20")]
    pub ticks: u32,

    /// Milliseconds between operations on replica A. Replica B runs at one and
    /// a half times this, so the two interleave.
    #[clap(long = "tick-ms", env = "LWWSET_TICK_MS", default_value = "250",
           value_parser = clap::value_parser!(u64).range(1..).map(Duration::from_millis))]
    pub tick: Duration,

    /// Elements are drawn from "Element 1" up to "Element N"
    #[clap(long, env = "LWWSET_ELEMENTS", default_value = "10",
           value_parser = clap::value_parser!(u32).range(1..))]
    pub elements: u32,

    /// Percent chance that an operation is a removal instead of an addition
    #[clap(long, env = "LWWSET_REMOVE_CHANCE", default_value = "25",
           value_parser = clap::value_parser!(u32).range(0..=100))]
    pub remove_chance: u32,

    /// Seed for the random element generator. Defaults to the current time.
    #[clap(long, env = "LWWSET_SEED")]
    seed: Option<u64>,

    /// Write replica A's final state (every addition and removal) as JSON to
    /// this file
    #[clap(long)]
    pub dump: Option<PathBuf>,
}

impl Config {
    /// Get either the configured or a time-based seed.
    #[expect(clippy::cast_sign_loss)]
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            Utc::now().timestamp() as u64 // we're OK with underflow if timestamp is somehow pre-1970
        })
    }

    /// How often replica B acts.
    pub fn tick_b(&self) -> Duration {
        self.tick + self.tick / 2
    }
}
