//! Drive two LWW-Element-Set replicas from timers and watch them converge.

/// Configuration and argument parsing
mod config;

/// The replicas and the random operations they perform
mod simulation;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use simulation::{Side, Simulation};
use tokio::{fs, time};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = config::Config::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = config.seed();
    tracing::info!(seed, ticks = config.ticks, "starting simulation");

    let mut sim = Simulation::new(seed, config.elements, config.remove_chance);

    // Each replica acts on its own timer. Whichever fires first gets the tick,
    // and every tick ends with both replicas merging each other's state.
    let mut ticks_a = time::interval(config.tick);
    let mut ticks_b = time::interval(config.tick_b());

    for _ in 0..config.ticks {
        let side = tokio::select! {
            _ = ticks_a.tick() => Side::A,
            _ = ticks_b.tick() => Side::B,
        };

        let operation = sim.step(side);
        tracing::info!(
            replica = %sim.replica(side).id(),
            %operation,
            visible = ?sim.visible(),
            "tick"
        );
    }

    for element in sim.visible() {
        println!("{element}");
    }

    if let Some(path) = &config.dump {
        let json = sim.replica(Side::A).set().snapshot().to_json()?;
        fs::write(path, json)
            .await
            .wrap_err_with(|| format!("could not write state to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote final state");
    }

    Ok(())
}
