// Library exports for the binary and for testing
pub mod config;
pub mod days;
pub mod event;
pub mod hourly;
pub mod loader;
pub mod logging;
pub mod ranker;
pub mod renderer;
pub mod stats;
pub mod stats_builder;
pub mod streaks;
pub mod timefmt;
pub mod window;

#[cfg(test)]
mod fixtures;
