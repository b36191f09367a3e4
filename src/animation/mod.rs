//! Procedural animation of the garden.
//!
//! - `flower` grows, blooms and sways the bouquet lilies
//! - `falling` moves the lily rain and recycles it below the floor
//! - `particles` turns and lifts the particle cloud
//! - `engine` owns all entities and ticks them once per frame
//! - `driver` gates the engine behind a cancellable frame loop
//! - `clock` and `easing` are the shared time and curve helpers

pub mod clock;
pub mod driver;
pub mod easing;
pub mod engine;
pub mod falling;
pub mod flower;
pub mod particles;
