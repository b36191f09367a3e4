//! Engine data structures: meshes, instances and GPU buffers.
//!
//! - `model` contains mesh and material definitions and the draw helpers
//! - `texture` contains the depth texture
//! - `instance` holds per-instance transformation data
//! - `batch` keeps one instance buffer per scene resource up to date

pub mod batch;
pub mod instance;
pub mod model;
pub mod texture;
