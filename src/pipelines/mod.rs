pub mod light;
pub mod lit;
pub mod particle;
#[cfg(feature = "ui")]
pub mod text;
