#![allow(dead_code)]

use lily_ngin::{
    animation::engine::AnimationEngine,
    config::SceneConfig,
    message::{PhraseProvider, ProviderError, ProviderFuture},
    resources::registry::SceneHandles,
};
use rand::{SeedableRng, rngs::StdRng};

pub const SEED: u64 = 0x11_1e5;
pub const FRAME: f32 = 1.0 / 60.0;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// A garden planted against registry-ordered handles, no GPU needed.
pub fn seeded_engine(config: &SceneConfig) -> AnimationEngine {
    AnimationEngine::populate(config, SceneHandles::sequential(), rng())
}

/// Provider whose every request fails.
pub struct Unreachable {
    requests: std::sync::atomic::AtomicUsize,
}

impl Unreachable {
    pub fn new() -> Self {
        Self {
            requests: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl PhraseProvider for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn fetch(&self) -> ProviderFuture<'_> {
        self.requests
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Box::pin(async { Err(ProviderError::MissingKey) })
    }
}
