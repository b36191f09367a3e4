mod common;

use common::test_utils::{FRAME, Unreachable, seeded_engine};
use lily_ngin::{
    animation::driver::{AnimationDriver, LoopState},
    banner::{Dedication, HINT_IDLE},
    config::SceneConfig,
    data_structures::instance::InstanceSets,
    message::{FALLBACK_PHRASE, request_phrase},
    resources::registry::{ResourceKind, ResourceRegistry},
};

fn driver() -> AnimationDriver {
    AnimationDriver::new(seeded_engine(&SceneConfig::default()))
}

#[test]
fn nothing_moves_before_start() {
    let mut driver = driver();
    assert!(!driver.frame(5.0));
    assert_eq!(driver.frame_loop().state(), LoopState::Idle);
    assert_eq!(driver.frame_loop().frames(), 0);
    assert!(driver.engine().flowers().iter().all(|f| f.pose().head_height == 0.0));
}

#[test]
fn cancel_stops_the_loop_once() {
    let mut driver = driver();
    driver.start();
    for frame in 1..=90 {
        assert!(driver.frame(frame as f32 * FRAME));
    }
    assert_eq!(driver.frame_loop().frames(), 90);

    let poses: Vec<_> = driver.engine().flowers().iter().map(|f| f.pose()).collect();
    let rain: Vec<_> = driver.engine().rain().iter().map(|l| l.position).collect();

    assert!(driver.cancel());
    assert!(!driver.cancel());
    assert_eq!(driver.frame_loop().state(), LoopState::Cancelled);

    driver.start();
    for frame in 91..=120 {
        assert!(!driver.frame(frame as f32 * FRAME));
    }
    assert_eq!(driver.frame_loop().frames(), 90);
    let after: Vec<_> = driver.engine().flowers().iter().map(|f| f.pose()).collect();
    assert_eq!(poses, after);
    let rain_after: Vec<_> = driver.engine().rain().iter().map(|l| l.position).collect();
    assert_eq!(rain, rain_after);
}

#[test]
fn registry_releases_every_resource_once() {
    let mut registry = ResourceRegistry::build(&ResourceKind::ALL, |kind| Ok(*kind)).unwrap();
    assert_eq!(registry.len(), ResourceKind::ALL.len());

    let mut freed = Vec::new();
    assert_eq!(registry.release(|kind| freed.push(kind)), 5);
    assert_eq!(freed, ResourceKind::ALL.to_vec());
    assert!(registry.is_empty());
    assert_eq!(registry.release(|kind| freed.push(kind)), 0);
    assert_eq!(freed.len(), 5);

    let petal = registry.handle(ResourceKind::Petal).unwrap();
    assert!(registry.get(petal).is_none());
}

#[test]
fn failing_provider_falls_back_while_the_scene_keeps_running() {
    let provider = Unreachable::new();
    let mut state = Dedication::default();
    let mut driver = driver();
    driver.start();

    assert!(state.begin_request());
    let phrase = futures::executor::block_on(request_phrase(&provider));
    assert!(driver.frame(FRAME));
    state.finish(phrase);

    assert_eq!(provider.requests(), 1);
    assert_eq!(state.text(), FALLBACK_PHRASE);
    assert!(!state.is_pending());
    assert_eq!(state.hint(), HINT_IDLE);

    let mut sets = InstanceSets::new();
    driver.collect(&mut sets);
    assert!(sets.total() > 0);
}
