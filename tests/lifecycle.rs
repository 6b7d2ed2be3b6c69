mod common;

use common::{fire, RecordingBackend, SharedLedger};
use portfolio_fx::config::{ChromaticConfig, DitherConfig};
use portfolio_fx::effects::{ChromaticImage, DitherWaves};
use portfolio_fx::lifecycle::{Mount, MountOutcome, Phase, TickOutcome};
use portfolio_fx::pointer::{PointerEvent, Vec2};
use portfolio_fx::surface::SurfaceSize;
use portfolio_fx::uniforms::UniformValue;

fn chromatic(target_fps: Option<f32>) -> ChromaticImage {
    ChromaticImage::new(ChromaticConfig {
        src: "/images/avatar.png".into(),
        target_fps,
        ..Default::default()
    })
}

fn mounted(target_fps: Option<f32>) -> (Mount<RecordingBackend, ChromaticImage>, SharedLedger) {
    let (backend, ledger) = RecordingBackend::new();
    let mut mount = Mount::new(backend, chromatic(target_fps));
    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Running);
    (mount, ledger)
}

fn tick<E: portfolio_fx::effects::Effect>(
    mount: &mut Mount<RecordingBackend, E>,
    ledger: &SharedLedger,
    now_ms: f64,
) -> TickOutcome {
    fire(ledger);
    mount.frame(now_ms)
}

#[test]
fn mount_then_immediate_unmount_leaves_nothing_scheduled() {
    let (mut mount, ledger) = mounted(None);
    assert!(mount.has_pending_frame());
    mount.unmount();

    let l = ledger.borrow();
    assert!(l.outstanding.is_empty());
    assert!(!l.listeners);
    assert_eq!(l.live_contexts, 0);
    assert_eq!(mount.phase(), Phase::Unmounted);
    assert!(!mount.has_pending_frame());
}

#[test]
fn teardown_runs_in_reverse_acquisition_order() {
    let (mut mount, ledger) = mounted(None);
    ledger.borrow_mut().log.clear();
    mount.unmount();
    assert_eq!(
        ledger.borrow().log,
        vec!["cancel frame", "detach listeners", "release surface"]
    );
}

#[test]
fn unmount_twice_releases_once() {
    let (mut mount, ledger) = mounted(None);
    mount.unmount();
    mount.unmount();
    drop(mount);
    let l = ledger.borrow();
    assert_eq!(l.created, 1);
    assert_eq!(l.released, 1);
}

#[test]
fn dropping_a_mounted_controller_unmounts_it() {
    let (mount, ledger) = mounted(None);
    drop(mount);
    let l = ledger.borrow();
    assert_eq!(l.live_contexts, 0);
    assert!(l.outstanding.is_empty());
}

#[test]
fn fifty_remounts_never_hold_two_contexts() {
    let (backend, ledger) = RecordingBackend::new();
    let mut mount = Mount::new(backend, chromatic(None));
    for i in 0..50 {
        assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Running);
        if i % 2 == 0 {
            tick(&mut mount, &ledger, i as f64 * 16.0);
        }
        mount.unmount();
        assert_eq!(ledger.borrow().live_contexts, 0);
    }
    let l = ledger.borrow();
    assert_eq!(l.peak_contexts, 1);
    assert_eq!(l.created, 50);
    assert_eq!(l.released, 50);
    assert!(l.outstanding.is_empty());
}

#[test]
fn second_mount_is_a_no_op() {
    let (mut mount, ledger) = mounted(None);
    assert_eq!(mount.mount(SurfaceSize::new(10, 10)), MountOutcome::AlreadyMounted);
    assert_eq!(ledger.borrow().created, 1);
    assert_eq!(mount.surface_size(), Some(SurfaceSize::new(400, 300)));
}

#[test]
fn resize_keeps_the_same_context() {
    let (mut mount, ledger) = mounted(None);
    let before = mount.context_id();
    mount.resize(SurfaceSize::new(800, 300));
    assert_eq!(mount.surface_size(), Some(SurfaceSize::new(800, 300)));
    assert_eq!(mount.context_id(), before);
    assert_eq!(ledger.borrow().created, 1);
}

#[test]
fn missing_context_renders_a_placeholder() {
    let (backend, ledger) = RecordingBackend::new();
    ledger.borrow_mut().context_unavailable = true;
    let mut mount = Mount::new(backend, chromatic(None));

    assert_eq!(mount.mount(SurfaceSize::new(320, 240)), MountOutcome::Placeholder);
    assert_eq!(mount.phase(), Phase::Unmounted);
    assert!(!mount.has_pending_frame());
    let l = ledger.borrow();
    assert_eq!(l.placeholder, Some(SurfaceSize::new(320, 240)));
    assert!(!l.listeners);
    drop(l);

    // nothing to tear down
    mount.unmount();
    assert!(ledger.borrow().log.is_empty());
}

#[test]
fn frame_writes_all_uniforms_before_its_draw() {
    let (mut mount, ledger) = mounted(None);
    ledger.borrow_mut().log.clear();
    assert_eq!(tick(&mut mount, &ledger, 16.0), TickOutcome::Drawn);

    let log = ledger.borrow().log.clone();
    let draw = log.iter().position(|e| e == "draw").unwrap();
    assert_eq!(log.iter().filter(|e| *e == "draw").count(), 1);
    assert!(log[..draw].iter().all(|e| e.starts_with("uniform ")));
    assert!(log[..draw].contains(&"uniform u_aberrationIntensity".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("request frame"));
}

#[test]
fn pointer_state_flows_into_uniforms() {
    let (mut mount, ledger) = mounted(None);
    mount.pointer(PointerEvent::Enter(Vec2::new(0.25, 0.25)));
    mount.pointer(PointerEvent::Move(Vec2::new(0.75, 0.25)));
    tick(&mut mount, &ledger, 0.0);

    let batch = ledger.borrow().last_batch.clone().unwrap();
    assert_eq!(batch.get("u_prevMouse"), Some(UniformValue::Vec2([0.25, 0.75])));
    match batch.get("u_mouse") {
        Some(UniformValue::Vec2([x, y])) => {
            assert!(x > 0.25 && x < 0.75);
            assert_eq!(y, 0.75);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn thirty_fps_skips_early_frames_without_touching_state() {
    let (mut mount, ledger) = mounted(Some(30.0));
    mount.pointer(PointerEvent::Move(Vec2::new(0.9, 0.9)));

    assert_eq!(tick(&mut mount, &ledger, 1000.0), TickOutcome::Drawn);
    let after_first = *mount.effect().state();

    assert_eq!(tick(&mut mount, &ledger, 1020.0), TickOutcome::Throttled);
    assert_eq!(mount.phase(), Phase::Throttled);
    assert_eq!(*mount.effect().state(), after_first);
    // the loop keeps itself alive while throttled
    assert!(mount.has_pending_frame());

    assert_eq!(tick(&mut mount, &ledger, 1034.0), TickOutcome::Drawn);
    assert_eq!(mount.phase(), Phase::Running);
    assert!(mount.effect().state().intensity < after_first.intensity);
}

#[test]
fn hidden_surface_skips_work() {
    let (backend, ledger) = RecordingBackend::new();
    let mut mount = Mount::new(backend, DitherWaves::new(DitherConfig::default()));
    mount.mount(SurfaceSize::new(640, 480));
    mount.set_visible(false);

    ledger.borrow_mut().log.clear();
    assert_eq!(tick(&mut mount, &ledger, 100.0), TickOutcome::Hidden);
    assert_eq!(mount.phase(), Phase::Hidden);
    assert!(!ledger.borrow().log.iter().any(|e| e == "draw"));

    mount.set_visible(true);
    assert_eq!(tick(&mut mount, &ledger, 116.0), TickOutcome::Drawn);
}

#[test]
fn callbacks_after_unmount_are_inert() {
    let (mut mount, ledger) = mounted(None);
    mount.unmount();
    ledger.borrow_mut().log.clear();

    mount.pointer(PointerEvent::Move(Vec2::new(0.1, 0.1)));
    assert_eq!(mount.frame(50.0), TickOutcome::Inactive);
    assert_eq!(mount.effect().state().target, Vec2::CENTER);
    assert!(ledger.borrow().log.is_empty());
    assert!(ledger.borrow().outstanding.is_empty());
}

#[test]
fn remount_after_unmount_runs_again() {
    let (mut mount, ledger) = mounted(None);
    mount.unmount();
    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Running);
    assert_eq!(tick(&mut mount, &ledger, 0.0), TickOutcome::Drawn);
    assert_eq!(ledger.borrow().live_contexts, 1);
}

#[test]
fn dither_resolution_tracks_resize_and_pixel_ratio() {
    let (mut backend, ledger) = RecordingBackend::new();
    backend.pixel_ratio = 1.5;
    let mut mount = Mount::new(backend, DitherWaves::new(DitherConfig::default()));
    mount.mount(SurfaceSize::new(400, 300));
    mount.resize(SurfaceSize::new(800, 300));
    tick(&mut mount, &ledger, 0.0);

    let batch = ledger.borrow().last_batch.clone().unwrap();
    assert_eq!(batch.get("resolution"), Some(UniformValue::Vec2([1200.0, 450.0])));
}

#[test]
fn failed_listener_attach_releases_everything() {
    let (backend, ledger) = RecordingBackend::new();
    ledger.borrow_mut().listeners_fail = true;
    let mut mount = Mount::new(backend, chromatic(None));

    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Placeholder);
    assert_eq!(mount.phase(), Phase::Unmounted);
    {
        let l = ledger.borrow();
        assert_eq!(l.live_contexts, 0);
        assert_eq!(l.released, 1);
        assert!(!l.listeners);
        assert!(l.outstanding.is_empty());
        assert_eq!(l.placeholder, Some(SurfaceSize::new(400, 300)));
    }

    mount.unmount();
    drop(mount);
    let l = ledger.borrow();
    assert!(!l.listeners);
    assert_eq!(l.log.iter().filter(|e| *e == "detach listeners").count(), 1);
    assert_eq!(l.released, 1);
}

#[test]
fn failed_frame_request_releases_everything() {
    let (backend, ledger) = RecordingBackend::new();
    ledger.borrow_mut().frame_fail = true;
    let mut mount = Mount::new(backend, chromatic(None));

    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Placeholder);
    assert!(!mount.has_pending_frame());
    let l = ledger.borrow();
    assert_eq!(l.live_contexts, 0);
    assert!(!l.listeners);
    assert!(l.outstanding.is_empty());
    assert_eq!(
        l.log,
        vec![
            "create surface",
            "attach listeners",
            "detach listeners",
            "release surface"
        ]
    );
}

#[test]
fn mount_succeeds_once_listeners_recover() {
    let (backend, ledger) = RecordingBackend::new();
    ledger.borrow_mut().listeners_fail = true;
    let mut mount = Mount::new(backend, chromatic(None));
    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Placeholder);

    ledger.borrow_mut().listeners_fail = false;
    assert_eq!(mount.mount(SurfaceSize::new(400, 300)), MountOutcome::Running);
    assert_eq!(ledger.borrow().peak_contexts, 1);
    mount.unmount();
    assert!(!ledger.borrow().listeners);
}
