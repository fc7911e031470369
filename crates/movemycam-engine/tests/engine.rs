use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use camera::{
    DeviceApi, DeviceError, DeviceSession, Endpoint,
    mock::{CameraScript, MockDeviceApi},
};
use config::{CameraBinding, ConfigStore, SharedStore};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use keyname::{Platform, RawKey};
use movemycam_engine::{
    ChannelNotifier, DispatchMode, Engine, EngineOptions, EngineState, KeyEvent, Notification,
    test_support::ManualHook,
};

fn unique_tmp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = env::temp_dir().join(format!("movemycam-engine-{}-{}", process::id(), nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cam(number: u8, keys: &[&str], address: &str, preset: u32) -> CameraBinding {
    CameraBinding {
        number,
        activated: true,
        hot_keys: keys.iter().map(|k| k.to_string()).collect(),
        address: address.into(),
        port: 80,
        username: "admin".into(),
        password: "secret".into(),
        max_count: 10,
        preset,
    }
}

fn windows_store(path: &Path) -> ConfigStore {
    ConfigStore::new(path)
        .unwrap()
        .with_platform(Platform::Windows)
}

fn store_with(cameras: Vec<CameraBinding>) -> SharedStore {
    let mut store = windows_store(&unique_tmp_dir().join("MoveMyCam.conf"));
    for c in cameras {
        assert!(store.insert_camera(c, false).unwrap());
    }
    store.shared()
}

struct Harness {
    engine: Engine,
    hook: ManualHook,
    api: MockDeviceApi,
    notes: Receiver<Notification>,
}

fn harness(store: SharedStore, mode: DispatchMode) -> Harness {
    let api = MockDeviceApi::new();
    harness_with(store, mode, api.clone(), Arc::new(api))
}

fn harness_with(
    store: SharedStore,
    mode: DispatchMode,
    api: MockDeviceApi,
    device: Arc<dyn DeviceApi>,
) -> Harness {
    let hook = ManualHook::new();
    let engine = Engine::new(
        store,
        Arc::new(hook.clone()),
        device,
        EngineOptions { dispatch: mode },
    )
    .unwrap();
    let (tx, rx) = bounded(64);
    engine.set_notifier(Arc::new(ChannelNotifier::new(tx)));
    Harness {
        engine,
        hook,
        api,
        notes: rx,
    }
}

#[test]
fn chord_fires_regardless_of_press_order() {
    let store = store_with(vec![cam(1, &["CTRL L", "A"], "10.0.0.1", 3)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    assert!(h.engine.start().unwrap());

    h.hook.press("A");
    h.hook.press("CTRL L");
    h.hook.release("A");
    h.hook.release("CTRL L");

    let calls = h.api.goto_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].preset, 3);
    assert_eq!(calls[0].token, "profile_1");
    let n = h.notes.try_recv().unwrap();
    assert_eq!(n.title, "Camera 10.0.0.1");
    assert_eq!(n.text, "Camera moved to preset №3");
    assert_eq!(h.engine.held_keys(), 0);
}

#[test]
fn lowercase_stored_keys_match() {
    let store = store_with(vec![cam(1, &["CTRL L", "a"], "10.0.0.1", 1)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.engine.start().unwrap();
    h.hook.chord(&["CTRL L", "A"]);
    assert_eq!(h.api.goto_calls().len(), 1);
}

#[test]
fn partial_or_different_chord_does_not_fire() {
    let store = store_with(vec![cam(1, &["CTRL L", "A"], "10.0.0.1", 1)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.chord(&["SHIFT L", "A"]);
    h.hook.chord(&["A"]);
    assert!(h.api.goto_calls().is_empty());
    assert!(h.notes.try_recv().is_err());
}

#[test]
fn failed_camera_does_not_block_later_matches() {
    let mut broken = CameraScript::healthy(5);
    broken.goto = Err(DeviceError::Fault("busy".into()));
    let store = store_with(vec![
        cam(1, &["F1"], "10.0.0.1", 2),
        cam(2, &["F1"], "10.0.0.2", 4),
    ]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", broken);
    h.api.script("10.0.0.2", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.chord(&["F1"]);

    let calls = h.api.goto_calls();
    let addrs: Vec<&str> = calls.iter().map(|c| c.address.as_str()).collect();
    assert_eq!(addrs, vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(h.notes.try_recv().unwrap().text, "Camera not moved!");
    assert_eq!(h.notes.try_recv().unwrap().text, "Camera moved to preset №4");
}

#[test]
fn inactive_bindings_are_ignored() {
    let mut off = cam(1, &["F2"], "10.0.0.1", 1);
    off.activated = false;
    let store = store_with(vec![off, cam(2, &["F3"], "10.0.0.2", 1)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.api.script("10.0.0.2", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.chord(&["F2"]);
    assert_eq!(h.api.open_count("10.0.0.1"), 0);
    h.hook.chord(&["F3"]);
    assert_eq!(h.api.open_count("10.0.0.2"), 1);
}

#[test]
fn start_requires_bindings() {
    let h = harness(store_with(vec![]), DispatchMode::Inline);
    assert!(!h.engine.ready());
    assert!(!h.engine.start().unwrap());
    assert_eq!(h.engine.state(), EngineState::Stopped);
    assert!(!h.hook.is_installed());
}

#[test]
fn stop_is_idempotent_and_uninstalls() {
    let store = store_with(vec![cam(1, &["F1"], "10.0.0.1", 1)]);
    let h = harness(store, DispatchMode::Inline);
    assert!(h.engine.start().unwrap());
    assert!(h.engine.start().unwrap());
    assert_eq!(h.hook.install_count(), 1);
    assert!(h.hook.is_installed());

    h.hook.press("F1");
    assert_eq!(h.engine.held_keys(), 1);
    h.engine.stop();
    h.engine.stop();
    assert_eq!(h.engine.state(), EngineState::Stopped);
    assert!(!h.hook.is_installed());
    assert_eq!(h.engine.held_keys(), 0);

    h.hook.release("F1");
    assert_eq!(h.api.open_count("10.0.0.1"), 0);
}

#[test]
fn hook_failure_leaves_engine_stopped() {
    let store = store_with(vec![cam(1, &["F1"], "10.0.0.1", 1)]);
    let h = harness(store, DispatchMode::Inline);
    h.hook.fail_next_install("no accessibility permission");
    assert!(h.engine.start().is_err());
    assert_eq!(h.engine.state(), EngineState::Stopped);
    assert!(h.engine.start().unwrap());
}

#[test]
fn reload_clears_held_keys_and_picks_up_new_bindings() {
    let dir = unique_tmp_dir();
    let path = dir.join("MoveMyCam.conf");
    let mut store = windows_store(&path);
    store
        .insert_camera(cam(1, &["F1"], "10.0.0.1", 1), false)
        .unwrap();
    let store = store.shared();
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.api.script("10.0.0.2", CameraScript::healthy(5));
    h.engine.start().unwrap();

    {
        let mut other = windows_store(&path);
        other
            .insert_camera(cam(1, &["F9"], "10.0.0.2", 2), false)
            .unwrap();
        assert!(other.save().unwrap());
    }

    h.hook.press("F1");
    assert!(h.engine.load_configuration());
    assert_eq!(h.engine.held_keys(), 0);
    assert!(h.engine.is_running());
    assert_eq!(h.hook.install_count(), 2);

    h.hook.release("F1");
    assert_eq!(h.api.open_count("10.0.0.1"), 0);
    h.hook.chord(&["F9"]);
    assert_eq!(h.api.goto_calls()[0].address, "10.0.0.2");
}

#[test]
fn rejected_reload_keeps_previous_bindings() {
    let dir = unique_tmp_dir();
    let path = dir.join("MoveMyCam.conf");
    fs::write(
        &path,
        r#"{"cameras": [{"number": 1, "activated": true, "hot-keys": ["F1"],
            "address": "", "port": 80, "username": "", "password": "",
            "max-count": 5, "preset": 1}]}"#,
    )
    .unwrap();
    let mut store = windows_store(&path);
    store
        .insert_camera(cam(2, &["F2"], "10.0.0.2", 1), false)
        .unwrap();
    let h = harness(store.shared(), DispatchMode::Inline);
    h.api.script("10.0.0.2", CameraScript::healthy(5));
    h.engine.start().unwrap();

    assert!(!h.engine.load_configuration());
    assert!(h.engine.is_running());
    h.hook.chord(&["F2"]);
    assert_eq!(h.api.goto_calls().len(), 1);
}

#[test]
fn worker_dispatch_runs_moves_in_order() {
    let store = store_with(vec![
        cam(1, &["F1"], "10.0.0.1", 1),
        cam(2, &["F1"], "10.0.0.2", 2),
    ]);
    let h = harness(store, DispatchMode::Worker { capacity: 4 });
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.api.script("10.0.0.2", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.chord(&["F1"]);

    let first = h.notes.recv_timeout(Duration::from_secs(5)).unwrap();
    let second = h.notes.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.title, "Camera 10.0.0.1");
    assert_eq!(second.title, "Camera 10.0.0.2");
}

#[test]
fn release_of_unnamed_key_still_checks_chords() {
    let store = store_with(vec![cam(1, &["F1"], "10.0.0.1", 2)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.press("F1");
    h.hook.send(KeyEvent::release(RawKey::Virtual(250)));
    assert_eq!(h.api.goto_calls().len(), 1);
    assert_eq!(h.engine.held_keys(), 1);
}

#[test]
fn keypad_digits_match_on_windows_store() {
    let store = store_with(vec![cam(1, &["NUM 5"], "10.0.0.1", 2)]);
    let h = harness(store, DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.engine.start().unwrap();
    h.hook.chord(&["NUM 5"]);
    assert_eq!(h.api.goto_calls().len(), 1);
}

#[test]
fn engine_names_keys_for_the_store_platform() {
    let mut store = ConfigStore::new(unique_tmp_dir().join("MoveMyCam.conf"))
        .unwrap()
        .with_platform(Platform::Linux);
    assert!(store.insert_camera(cam(1, &["CTRL", "A"], "10.0.0.1", 1), false).unwrap());
    let h = harness(store.shared(), DispatchMode::Inline);
    h.api.script("10.0.0.1", CameraScript::healthy(5));
    h.engine.start().unwrap();

    h.hook.chord(&["CTRL L", "A"]);
    assert!(h.api.goto_calls().is_empty());
    h.hook.chord(&["CTRL", "A"]);
    assert_eq!(h.api.goto_calls().len(), 1);
}

/// Device API whose `open` waits until the gate's sender is dropped.
struct GatedApi {
    inner: MockDeviceApi,
    gate: Receiver<()>,
    entered: Sender<String>,
}

impl DeviceApi for GatedApi {
    fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn DeviceSession>, DeviceError> {
        self.entered.send(endpoint.address.clone()).ok();
        self.gate.recv().ok();
        self.inner.open(endpoint)
    }
}

struct Gated {
    h: Harness,
    entered: Receiver<String>,
}

/// Worker-mode harness; opening any camera blocks until the returned sender is dropped.
fn gated(cameras: Vec<CameraBinding>, capacity: usize) -> (Gated, Sender<()>) {
    let api = MockDeviceApi::new();
    for c in &cameras {
        api.script(&c.address, CameraScript::healthy(5));
    }
    let (release, gate) = bounded(0);
    let (entered_tx, entered) = unbounded();
    let device = Arc::new(GatedApi {
        inner: api.clone(),
        gate,
        entered: entered_tx,
    });
    let h = harness_with(
        store_with(cameras),
        DispatchMode::Worker { capacity },
        api,
        device,
    );
    h.engine.start().unwrap();
    (Gated { h, entered }, release)
}

impl Gated {
    /// Fire the F9 binding and wait until the worker is stuck inside it.
    fn occupy_worker(&self) {
        self.h.hook.chord(&["F9"]);
        let addr = self.entered.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(addr, "10.0.0.9");
    }

    fn notes(&self, n: usize) -> Vec<Notification> {
        (0..n)
            .map(|_| self.h.notes.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect()
    }
}

#[test]
fn full_queue_reports_every_dropped_move() {
    let (g, release) = gated(
        vec![
            cam(9, &["F9"], "10.0.0.9", 1),
            cam(1, &["F1"], "10.0.0.1", 1),
            cam(2, &["F1"], "10.0.0.2", 2),
            cam(3, &["F1"], "10.0.0.3", 3),
        ],
        1,
    );
    g.occupy_worker();

    g.h.hook.chord(&["F1"]);
    let dropped = g.notes(2);
    assert_eq!(dropped[0].title, "Camera 10.0.0.2");
    assert_eq!(dropped[1].title, "Camera 10.0.0.3");
    assert!(dropped.iter().all(|n| n.text == "Camera not moved!"));

    drop(release);
    let moved = g.notes(2);
    assert_eq!(moved[0].title, "Camera 10.0.0.9");
    assert_eq!(moved[1].title, "Camera 10.0.0.1");
    assert_eq!(moved[1].text, "Camera moved to preset №1");
    let addrs: Vec<String> = g.h.api.goto_calls().into_iter().map(|c| c.address).collect();
    assert_eq!(addrs, vec!["10.0.0.9", "10.0.0.1"]);
}

#[test]
fn stop_discards_moves_still_queued() {
    let (g, release) = gated(
        vec![cam(9, &["F9"], "10.0.0.9", 1), cam(1, &["F1"], "10.0.0.1", 1)],
        4,
    );
    g.occupy_worker();

    g.h.hook.chord(&["F1"]);
    g.h.engine.stop();
    drop(release);

    assert_eq!(g.notes(1)[0].title, "Camera 10.0.0.9");
    assert!(g.h.notes.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(g.h.api.open_count("10.0.0.1"), 0);
}

#[test]
fn ready_ignores_unarmed_bindings() {
    let mut off = cam(1, &["F1"], "10.0.0.1", 1);
    off.activated = false;
    let h = harness(store_with(vec![off, cam(2, &[], "10.0.0.2", 1)]), DispatchMode::Inline);
    assert!(!h.engine.ready());
    assert!(!h.engine.start().unwrap());
}
