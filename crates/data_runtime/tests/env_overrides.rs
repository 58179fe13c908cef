use data_runtime::configs::{camera, character, sim, telemetry};
use serial_test::serial;

const KEYS: &[&str] = &[
    "WALK_SPEED",
    "SPRINT_SPEED",
    "MOUSE_SENS",
    "MIN_ZOOM",
    "MAX_ZOOM",
    "TICK_HZ",
    "EXPORT_CSV",
    "LOG_LEVEL",
    "LOG_PRETTY",
];

/// Removes every override on drop, including when an assertion panics.
struct EnvGuard;

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for k in KEYS {
            unsafe { std::env::remove_var(k) };
        }
    }
}

#[test]
#[serial]
fn env_overrides_parse() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _guard = EnvGuard;
    unsafe {
        std::env::set_var("WALK_SPEED", "3.0");
        std::env::set_var("SPRINT_SPEED", "11");
        std::env::set_var("MOUSE_SENS", "12.5");
        std::env::set_var("MIN_ZOOM", "2");
        std::env::set_var("MAX_ZOOM", "25");
        std::env::set_var("TICK_HZ", "120");
        std::env::set_var("EXPORT_CSV", "false");
        std::env::set_var("LOG_LEVEL", "debug");
        std::env::set_var("LOG_PRETTY", "false");
    }
    let ch = character::load_from(dir.path()).expect("character");
    let cam = camera::load_from(dir.path()).expect("camera");
    let s = sim::load_from(dir.path()).expect("sim");
    let t = telemetry::load_from(dir.path()).expect("telemetry");
    assert_eq!(ch.walk_speed, 3.0);
    assert_eq!(ch.sprint_speed, 11.0);
    assert_eq!(cam.mouse_sensitivity, 12.5);
    assert_eq!(cam.min_zoom, 2.0);
    assert_eq!(cam.max_zoom, 25.0);
    assert_eq!(s.tick_hz, 120);
    assert!(!s.export_csv);
    assert_eq!(t.log_level, "debug");
    assert!(!t.pretty);
}

#[test]
#[serial]
fn malformed_env_values_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _guard = EnvGuard;
    unsafe {
        std::env::set_var("WALK_SPEED", "quick");
        std::env::set_var("TICK_HZ", "-3");
    }
    let ch = character::load_from(dir.path()).expect("character");
    let s = sim::load_from(dir.path()).expect("sim");
    assert_eq!(ch.walk_speed, 5.0);
    assert_eq!(s.tick_hz, 50);
}
