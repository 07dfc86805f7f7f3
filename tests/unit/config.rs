use super::*;

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dotboard-config-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("config.json")
}

#[test]
fn parses_the_documented_shape() {
    let c: Config = serde_json::from_str(
        r#"{
            "dimensions": [64, 32],
            "background": [1, 2, 3],
            "color_remap": false,
            "apps": [
                {"name": "time"},
                {"name": "weather", "options": {"api_key": "k", "lat": 1.5}}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(c.dimensions, Canvas::new(64, 32));
    assert_eq!(c.background, Rgb8::new(1, 2, 3));
    assert!(!c.color_remap);
    assert_eq!(c.layers, LayerKind::DEFAULT_ORDER.to_vec());
    assert_eq!(c.apps[0].options, serde_json::Value::Null);
    let settings = c.compositor_settings();
    assert_eq!(settings.canvas, Canvas::new(64, 32));
}

#[test]
fn unknown_apps_are_skipped() {
    let c = Config {
        apps: vec![
            RawAppConfig::new("astronaut_io", serde_json::Value::Null),
            RawAppConfig::new("message", serde_json::json!({"text": "hi"})),
        ],
        ..Config::default()
    };
    let apps = c.resolved_apps();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].0, AppKind::Message);
}

#[test]
fn missing_or_invalid_file_falls_back_to_defaults() {
    let path = temp_path("fallback");
    let _ = std::fs::remove_file(&path);
    assert_eq!(Config::load(&path), Config::default());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(Config::try_load(&path).is_err());
    assert_eq!(Config::load(&path), Config::default());

    std::fs::write(&path, r#"{"dimensions": [0, 48]}"#).unwrap();
    assert_eq!(Config::load(&path), Config::default());
}

#[test]
fn watcher_reports_changes_at_its_interval() {
    let path = temp_path("watch");
    std::fs::write(&path, r#"{"apps": []}"#).unwrap();
    let mut w = ConfigWatcher::new(&path).with_interval(Duration::from_secs(2));
    let t0 = Instant::now();
    assert!(w.poll(t0).is_none());

    std::fs::write(&path, r#"{"apps": [{"name": "time"}]}"#).unwrap();
    // Force a different mtime even on coarse filesystems.
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(10)).unwrap();

    assert!(w.poll(t0 + Duration::from_secs(1)).is_none());
    let reloaded = w.poll(t0 + Duration::from_secs(2)).unwrap();
    assert_eq!(reloaded.apps.len(), 1);
    assert!(w.poll(t0 + Duration::from_secs(4)).is_none());
}

#[test]
fn duplicate_layers_fall_back_to_defaults() {
    let c = Config {
        layers: vec![LayerKind::Widget, LayerKind::Widget],
        ..Config::default()
    };
    assert!(c.validate().is_err());

    let path = temp_path("dup-layers");
    std::fs::write(&path, r#"{"layers": ["widget", "widget"]}"#).unwrap();
    assert!(Config::try_load(&path).is_err());
    assert_eq!(Config::load(&path), Config::default());
}
