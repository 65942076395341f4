//! Host tests: whole pages through `enhance` and `run`

use std::fs;

use bb_contents::{Options, enhance};
use bb_core::Config;

const PAGE: &str = r#"<!DOCTYPE html><html><head><title>Notes</title></head><body><p>&copy; <span bb-current-year></span></p><div bb-youtube-channel="UC1"></div></body></html>"#;

#[test]
fn test_enhance_page() {
    let config = Config::default();
    let missing = config.i18n.missing_config.clone();
    let html = enhance(PAGE, "https://example.com/", config).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("<span bb-current-year></span>"));
    assert!(html.contains(&format!("<p class=\"bb-error\" role=\"alert\">{missing}</p>")));
}

#[test]
fn test_custom_prefix_ignores_default_namespace() {
    let mut config = Config::default();
    config.prefix = "acme".to_string();
    let html = enhance(r#"<span id="a" bb-current-year></span><span id="b" acme-current-year></span>"#, "about:blank", config)
        .unwrap();

    assert!(html.contains(r#"<span id="a" bb-current-year></span>"#));
    assert!(!html.contains(r#"<span id="b" acme-current-year></span>"#));
}

#[test]
fn test_run_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("out.html");
    let config = dir.path().join("bb.toml");
    fs::write(&input, PAGE).unwrap();
    fs::write(&config, "[i18n]\nmissing_config = \"Feed offline\"\n").unwrap();

    let options = Options {
        input: input.clone(),
        output: Some(output.clone()),
        config: Some(config),
        ..Options::default()
    };
    bb_contents::run(&options).unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Feed offline"));
}

#[test]
fn test_command_line_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bb.toml");
    fs::write(&config, "prefix = \"acme-\"\n[video_feed]\nendpoint = \"https://a.example/feed\"\n").unwrap();

    let options = Options {
        config: Some(config),
        prefix: Some("bb-".to_string()),
        endpoint: Some("https://b.example/feed".to_string()),
        debug: true,
        ..Options::default()
    };
    let config = options.load_config().unwrap();
    assert_eq!(config.prefix, "bb-");
    assert_eq!(config.video_feed.endpoint.as_deref(), Some("https://b.example/feed"));
    assert!(config.debug);
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options {
        input: dir.path().join("absent.html"),
        ..Options::default()
    };
    let err = bb_contents::run(&options).unwrap_err();
    assert!(format!("{err:#}").contains("absent.html"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bb.toml");
    fs::write(&config, "timing = 3").unwrap();
    let options = Options {
        config: Some(config),
        ..Options::default()
    };
    assert!(options.load_config().is_err());
}
