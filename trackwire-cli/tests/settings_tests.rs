use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use trackwire_cli::{parse_property, Settings};
use trackwire_types::PropertyValue;

const MINIMAL: &str = r#"
api_key = "k1"
plugin_name = "Acme"
plugin_file = "acme-plugin/acme-plugin.php"
plugin_version = "1.4.0"
"#;

// ── Loading ─────────────────────────────────────────────────────

#[test]
fn minimal_settings_use_defaults_relative_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trackwire.toml");
    fs::write(&path, MINIMAL).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.api_key, "k1");
    assert_eq!(settings.api_secret, "");
    assert_eq!(settings.database, dir.path().join("trackwire.db"));
    assert_eq!(settings.plugins_dir.as_deref(), Some(dir.path()));
    assert_eq!(settings.transport.endpoint, trackwire_transport::DEFAULT_ENDPOINT);
}

#[test]
fn transport_table_overrides_endpoint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trackwire.toml");
    fs::write(
        &path,
        format!("{MINIMAL}\n[transport]\nendpoint = \"http://localhost:8080/e\"\ntimeout_secs = 5\n"),
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.transport.endpoint, "http://localhost:8080/e");
    assert_eq!(settings.transport.timeout_secs, 5);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trackwire.toml");
    fs::write(&path, format!("{MINIMAL}\nretries = 3\n")).unwrap();
    assert!(Settings::load(&path).is_err());
}

#[test]
fn missing_file_error_names_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Settings::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn environment_wires_client_with_configured_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trackwire.toml");
    fs::write(&path, MINIMAL).unwrap();

    let settings = Settings::load(&path).unwrap();
    let env = settings.environment().unwrap();
    let client = trackwire::Client::new(
        &settings.api_key,
        &settings.api_secret,
        &settings.plugin_name,
        &settings.plugin_file,
        &env,
    )
    .unwrap();
    assert_eq!(client.plugin_version(), "1.4.0");
    assert!(dir.path().join("trackwire.db").exists());
}

// ── Property parsing ────────────────────────────────────────────

#[test]
fn property_values_are_typed() {
    assert_eq!(parse_property("count=3").unwrap(), ("count".into(), PropertyValue::Integer(3)));
    assert_eq!(parse_property("ratio=0.5").unwrap(), ("ratio".into(), PropertyValue::Float(0.5)));
    assert_eq!(parse_property("ok=true").unwrap(), ("ok".into(), PropertyValue::Bool(true)));
    assert_eq!(
        parse_property("name=Acme Feed").unwrap(),
        ("name".into(), PropertyValue::String("Acme Feed".into()))
    );
    assert_eq!(
        parse_property("v=inf").unwrap(),
        ("v".into(), PropertyValue::String("inf".into()))
    );
}

#[test]
fn property_value_may_contain_equals() {
    assert_eq!(
        parse_property("q=a=b").unwrap(),
        ("q".into(), PropertyValue::String("a=b".into()))
    );
}

#[test]
fn malformed_properties_are_rejected() {
    assert!(parse_property("novalue").is_err());
    assert!(parse_property("=3").is_err());
}
