// tests/manifest_loading.rs

use std::io::Write;

use tempfile::NamedTempFile;

use assetdag::config::load_and_validate;
use assetdag::errors::AssetdagError;
use assetdag::tasks::Kind;

fn manifest(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_manifest_loads_with_aliases() {
    let file = manifest(
        r#"
[config]
dest = "web"
name = "site"
compress = true
use_hash = true

[config.style]
compiler = "lessc -"

[[step]]
kind = "files"
src = "assets/img/**/*.png"
dest = "web/img/"

[[step]]
kind = "less"
src = ["assets/less/app.less"]
dest = "web/css/app.css"
config = { banner = "/* app */" }

[[step]]
kind = "js"
src = "assets/js/*.js"

[[step]]
kind = "callback"
cmd = "echo done"
watch = ["src/**/*.rs"]
"#,
    );

    let m = load_and_validate(file.path()).unwrap();
    let kinds: Vec<Kind> = m.steps().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![Kind::Files, Kind::Style, Kind::Script, Kind::Callback]);

    let s = m.settings();
    assert_eq!(s.dest(), "web");
    assert_eq!(s.name(), "site");
    assert_eq!(s.compress(), Some(true));
    assert_eq!(s.watch(), None);
    assert!(s.use_hash());
    assert_eq!(
        s.kind_defaults(Kind::Style).get("compiler").and_then(|v| v.as_str()),
        Some("lessc -")
    );

    let style = &m.steps()[1];
    assert_eq!(
        style.config.as_ref().and_then(|c| c.get("banner")).and_then(|v| v.as_str()),
        Some("/* app */")
    );
}

#[test]
fn empty_manifest_is_rejected() {
    let file = manifest("[config]\ndest = \"public\"\n");
    match load_and_validate(file.path()) {
        Err(AssetdagError::ConfigError(msg)) => assert!(msg.contains("[[step]]")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn style_step_without_src_is_rejected() {
    let file = manifest("[[step]]\nkind = \"style\"\ndest = \"public/app.css\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetdagError::ConfigError(_))
    ));
}

#[test]
fn task_step_without_cmd_is_rejected() {
    let file = manifest("[[step]]\nkind = \"task\"\nwatch = [\"src/*\"]\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetdagError::ConfigError(_))
    ));
}

#[test]
fn unknown_kind_is_a_toml_error() {
    let file = manifest("[[step]]\nkind = \"sass\"\nsrc = \"a.scss\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetdagError::TomlError(_))
    ));
}
