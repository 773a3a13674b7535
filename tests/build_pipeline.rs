// tests/build_pipeline.rs

use std::fs;
use std::path::Path;

use tokensmith::config::{ConfigFormat, TransformGroup};
use tokensmith::engine::OutputStatus;
use tokensmith::formats::FormatRegistry;
use tokensmith::{BuildConfig, BuildMode, BuildPipeline, ErrorType};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn seed_tokens(root: &Path) {
    write(
        root,
        "tokens/colors.json",
        r##"{
  "colors": {
    "primary": {
      "700": {"$value": "#ff0000", "$type": "color", "$description": "Brand red"}
    },
    "semantic": {
      "brand": {"$value": "{primary.700}", "$type": "color"}
    }
  }
}"##,
    );
    write(
        root,
        "tokens/spacing/scale.json",
        r#"{"spacing": {"$type": "dimension", "md": {"$value": "8px"}}}"#,
    );
    write(root, "tokens/README.md", "not a token file");
}

#[test]
fn default_config_builds_every_platform() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path());

    let formats = FormatRegistry::standard();
    let report = BuildPipeline::new(&formats)
        .run(&BuildConfig::default_config(), dir.path())
        .unwrap();

    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.token_count, 3);
    assert_eq!(report.outputs.len(), 3);
    assert!(report
        .outputs
        .iter()
        .all(|o| o.status == OutputStatus::Written));

    let dist = dir.path().join("dist");
    let css = fs::read_to_string(dist.join("tokens.css")).unwrap();
    assert!(css.starts_with("/**\n * Do not edit directly, this file was auto-generated."));
    assert!(css.contains("  --colors-primary-700: #ff0000; /* Brand red */\n"));
    assert!(css.contains("  --colors-semantic-brand: var(--colors-primary-700);\n"));
    assert!(css.contains("  --spacing-md: 8px;\n"));

    let js = fs::read_to_string(dist.join("tokens.js")).unwrap();
    assert!(js.contains("export const ColorsSemanticBrand = \"#ff0000\";\n"));
    assert!(js.contains("export const SpacingMd = \"8px\";\n"));

    let flat: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dist.join("tokens.flat.json")).unwrap()).unwrap();
    assert_eq!(
        flat,
        serde_json::json!({
            "colors.primary.700": "#ff0000",
            "colors.semantic.brand": "#ff0000",
            "spacing.md": "8px"
        })
    );
}

#[test]
fn check_mode_detects_drift_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path());
    let config = BuildConfig::default_config();
    let formats = FormatRegistry::standard();

    BuildPipeline::new(&formats).run(&config, dir.path()).unwrap();
    let before = fs::read_to_string(dir.path().join("dist/tokens.css")).unwrap();

    write(
        dir.path(),
        "tokens/spacing/scale.json",
        r#"{"spacing": {"md": {"$value": "12px"}}}"#,
    );
    let report = BuildPipeline::new(&formats)
        .with_mode(BuildMode::Check)
        .run(&config, dir.path())
        .unwrap();

    assert!(!report.is_up_to_date());
    assert_eq!(report.out_of_date().count(), 3);
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/tokens.css")).unwrap(),
        before
    );
}

#[test]
fn parse_failure_aborts_the_build_and_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path());
    write(dir.path(), "tokens/broken.json", "{\"colors\": {\"red\": ");

    let formats = FormatRegistry::standard();
    let err = BuildPipeline::new(&formats)
        .run(&BuildConfig::default_config(), dir.path())
        .unwrap_err();

    assert_eq!(err.error_type(), ErrorType::Parse);
    assert!(err.source_name().unwrap().ends_with("broken.json"));
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn dangling_reference_is_a_reference_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tokens/colors.json",
        r#"{"colors": {"brand": {"$value": "{primary.900}"}}}"#,
    );

    let formats = FormatRegistry::standard();
    let err = BuildPipeline::new(&formats)
        .run(&BuildConfig::default_config(), dir.path())
        .unwrap_err();

    assert_eq!(err.error_type(), ErrorType::Reference);
    assert!(err.message().contains("colors.primary.900"));
}

#[test]
fn yaml_config_with_custom_platform() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path());
    let config = BuildConfig::from_str_with_format(
        r#"
source:
  - tokens/colors.json
platforms:
  web:
    transformGroup: css
    buildPath: out/
    files:
      - destination: vars.css
        format: css/variables
        options:
          fileHeader: false
parser:
  qualifyReferences: true
"#,
        ConfigFormat::Yaml,
    )
    .unwrap();
    assert_eq!(config.platforms["web"].transform_group, TransformGroup::Css);

    let formats = FormatRegistry::standard();
    BuildPipeline::new(&formats).run(&config, dir.path()).unwrap();

    let css = fs::read_to_string(dir.path().join("out/vars.css")).unwrap();
    assert_eq!(
        css,
        ":root {\n  --colors-primary-700: #ff0000; /* Brand red */\n  --colors-semantic-brand: #ff0000;\n}\n"
    );
}

#[test]
fn unknown_format_is_rejected_before_building() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path());
    let mut config = BuildConfig::default_config();
    config.platforms.get_mut("css").unwrap().files[0].format = "scss/variables".to_string();

    let formats = FormatRegistry::standard();
    let err = BuildPipeline::new(&formats)
        .run(&config, dir.path())
        .unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Config);
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn dotted_keys_colliding_across_files_fail_the_build() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "tokens/a.json", r#"{"spacing.md": {"$value": "8px"}}"#);
    write(dir.path(), "tokens/b.json", r#"{"spacing": {"md": {"$value": "12px"}}}"#);

    let formats = FormatRegistry::standard();
    let err = BuildPipeline::new(&formats)
        .run(&BuildConfig::default_config(), dir.path())
        .unwrap_err();

    assert_eq!(err.error_type(), ErrorType::Reference);
    assert!(err.message().contains("spacing.md"));
    assert!(!dir.path().join("dist").exists());
}
