use super::check_cmd::{check_file, load_unit, render, summarize, CheckCounts};
use super::explain_cmd::explanation;
use super::*;
use crate::config::AnalyzerConfig;
use crate::error::LumenError;
use crate::typechecker::analyze;
use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;

const RETURN_MISMATCH: &str = r#"{
  "decls": [
    {
      "type": "Function",
      "name": "f",
      "return_type": { "type": "Named", "name": "Int" },
      "body": {
        "expr": { "kind": "Literal", "value": { "String": "s" }, "span": { "line": 2, "col": 5 } }
      }
    }
  ]
}"#;

fn write_unit(dir: &tempfile::TempDir, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_unit_names_unit_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "shapes.json", RETURN_MISMATCH);
    let unit = load_unit(&path).unwrap();
    assert_eq!(unit.name, "shapes");
    assert_eq!(unit.decls.len(), 1);
}

#[test]
fn test_load_unit_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_unit(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, LumenError::Io { .. }));

    let path = write_unit(&dir, "bad.json", "{ \"decls\": 3 }");
    let bad = load_unit(&path).unwrap_err();
    assert!(matches!(bad, LumenError::Ast { .. }));
}

#[test]
fn test_check_file_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "main.json", RETURN_MISMATCH);
    let counts = check_file(&path, &AnalyzerConfig::default(), true).unwrap();
    assert_eq!(counts, CheckCounts { errors: 1, warnings: 0 });
}

#[test]
fn test_render_human_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "main.json", RETURN_MISMATCH);
    let analysis = analyze(&load_unit(&path).unwrap(), &AnalyzerConfig::default());

    let rendered = render(Path::new("main.json"), &analysis.diagnostics, false);
    insta::assert_snapshot!(rendered.trim_end(), @r"
    ==> main.json
    error[TC030]: `f` declares return type `Int` but returns `String`
      --> 2:5
    ");
}

#[test]
fn test_render_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "main.json", RETURN_MISMATCH);
    let analysis = analyze(&load_unit(&path).unwrap(), &AnalyzerConfig::default());
    let rendered = render(Path::new("main.json"), &analysis.diagnostics, true);

    let value: serde_json::Value = serde_json::from_str(rendered.lines().next().unwrap()).unwrap();
    assert_eq!(value["code"], "TC030");
    assert_eq!(value["severity"], "error");
    assert_eq!(value["span"]["line"], 2);
}

#[test]
fn test_summary_lines() {
    let clean = summarize(2, CheckCounts::default(), false);
    assert_eq!(clean, ("Checked 2 file(s), no errors found".to_string(), false));

    let warned = CheckCounts { errors: 0, warnings: 3 };
    assert_eq!(
        summarize(1, warned, false),
        ("Checked 1 file(s), no errors (3 warning(s))".to_string(), false)
    );
    assert_eq!(
        summarize(1, warned, true),
        (
            "Checked 1 file(s), found 3 warning(s) [treated as errors with --strict]".to_string(),
            true
        )
    );

    let failed = summarize(1, CheckCounts { errors: 1, warnings: 1 }, false);
    assert_eq!(failed.0, "Checked 1 file(s), found 1 error(s), 1 warning(s)");
    assert!(failed.1);
}

#[test]
fn test_explanation_lookup() {
    let text = explanation("tc010").unwrap();
    assert!(text.starts_with("TC010: "), "{text}");
    assert!(matches!(explanation("ZZ999"), Err(LumenError::UnknownCode(code)) if code == "ZZ999"));
}

#[test]
fn test_cli_parses_check_flags() {
    let cli = Cli::try_parse_from([
        "lumen",
        "--log-level",
        "debug",
        "check",
        "a.json",
        "b.json",
        "--json",
        "--strict",
        "--config",
        "lumen.toml",
    ])
    .unwrap();
    assert_eq!(cli.log_level, Some(LogLevel::Debug));
    match cli.command {
        Command::Check {
            files,
            json,
            strict,
            config,
        } => {
            assert_eq!(files.len(), 2);
            assert!(json && strict);
            assert_eq!(config.as_deref(), Some(Path::new("lumen.toml")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_cli_requires_files_for_check() {
    assert!(Cli::try_parse_from(["lumen", "check"]).is_err());
    let cli = Cli::try_parse_from(["lumen", "explain", "EXH002", "--log-format", "json"]).unwrap();
    assert_eq!(cli.log_format, Some(LogFormat::Json));
}
