//! End-to-end pipeline tests: source file in, diagnostics and fixes out.

use std::fs;

use cclint_diagnostics::{Fixer, Severity};
use cclint_engine::{AnalysisEngine, Config};
use cclint_output::{OutputFormat, format_to_string};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn full_pipeline_reports_multiple_rules() {
    let dir = tempfile::tempdir().unwrap();
    let long_line = format!("int some_value = 1; // {}", "x".repeat(80));
    let source = format!("class bad_name {{\npublic:\n    void Method();\n}};\n{long_line}\n");
    let path = write_file(&dir, "messy.hpp", &source);

    let engine = AnalysisEngine::new(Config::default());
    let result = engine.analyze_file(&path);

    let rules: Vec<&str> = result.diagnostics.iter().map(|d| d.rule_name.as_str()).collect();
    assert!(rules.contains(&"header-guard"), "{rules:?}");
    assert!(rules.contains(&"naming-convention"), "{rules:?}");
    assert!(rules.contains(&"max-line-length"), "{rules:?}");

    // Per-rule stats were collected for every enabled rule
    assert_eq!(result.rule_stats.len(), engine.registry().enabled().count());
    assert!(result.rule_stats.iter().all(|s| !s.failed));
}

#[test]
fn preprocessor_conditionals_hide_inactive_branches_from_rules() {
    let dir = tempfile::tempdir().unwrap();
    let source = "#if 0\nclass bad_in_dead_code {};\n#endif\nclass Good {};\n";
    let path = write_file(&dir, "cond.cpp", source);

    let engine = AnalysisEngine::new(Config::default());
    let result = engine.analyze_file(&path);

    assert!(
        !result.diagnostics.iter().any(|d| d.message.contains("bad_in_dead_code")),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn applying_header_guard_fix_then_reanalyzing_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "fixme.hpp", "int value;\n");

    let engine = AnalysisEngine::new(Config::default());
    let result = engine.analyze_file(&path);
    assert!(result.diagnostics.iter().any(|d| d.rule_name == "header-guard"));

    let fixer = Fixer::new(false);
    let mut outcome = fixer.apply(&result.diagnostics);
    assert_eq!(fixer.write(&mut outcome), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "#pragma once\nint value;\n");

    // Re-analysis of the fixed file produces no further guard findings, so
    // re-applying fixes is a no-op.
    let engine2 = AnalysisEngine::new(Config::default());
    let result2 = engine2.analyze_file(&path);
    assert!(!result2.diagnostics.iter().any(|d| d.rule_name == "header-guard"));
    let outcome2 = Fixer::new(false).apply(&result2.diagnostics);
    assert!(outcome2.fixed.is_empty());
}

#[test]
fn text_output_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "plain.hpp", "int value;\n");

    let engine = AnalysisEngine::new(Config::default());
    engine.analyze_file(&path);

    let text = format_to_string(OutputFormat::Text, &engine.all_diagnostics());
    assert!(text.contains("warning [header-guard]"));
    assert!(text.contains("warning(s)"));
}

#[test]
fn json_output_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "plain.hpp", "int value;\n");

    let config: Config = serde_json::from_str(
        r#"{"rules": [{"name": "header-guard", "severity": "error"}]}"#,
    )
    .unwrap();
    let engine = AnalysisEngine::new(config);
    engine.analyze_file(&path);

    let rendered = format_to_string(OutputFormat::Json, &engine.all_diagnostics());
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["summary"]["errors"], 1);
    assert_eq!(value["diagnostics"][0]["rule"], "header-guard");
    assert_eq!(value["diagnostics"][0]["severity"], "error");

    assert!(engine.all_diagnostics().iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn macro_heavy_source_survives_linter_mode() {
    let dir = tempfile::tempdir().unwrap();
    let source = "\
#pragma once
#define WIDGET_API
#define DECLARE(name) int name
WIDGET_API DECLARE(counter);
#ifdef NEVER_SET
int hidden;
#endif
";
    let path = write_file(&dir, "macros.hpp", source);

    let engine = AnalysisEngine::new(Config::default());
    let result = engine.analyze_file(&path);

    // No front-end failures: the directives stay inert and the conditional
    // stack balances.
    assert!(
        !result.diagnostics.iter().any(|d| d.rule_name == "preprocessor"),
        "{:?}",
        result.diagnostics
    );
    assert!(result.success);
}
