use std::fs;

use cclint_preprocessor::{PreprocessError, Preprocessor};
use cclint_token::TokenKind;

fn texts(tokens: &[cclint_token::Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.text.to_string())
        .collect()
}

#[test]
fn quoted_include_resolves_relative_to_current_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("header.hpp"), "int from_header;\n").unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"header.hpp\"\nint from_main;\n").unwrap();

    let source = fs::read_to_string(&main).unwrap();
    let mut pp = Preprocessor::new(source, main.display().to_string());
    pp.set_expand_includes(true);
    let tokens = pp.preprocess();

    assert_eq!(
        texts(&tokens),
        ["int", "from_header", ";", "int", "from_main", ";"]
    );
    assert!(!pp.has_errors());
}

#[test]
fn quoted_include_falls_back_to_include_paths() {
    let dir = tempfile::tempdir().unwrap();
    let inc = dir.path().join("include");
    fs::create_dir(&inc).unwrap();
    fs::write(inc.join("lib.hpp"), "int lib_symbol;\n").unwrap();

    let mut pp = Preprocessor::new("#include \"lib.hpp\"\n", "main.cpp");
    pp.set_expand_includes(true);
    pp.add_include_path(&inc);
    let tokens = pp.preprocess();

    assert_eq!(texts(&tokens), ["int", "lib_symbol", ";"]);
}

#[test]
fn repeated_include_is_spliced_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("once.hpp"), "int once_symbol;\n").unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"once.hpp\"\n#include \"once.hpp\"\n").unwrap();

    let source = fs::read_to_string(&main).unwrap();
    let mut pp = Preprocessor::new(source, main.display().to_string());
    pp.set_expand_includes(true);
    let tokens = pp.preprocess();

    let count = tokens.iter().filter(|t| &*t.text == "once_symbol").count();
    assert_eq!(count, 1);
}

#[test]
fn missing_include_is_a_warning_not_fatal() {
    let mut pp = Preprocessor::new("#include \"no_such_file.hpp\"\nint x;\n", "main.cpp");
    pp.set_expand_includes(true);
    let tokens = pp.preprocess();

    assert_eq!(texts(&tokens), ["int", "x", ";"]);
    assert!(matches!(pp.errors()[0], PreprocessError::IncludeNotFound { .. }));
    assert!(pp.errors()[0].is_warning());
    assert!(!pp.has_errors());
}

#[test]
fn system_include_skipped_by_default() {
    let mut pp = Preprocessor::new("#include <vector>\nint x;\n", "main.cpp");
    pp.set_expand_includes(true);
    let tokens = pp.preprocess();

    // No splice, no error: system headers are out of scope unless enabled
    assert_eq!(texts(&tokens), ["int", "x", ";"]);
    assert!(pp.errors().is_empty());
}

#[test]
fn macros_defined_in_include_are_visible() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("defs.hpp"), "#define WIDTH 42\n").unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"defs.hpp\"\nint w = WIDTH;\n").unwrap();

    let source = fs::read_to_string(&main).unwrap();
    let mut pp = Preprocessor::new(source, main.display().to_string());
    pp.set_expand_includes(true);
    pp.set_expand_macros(true);
    let tokens = pp.preprocess();

    assert_eq!(texts(&tokens), ["int", "w", "=", "42", ";"]);
}

#[test]
fn include_guard_pattern_preprocesses_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("guarded.hpp"),
        "#ifndef GUARDED_HPP\n#define GUARDED_HPP\nint guarded;\n#endif\n",
    )
    .unwrap();
    let main = dir.path().join("main.cpp");
    fs::write(&main, "#include \"guarded.hpp\"\nint after;\n").unwrap();

    let source = fs::read_to_string(&main).unwrap();
    let mut pp = Preprocessor::new(source, main.display().to_string());
    pp.set_expand_includes(true);
    pp.set_expand_macros(true);
    let tokens = pp.preprocess();

    assert_eq!(texts(&tokens), ["int", "guarded", ";", "int", "after", ";"]);
    assert_eq!(pp.conditional_depth(), 0);
}
