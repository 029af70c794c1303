//! Analysis engine: drives the full pipeline over files.
//!
//! For each file: read, lex + preprocess (linter mode), parse, then run the
//! enabled rules over the text, token, and AST channels. Front-end problems
//! (lexical, preprocessor, syntax) are surfaced as diagnostics alongside
//! rule findings; per-file results and running counters are aggregated
//! behind a mutex so an external worker pool can call
//! [`AnalysisEngine::analyze_file`] for distinct paths concurrently.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cclint_diagnostics::{Diagnostic, DiagnosticEngine, Location, Severity};
use cclint_parser::Parser;
use cclint_preprocessor::Preprocessor;
use cclint_rules::{RuleExecutionStats, RuleExecutor, RuleRegistry};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

mod cache;
mod config;

pub use cache::{FileCache, content_hash};
pub use config::{Config, RuleConfig};

/// Outcome of analyzing one file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: String,
    pub success: bool,
    pub error_message: String,
    pub skipped: bool,
    pub from_cache: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub rule_stats: Vec<RuleExecutionStats>,
    pub duration: Duration,
}

impl FileResult {
    fn empty(path: &str) -> Self {
        FileResult {
            path: path.to_string(),
            success: true,
            error_message: String::new(),
            skipped: false,
            from_cache: false,
            diagnostics: Vec::new(),
            rule_stats: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }
}

/// Aggregate counters across one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub total_files: usize,
    pub analyzed_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    pub cached_files: usize,
    /// `max_errors` was reached and scheduling stopped early
    pub stopped_early: bool,
}

#[derive(Default)]
struct Shared {
    results: Vec<FileResult>,
    stats: EngineStats,
    error_count: usize,
}

/// The analysis engine. Construct once per run; the rule registry is
/// populated and configured at construction and read-only afterwards.
pub struct AnalysisEngine {
    config: Config,
    registry: RuleRegistry,
    executor: RuleExecutor,
    cache: Option<FileCache>,
    shared: Mutex<Shared>,
}

impl AnalysisEngine {
    pub fn new(config: Config) -> Self {
        let mut registry = RuleRegistry::with_builtins();
        for rule_config in &config.rules {
            // Unknown names are logged by the registry; the external loader
            // is responsible for rejecting them up front
            registry.configure(
                &rule_config.name,
                rule_config.enabled,
                rule_config.severity,
                &rule_config.parameters,
            );
        }

        let executor = RuleExecutor::new(Duration::from_millis(config.rule_timeout_ms));
        let cache = if config.enable_cache {
            Some(FileCache::new(&config.cache_directory))
        } else {
            None
        };

        AnalysisEngine { config, registry, executor, cache, shared: Mutex::new(Shared::default()) }
    }

    /// Engine with an externally assembled registry (custom rules).
    pub fn with_registry(config: Config, registry: RuleRegistry) -> Self {
        let executor = RuleExecutor::new(Duration::from_millis(config.rule_timeout_ms));
        let cache = if config.enable_cache {
            Some(FileCache::new(&config.cache_directory))
        } else {
            None
        };
        AnalysisEngine { config, registry, executor, cache, shared: Mutex::new(Shared::default()) }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Analyze one file end to end. Safe to call from multiple threads for
    /// distinct paths; I/O happens outside the shared lock.
    pub fn analyze_file(&self, path: &str) -> FileResult {
        let started = Instant::now();
        let mut result = FileResult::empty(path);

        if !self.config.should_analyze(path) {
            debug!(path, "skipping file (pattern filters)");
            result.skipped = true;
            let mut shared = self.shared.lock();
            shared.stats.skipped_files += 1;
            return result;
        }

        info!(path, "analyzing file");
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!(path, %err, "failed to read source");
                result.success = false;
                result.error_message = err.to_string();
                result.duration = started.elapsed();
                let mut shared = self.shared.lock();
                shared.stats.total_files += 1;
                shared.stats.failed_files += 1;
                self.record_result_locked(&mut shared, &result);
                return result;
            }
        };

        let hash = content_hash(&source);
        if let Some(cache) = &self.cache {
            if let Some(diagnostics) = cache.load(path, hash) {
                result.from_cache = true;
                result.diagnostics = diagnostics;
                result.duration = started.elapsed();
                let mut shared = self.shared.lock();
                shared.stats.total_files += 1;
                shared.stats.cached_files += 1;
                shared.stats.analyzed_files += 1;
                self.record_result_locked(&mut shared, &result);
                return result;
            }
        }

        let mut engine = DiagnosticEngine::new();
        let (tokens, root) = self.run_front_end(path, &source, &mut engine);

        result.rule_stats = self.executor.execute(
            &self.registry,
            path,
            &source,
            &tokens,
            &root,
            &mut engine,
        );
        result.diagnostics = engine.into_diagnostics();
        result.duration = started.elapsed();

        if let Some(cache) = &self.cache {
            cache.store(path, hash, &result.diagnostics);
        }

        let mut shared = self.shared.lock();
        shared.stats.total_files += 1;
        shared.stats.analyzed_files += 1;
        self.record_result_locked(&mut shared, &result);
        result
    }

    /// Analyze files in order, stopping early once `max_errors` is reached.
    /// In-flight results are retained; the early stop is recorded in the
    /// stats.
    pub fn analyze_files(&self, paths: &[String]) -> Vec<FileResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            if self.should_stop_early() {
                warn!(max_errors = self.config.max_errors, "stopping analysis early");
                self.shared.lock().stats.stopped_early = true;
                break;
            }
            results.push(self.analyze_file(path));
        }
        results
    }

    fn should_stop_early(&self) -> bool {
        if self.config.max_errors == 0 {
            return false;
        }
        self.shared.lock().error_count >= self.config.max_errors
    }

    /// Lex, preprocess (linter mode plus configured defines and include
    /// paths), and parse; front-end problems become diagnostics.
    fn run_front_end(
        &self,
        path: &str,
        source: &str,
        engine: &mut DiagnosticEngine,
    ) -> (Vec<cclint_token::Token>, cclint_ast::Node) {
        let file: Arc<str> = Arc::from(path);

        let mut preprocessor = Preprocessor::new(source, Arc::clone(&file));
        for define in &self.config.defines {
            preprocessor.define_macro(define);
        }
        for name in &self.config.undefines {
            preprocessor.undefine_macro(name);
        }
        for include_path in &self.config.include_paths {
            preprocessor.add_include_path(include_path);
        }
        let tokens = preprocessor.preprocess();

        for err in preprocessor.lex_errors() {
            let location = Location::from(err.pos());
            engine.report(Diagnostic::new(
                Severity::Error,
                "lexer",
                strip_location_prefix(&err.to_string(), &location),
                location,
            ));
        }
        for err in preprocessor.errors() {
            let severity = if err.is_warning() { Severity::Warning } else { Severity::Error };
            let location = err
                .pos()
                .map(Location::from)
                .or_else(|| err.opening_site().map(|(f, l)| Location::new(f, l, 1)))
                .unwrap_or_else(|| Location::new(path, 1, 1));
            engine.report(Diagnostic::new(
                severity,
                "preprocessor",
                strip_location_prefix(&err.to_string(), &location),
                location,
            ));
        }

        let output = Parser::from_tokens(tokens.clone(), Arc::clone(&file)).parse();
        for err in &output.errors {
            let location = Location::from(err.pos());
            engine.report(Diagnostic::new(
                Severity::Error,
                "parser",
                strip_location_prefix(&err.to_string(), &location),
                location,
            ));
        }

        (tokens, output.root)
    }

    fn record_result_locked(&self, shared: &mut Shared, result: &FileResult) {
        shared.error_count += result.error_count();
        shared.results.push(result.clone());
    }

    pub fn stats(&self) -> EngineStats {
        self.shared.lock().stats.clone()
    }

    /// All diagnostics across analyzed files, in analysis order.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        self.shared
            .lock()
            .results
            .iter()
            .flat_map(|r| r.diagnostics.iter().cloned())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.shared.lock().error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Error displays embed their position; the diagnostic already carries it
/// structurally, so strip the textual prefix when it matches.
fn strip_location_prefix(message: &str, location: &Location) -> String {
    let prefix = format!("{location}: ");
    message.strip_prefix(&prefix).unwrap_or(message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_clean_file_yields_no_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "clean.cpp", "int main() { return 0; }\n");

        let engine = AnalysisEngine::new(Config::default());
        let result = engine.analyze_file(&path);

        assert!(result.success);
        assert!(!result.skipped);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(engine.stats().analyzed_files, 1);
    }

    #[test]
    fn test_unreadable_file_is_failed_not_fatal() {
        let engine = AnalysisEngine::new(Config::default());
        let result = engine.analyze_file("/nonexistent/cclint/missing.cpp");

        assert!(!result.success);
        assert!(!result.error_message.is_empty());
        assert_eq!(engine.stats().failed_files, 1);
    }

    #[test]
    fn test_pattern_filters_skip_files() {
        let config = Config {
            exclude_patterns: vec!["**/*.gen.cpp".to_string()],
            ..Config::default()
        };
        let engine = AnalysisEngine::new(config);
        let result = engine.analyze_file("src/types.gen.cpp");

        assert!(result.skipped);
        assert_eq!(engine.stats().skipped_files, 1);
        assert_eq!(engine.stats().analyzed_files, 0);
    }

    #[test]
    fn test_header_without_guard_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "foo.hpp", "int value;\n");

        let engine = AnalysisEngine::new(Config::default());
        let result = engine.analyze_file(&path);

        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.rule_name == "header-guard" && d.location.line == 1));
    }

    #[test]
    fn test_max_errors_stops_scheduling() {
        let dir = tempfile::tempdir().unwrap();
        // `class x` breaks the naming convention; severity raised to error
        let a = write_temp(&dir, "a.cpp", "class bad_one {};\n");
        let b = write_temp(&dir, "b.cpp", "class bad_two {};\n");
        let c = write_temp(&dir, "c.cpp", "class bad_three {};\n");

        let config: Config = serde_json::from_str(
            r#"{"max_errors": 1,
                "rules": [{"name": "naming-convention", "severity": "error"}]}"#,
        )
        .unwrap();
        let engine = AnalysisEngine::new(config);
        let results = engine.analyze_files(&[a, b, c]);

        assert!(results.len() < 3, "expected early stop, got {} results", results.len());
        assert!(engine.stats().stopped_early);
        assert!(engine.has_errors());
    }

    #[test]
    fn test_front_end_errors_become_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "broken.cpp", "#if 1\nint x = \"unterminated;\n");

        let engine = AnalysisEngine::new(Config::default());
        let result = engine.analyze_file(&path);

        let rules: Vec<&str> =
            result.diagnostics.iter().map(|d| d.rule_name.as_str()).collect();
        assert!(rules.contains(&"lexer"), "{rules:?}");
        assert!(rules.contains(&"preprocessor"), "{rules:?}");
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let path = write_temp(&dir, "foo.hpp", "int value;\n");

        let config = Config {
            enable_cache: true,
            cache_directory: cache_dir.display().to_string(),
            ..Config::default()
        };

        let engine = AnalysisEngine::new(config.clone());
        let first = engine.analyze_file(&path);
        assert!(!first.from_cache);
        assert!(!first.diagnostics.is_empty());

        let engine2 = AnalysisEngine::new(config);
        let second = engine2.analyze_file(&path);
        assert!(second.from_cache);
        assert_eq!(second.diagnostics.len(), first.diagnostics.len());
        assert_eq!(engine2.stats().cached_files, 1);
    }

    #[test]
    fn test_configured_rule_parameters_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "long.cpp", &format!("{}\n", "x".repeat(50)));

        let config: Config = serde_json::from_str(
            r#"{"rules": [{"name": "max-line-length",
                           "parameters": {"max_length": 40}}]}"#,
        )
        .unwrap();
        let engine = AnalysisEngine::new(config);
        let result = engine.analyze_file(&path);

        assert!(result.diagnostics.iter().any(|d| d.rule_name == "max-line-length"));
    }
}
