//! End-to-end pipeline tests over a real temporary project directory,
//! with scripted oracles and fixer so nothing leaves the process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tf_pipeline::testing::{FakeProfile, ScriptedFixer, ScriptedOracle};
use tf_pipeline::{Pipeline, PipelineError, RepairConfig};

const TWO_FUNCTIONS: &str = r#"
export function hello(): string { return "hello" }

export const world = (): string => { return "world" }
"#;

fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn list_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn both_functions_passing_produces_two_blocks_and_no_leftovers() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(project.path(), "greetings.ts", TWO_FUNCTIONS);

    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::passing("verifier")),
        Arc::new(ScriptedOracle::passing("executor")),
    );
    let fixer = ScriptedFixer::new();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let report = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap();

    assert_eq!(report.generated, vec!["hello", "world"]);
    assert!(report.skipped.is_empty());
    assert!(report.test_file_written);

    let test_file = project.path().join("greetings.test.ts");
    let contents = fs::read_to_string(&test_file).unwrap();
    assert_eq!(
        contents,
        "// generated test for hello\n\n// generated test for world\n"
    );

    // Each oracle saw each function exactly once, and no candidate files
    // remain next to the final test file.
    assert_eq!(profile.verifier.calls.load(Ordering::SeqCst), 2);
    assert_eq!(profile.executor.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        list_file_names(project.path()),
        vec!["greetings.test.ts".to_string(), "greetings.ts".to_string()]
    );
}

#[tokio::test]
async fn static_exhaustion_skips_the_function_and_keeps_the_candidate() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(
        project.path(),
        "stubborn.ts",
        r#"export const broken = () => { return 1 }"#,
    );

    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::failing("verifier", "error: will not fix")),
        Arc::new(ScriptedOracle::passing("executor")),
    );
    let fixer = ScriptedFixer::new();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let report = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap();

    assert!(report.generated.is_empty());
    assert!(!report.test_file_written);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "broken");
    assert!(report.skipped[0]
        .reason
        .to_string()
        .contains("static-repair exhausted after 5 attempts"));

    // No final test file; the exhausted candidate stays on disk.
    assert!(!project.path().join("stubborn.test.ts").exists());
    let candidate = report.skipped[0].candidate_path.as_ref().unwrap();
    assert!(candidate.exists());

    // The verifier ran its full budget; the executor never ran.
    assert_eq!(profile.verifier.calls.load(Ordering::SeqCst), 5);
    assert_eq!(profile.executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn one_failing_function_does_not_block_its_sibling() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(project.path(), "mixed.ts", TWO_FUNCTIONS);

    // First function's verification fails forever; the pass streak
    // afterwards belongs to the second function.
    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::failing_then_passing(
            "verifier",
            "error: type mismatch",
            5,
        )),
        Arc::new(ScriptedOracle::passing("executor")),
    );
    let fixer = ScriptedFixer::new();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let report = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap();

    assert_eq!(report.generated, vec!["world"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "hello");
    assert!(report.test_file_written);

    let contents = fs::read_to_string(project.path().join("mixed.test.ts")).unwrap();
    assert!(contents.contains("// generated test for world"));
    assert!(!contents.contains("hello"));
}

#[tokio::test]
async fn execution_failures_are_repaired_within_budget() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(
        project.path(),
        "flaky.ts",
        r#"export const wobbly = () => { return 2 }"#,
    );

    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::passing("verifier")),
        Arc::new(ScriptedOracle::failing_then_passing(
            "executor",
            "expected 2, got 3",
            2,
        )),
    );
    let fixer = ScriptedFixer::new();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let report = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap();

    assert_eq!(report.generated, vec!["wobbly"]);
    assert_eq!(fixer.fix_failures_calls.load(Ordering::SeqCst), 2);

    let contents = fs::read_to_string(project.path().join("flaky.test.ts")).unwrap();
    assert_eq!(
        contents,
        "// generated test for wobbly // fix 1 // fix 2\n"
    );
}

#[tokio::test]
async fn a_file_with_no_functions_fails_the_whole_file() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(project.path(), "constants.ts", "const limit = 42\n");

    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::passing("verifier")),
        Arc::new(ScriptedOracle::passing("executor")),
    );
    let fixer = ScriptedFixer::new();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let err = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoFunctionsFound { .. }));
    assert_eq!(profile.verifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generation_failure_skips_only_the_affected_function() {
    let project = tempfile::tempdir().unwrap();
    let source = write_source(
        project.path(),
        "unlucky.ts",
        r#"export const alone = () => { return 1 }"#,
    );

    let profile = FakeProfile::new(
        Arc::new(ScriptedOracle::passing("verifier")),
        Arc::new(ScriptedOracle::passing("executor")),
    );
    let fixer = ScriptedFixer::erroring();
    let pipeline = Pipeline::new(&profile, &fixer, &[], &[], RepairConfig::default());

    let report = pipeline
        .generate_for_file(project.path(), &source)
        .await
        .unwrap();

    assert!(report.generated.is_empty());
    assert!(!report.test_file_written);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        report.skipped[0].reason,
        tf_pipeline::SkipReason::GenerationFailed(_)
    ));
    // No candidate was ever written for a generation failure.
    assert!(report.skipped[0].candidate_path.is_none());
}
