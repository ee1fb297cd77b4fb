//! Prompt construction and response cleanup.
//!
//! Prompt bodies carry their inputs as named, XML-tagged sections so the
//! model can tell source, example, and context apart without guessing.

use std::fmt::Write as _;

use tf_core::{ContextFile, CorrectionAttempt, GenerateParams, RepairParams, TestExample};

/// Prompt for the initial generation of one function's test.
pub fn generation_prompt(params: &GenerateParams<'_>) -> String {
    let mut sections = String::new();
    push_tag(&mut sections, "source_code", params.source_code);
    push_tag(&mut sections, "function", &params.function.source_text);
    if let Some(example) = params.example {
        push_tag(&mut sections, "example", &format_example(example));
    }
    push_tag(&mut sections, "language", params.language);
    push_tag(&mut sections, "test_runner", params.test_runner);
    if !params.context_files.is_empty() {
        push_tag(
            &mut sections,
            "context_files",
            &format_context_files(params.context_files),
        );
    }

    format!(
        r#"Generate a test for the function provided.
The test should:
	1. Follow the same/similar patterns as the example
	2. Focus on testing the core functionality and happy path. Don't waste time testing unlikely edge cases or invalid inputs
	3. You should basically never use mocks, except for external API calls
	4. Use the supplied language and test runner to write the test
	5. Include all necessary imports, the current working directory is {}

Return ONLY the test code, no explanations.

{sections}"#,
        params.test_path.display()
    )
}

/// Prompt for repairing code the static verifier rejected.
pub fn static_fix_prompt(params: &RepairParams<'_>) -> String {
    let errors = params.latest_diagnostics().join("\n");
    let context = format_context_files(params.context_files);

    format!(
        r#"Fix the type errors in this test code. The errors are:

{errors}

Here's the current test code:

{code}

Which are found in the directory:

{dir}

Here are the relevant context files:

{context}

Return ONLY the fixed test code, no explanations."#,
        code = params.test_code,
        dir = params.test_path.display(),
    )
}

/// Prompt for repairing code whose tests failed execution. Carries the
/// full attempt history of the phase so the model can see what has been
/// tried already.
pub fn execution_fix_prompt(params: &RepairParams<'_>) -> String {
    let mut sections = String::new();
    push_tag(&mut sections, "source_code", params.source_code);
    push_tag(&mut sections, "test_code", params.test_code);
    push_tag(&mut sections, "errors", &params.latest_diagnostics().join("\n"));
    if params.attempts.len() > 1 {
        push_tag(
            &mut sections,
            "previous_attempts",
            &format_attempts(params.attempts),
        );
    }
    if let Some(example) = params.example {
        push_tag(&mut sections, "example", &format_example(example));
    }
    push_tag(&mut sections, "language", params.language);
    push_tag(&mut sections, "test_runner", params.test_runner);
    if !params.context_files.is_empty() {
        push_tag(
            &mut sections,
            "context_files",
            &format_context_files(params.context_files),
        );
    }

    format!(
        r#"Fix the test failures in this code.

Here are some reminders:
- Use the conventions and types of the language you're writing the test in
- Use the provided context and examples to help you fix the failures

{sections}
Return ONLY the fixed test code, no explanations."#
    )
}

/// Prompt asking the model to choose the best example for a source file.
/// Only names, kinds, and descriptions are sent; example bodies would
/// drown the signal.
pub fn pick_example_prompt(source_code: &str, examples: &[TestExample]) -> String {
    let mut listing = String::new();
    for (index, example) in examples.iter().enumerate() {
        let _ = writeln!(
            listing,
            "{index}: {} ({}) - {}",
            example.name,
            example.kind.as_str(),
            example.description
        );
    }

    format!(
        r#"Given this source code:

{source_code}

And these test examples:

{listing}
Which test example would be the best match for testing this code? Consider:
1. The complexity and structure of the code
2. The testing patterns demonstrated in each example
3. The similarity between the example and what needs to be tested

Return a JSON object with the key "exampleIndex" and the value being the index number of the best matching example.
Do not include any other text or explanations in your response."#
    )
}

/// Strip a surrounding markdown code fence, if present, leaving bare code.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(newline) = rest.find('\n') {
            let body = rest[newline + 1..].trim_end();
            let body = body.strip_suffix("```").unwrap_or(body);
            return body.trim().to_string();
        }
    }
    text.trim().to_string()
}

fn push_tag(out: &mut String, tag: &str, body: &str) {
    let _ = writeln!(out, "<{tag}>\n{body}\n</{tag}>\n");
}

fn format_example(example: &TestExample) -> String {
    format!(
        "{} ({}): {}\n\n{}",
        example.name,
        example.kind.as_str(),
        example.description,
        example.content
    )
}

fn format_context_files(files: &[ContextFile]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(
            out,
            "=== {} ({}) ===\n{}\n",
            file.description, file.kind, file.content
        );
    }
    out
}

fn format_attempts(attempts: &[CorrectionAttempt]) -> String {
    let mut out = String::new();
    for (index, attempt) in attempts.iter().enumerate() {
        let _ = writeln!(
            out,
            "--- attempt {} ---\n{}\nerrors:\n{}\n",
            index + 1,
            attempt.code,
            attempt.diagnostics.join("\n")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tf_core::{FunctionSpan, TestKind};

    use super::*;

    fn example() -> TestExample {
        TestExample {
            name: "service unit test".to_string(),
            kind: TestKind::Unit,
            content: "it('works', () => {})".to_string(),
            description: "plain unit test".to_string(),
        }
    }

    #[test]
    fn generation_prompt_carries_function_and_example() {
        let function = FunctionSpan::new("greet", "function greet() { return 1 }", false);
        let example = example();
        let params = GenerateParams {
            source_code: "function greet() { return 1 }",
            function: &function,
            example: Some(&example),
            language: "typescript",
            test_runner: "jest",
            test_path: Path::new("/proj/src/greet.test.ts"),
            context_files: &[],
        };

        let prompt = generation_prompt(&params);

        assert!(prompt.contains("<function>"));
        assert!(prompt.contains("function greet()"));
        assert!(prompt.contains("it('works', () => {})"));
        assert!(prompt.contains("jest"));
        assert!(prompt.contains("Return ONLY the test code"));
    }

    #[test]
    fn static_fix_prompt_lists_latest_diagnostics() {
        let attempts = vec![CorrectionAttempt {
            code: "bad code".to_string(),
            diagnostics: vec!["TS2322: type mismatch".to_string()],
        }];
        let params = RepairParams {
            source_code: "source",
            test_code: "bad code",
            attempts: &attempts,
            example: None,
            language: "typescript",
            test_runner: "jest",
            test_path: Path::new("/proj/src/greet.test.ts"),
            context_files: &[],
        };

        let prompt = static_fix_prompt(&params);

        assert!(prompt.contains("TS2322"));
        assert!(prompt.contains("bad code"));
        assert!(prompt.contains("Return ONLY the fixed test code"));
    }

    #[test]
    fn execution_fix_prompt_includes_history_after_first_round() {
        let attempts = vec![
            CorrectionAttempt {
                code: "first try".to_string(),
                diagnostics: vec!["expected 2, got 3".to_string()],
            },
            CorrectionAttempt {
                code: "second try".to_string(),
                diagnostics: vec!["expected 2, got 4".to_string()],
            },
        ];
        let params = RepairParams {
            source_code: "source",
            test_code: "second try",
            attempts: &attempts,
            example: None,
            language: "typescript",
            test_runner: "jest",
            test_path: Path::new("/proj/src/greet.test.ts"),
            context_files: &[],
        };

        let prompt = execution_fix_prompt(&params);

        assert!(prompt.contains("<previous_attempts>"));
        assert!(prompt.contains("first try"));
        assert!(prompt.contains("expected 2, got 4"));
    }

    #[test]
    fn pick_example_prompt_lists_indices() {
        let examples = vec![example()];
        let prompt = pick_example_prompt("const x = 1", &examples);

        assert!(prompt.contains("0: service unit test (unit)"));
        assert!(prompt.contains("exampleIndex"));
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let response = "```typescript\nconst a = 1\n```";
        assert_eq!(strip_code_fences(response), "const a = 1");
    }

    #[test]
    fn strips_fence_with_trailing_newline() {
        let response = "```rust\nfn main() {}\n```\n";
        assert_eq!(strip_code_fences(response), "fn main() {}");
    }

    #[test]
    fn leaves_bare_code_alone() {
        assert_eq!(strip_code_fences("const a = 1"), "const a = 1");
    }
}
