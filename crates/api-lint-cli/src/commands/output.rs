//! Shared output formatting for lint results.

use anyhow::Result;
use api_lint_core::{LintResult, ProblemDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult<'_>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print!("{}", compact(result)),
    }
    Ok(())
}

fn print_text(result: &LintResult<'_>) {
    for (path, problem) in result.problems() {
        let span = problem.location.span;
        println!("{path}:{}:{}", span.start_line, span.start_column);
        let report = miette::Report::new(ProblemDiagnostic::from(problem));
        println!("{report:?}");
    }

    let summary_color = if result.has_problems() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} problem(s) in {} file(s)\x1b[0m",
        summary_color,
        result.problem_count(),
        result.files_checked()
    );
}

fn print_json(result: &LintResult<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn compact(result: &LintResult<'_>) -> String {
    result
        .problems()
        .map(|(path, problem)| format!("{path}:{problem}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_lint_core::{
        locations, EnumDescriptor, EnumValueDescriptor, FileDescriptor, Linter, Registry,
        SourceSpans, Span,
    };

    fn file() -> FileDescriptor {
        FileDescriptor {
            path: "states.proto".into(),
            enums: vec![EnumDescriptor {
                name: "State".into(),
                values: vec![EnumValueDescriptor {
                    name: "UNKNOWN".into(),
                    number: 0,
                    spans: SourceSpans::at(Span::line(4, 3, 15)),
                    ..EnumValueDescriptor::default()
                }],
                ..EnumDescriptor::default()
            }],
            ..FileDescriptor::default()
        }
    }

    #[test]
    fn compact_is_one_line_per_problem() {
        let mut registry = Registry::new();
        api_lint_rules::aip0126::add_rules(&mut registry).unwrap();
        let files = vec![file()];
        let result = Linter::builder(&registry)
            .parallelism(1)
            .build()
            .unwrap()
            .lint_files(&files);

        insta::assert_snapshot!(compact(&result), @r#"states.proto:4:3: [core::0126::unspecified] The first enum value should be "STATE_UNSPECIFIED""#);
    }

    #[test]
    fn json_carries_file_and_rule() {
        let mut registry = Registry::new();
        api_lint_rules::aip0126::add_rules(&mut registry).unwrap();
        let files = vec![file()];
        let result = Linter::new(&registry).lint_files(&files);

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        let problem = &json["responses"][0]["problems"][0];
        assert_eq!(json["responses"][0]["file_path"], "states.proto");
        assert_eq!(problem["rule_id"], "core::0126::unspecified");
        assert_eq!(problem["suggestion"], "STATE_UNSPECIFIED");
        assert_eq!(
            problem["location"]["span"],
            serde_json::to_value(locations::descriptor_name(&files[0].enums[0].values[0]).span)
                .unwrap()
        );
    }
}
