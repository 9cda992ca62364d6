use polygon_uploader::importers::domjudge::import;
use polygon_uploader_api::{FileType, MemoryProblem, SolutionTag};
use polygon_uploader_format::{ErrorRecoveryPolicy, UploadOptions};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use tempfile::TempDir;

mod common;
use common::*;

const STATEMENT: &str = r"\problemname{Guess the Number}
I am thinking of a number.
\begin{Input}
Nothing.
\end{Input}
\begin{Output}
Your guesses.
\end{Output}
";

#[test]
fn test_domjudge_interactive_package() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    write_files(
        tmpdir.path(),
        &[
            ("data/sample/1.in", "42\n"),
            ("data/sample/1.ans", "ok\n"),
            ("data/sample/1.interaction", ">50\n<lower\n>42\n<correct\n"),
            ("data/secret/01.in", "1\n"),
            ("data/secret/02.in", "1000\n"),
            ("data/secret/01.ans", "ok\n"),
            ("submissions/accepted/sol.cpp", "int main() {}\n"),
            ("submissions/accepted/Sol.java", "class Sol {}\n"),
            ("submissions/time_limit_exceeded/slow.cpp", "int main() {}\n"),
            ("submissions/unknown/what.cpp", "int main() {}\n"),
            ("problem_statement/problem.en.tex", STATEMENT),
            ("problem_statement/solution.tex", "Binary search.\n"),
            ("output_validators/interactor/interactor.cpp", "int main() {}\n"),
            (".timelimit", "2.5\n"),
            ("problem.yaml", "name: guess\nvalidation: custom interactive\n"),
        ],
    );

    let problem = MemoryProblem::new();
    let options = UploadOptions {
        recovery: ErrorRecoveryPolicy::Skip,
        ..Default::default()
    };
    let report = import(tmpdir.path(), &problem, options).unwrap();
    assert_eq!(report.uploaded, vec![1, 2, 3]);

    let state = problem.state();
    let tests = tests_of(&state);
    assert_eq!(
        summary(&tests),
        vec![
            (1, "42\n".into(), Some("0".into()), Some(0)),
            (2, "1\n".into(), Some("1".into()), Some(50)),
            (3, "1000\n".into(), Some("1".into()), Some(50)),
        ]
    );
    assert!(tests[0].use_in_statements);
    assert_eq!(tests[0].input_for_statements.as_deref(), Some("50\n42\n"));
    assert_eq!(
        tests[0].output_for_statements.as_deref(),
        Some("lower\ncorrect\n")
    );
    assert_eq!(tests[0].verify_input_output_for_statements, Some(false));
    assert_eq!(tests[1].description.as_deref(), Some("domjudge: secret/01.in"));

    assert_eq!(
        state.solutions,
        vec![
            ("Sol.java".to_string(), SolutionTag::Main),
            ("01_sol.cpp".to_string(), SolutionTag::Ok),
            ("02_slow.cpp".to_string(), SolutionTag::TimeLimit),
        ]
    );

    assert_eq!(state.checker, None);
    let resources: Vec<_> = state
        .files
        .iter()
        .filter(|(file_type, _, _)| *file_type == FileType::Resource)
        .map(|(_, name, _)| name.as_str())
        .collect();
    assert_eq!(resources, vec!["interactor.cpp"]);

    let english: Vec<_> = state
        .statements
        .iter()
        .filter(|(lang, _)| lang == "english")
        .map(|(_, statement)| statement.clone())
        .collect();
    assert_eq!(english.len(), 2);
    assert_eq!(english[0].name.as_deref(), Some("Guess the Number"));
    assert_eq!(english[0].input.as_deref().map(str::trim), Some("Nothing."));
    assert_eq!(english[1].tutorial.as_deref(), Some("Binary search.\n"));
    assert_eq!(
        state.statement_resources,
        vec!["problem.en.tex", "solution.tex"]
    );

    assert_eq!(state.info.len(), 1);
    assert_eq!(state.info[0].time_limit, Some(2500));
    assert_eq!(state.info[0].memory_limit, Some(512));
    assert_eq!(state.info[0].interactive, Some(true));
    assert_that!(state.description.unwrap()).contains("validation: custom interactive");
}

#[test]
fn test_domjudge_standard_package() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    write_files(
        tmpdir.path(),
        &[
            ("data/sample/1.in", "1 2\n"),
            ("data/sample/1.ans", "3\n"),
            ("data/secret/1.in", "3 4\n"),
            ("problem.yaml", "name: sum\n"),
            ("archive.zip", "PK"),
        ],
    );

    let problem = MemoryProblem::new();
    let report = import(tmpdir.path(), &problem, UploadOptions::default()).unwrap();
    assert_eq!(report.uploaded, vec![1, 2]);

    let state = problem.state();
    let tests = tests_of(&state);
    assert_eq!(tests[0].output_for_statements, None);
    assert_eq!(state.checker.as_deref(), Some("std::wcmp.cpp"));
    assert_eq!(state.info[0].interactive, Some(false));
    assert_eq!(state.info[0].time_limit, None);
    let aux: Vec<_> = state
        .files
        .iter()
        .filter(|(file_type, _, _)| *file_type == FileType::Aux)
        .map(|(_, name, _)| name.as_str())
        .collect();
    assert_eq!(aux, vec!["archive.zip"]);
}
