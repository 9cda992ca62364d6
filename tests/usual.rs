use polygon_uploader::importers::usual::{import, main_usual, DESCRIPTION};
use polygon_uploader::opt::UsualOpt;
use polygon_uploader_api::{FeedbackPolicy, FileType, MemoryProblem, PointsPolicy, SolutionTag};
use polygon_uploader_format::UploadOptions;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use tempfile::TempDir;

mod common;
use common::*;

fn package(root: &std::path::Path) {
    write_files(
        root,
        &[
            ("src/01.sample", "1 2\n"),
            ("src/01", "3 4\n"),
            ("src/02", "5 6\n"),
            ("src/03", "7 8\n"),
            ("files/testlib.h", "#pragma once\n"),
            ("files/gen.cpp", "int main() {}\n"),
            ("files/check.cpp", "int main() {}\n"),
            ("solutions/a.cpp", "int main() {}\n"),
            ("solutions/B.java", "class B {}\n"),
            ("solutions/notes.txt", "not a solution\n"),
        ],
    );
}

#[test]
fn test_usual_import() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    package(tmpdir.path());

    let problem = MemoryProblem::new();
    let report = import(tmpdir.path(), &problem, UploadOptions::default()).unwrap();
    assert_eq!(report.uploaded, vec![1, 2, 3, 4]);
    assert_that!(report.skipped).is_empty();

    let state = problem.state();
    assert_eq!(
        summary(&tests_of(&state)),
        vec![
            (1, "1 2\n".into(), Some("0".into()), Some(0)),
            (2, "3 4\n".into(), Some("1".into()), Some(100)),
            (3, "5 6\n".into(), Some("1".into()), Some(0)),
            (4, "7 8\n".into(), Some("1".into()), Some(0)),
        ]
    );
    assert!(tests_of(&state)[0].use_in_statements);

    let policies: Vec<_> = state
        .groups
        .iter()
        .map(|g| (g.group.as_str(), g.points_policy, g.feedback_policy))
        .collect();
    assert_eq!(
        policies,
        vec![
            ("0", PointsPolicy::EachTest, FeedbackPolicy::Complete),
            ("1", PointsPolicy::CompleteGroup, FeedbackPolicy::Icpc),
        ]
    );

    let files: Vec<_> = state
        .files
        .iter()
        .map(|(file_type, name, _)| (*file_type, name.as_str()))
        .collect();
    assert_eq!(
        files,
        vec![
            (FileType::Resource, "testlib.h"),
            (FileType::Source, "check.cpp"),
            (FileType::Source, "gen.cpp"),
        ]
    );
    assert_eq!(
        state.solutions,
        vec![
            ("B.java".to_string(), SolutionTag::Main),
            ("a.cpp".to_string(), SolutionTag::Ok),
        ]
    );
    assert_eq!(state.description.as_deref(), Some(DESCRIPTION));
}

#[test]
fn test_usual_rerun_is_idempotent() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    package(tmpdir.path());

    let problem = MemoryProblem::new();
    import(tmpdir.path(), &problem, UploadOptions::default()).unwrap();
    let report = import(tmpdir.path(), &problem, UploadOptions::default()).unwrap();
    assert_that!(report.uploaded).is_empty();
    assert_eq!(report.unchanged, vec![1, 2, 3, 4]);
    assert_eq!(tests_of(&problem.state()).len(), 4);
}

#[test]
fn test_usual_without_tests_directory() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    let problem = MemoryProblem::new();
    assert_that!(import(tmpdir.path(), &problem, UploadOptions::default())).is_err();
    assert!(problem.state().tests.is_empty());
}

#[test]
fn test_usual_dry_run() {
    setup();
    let tmpdir = TempDir::new().unwrap();
    package(tmpdir.path());
    let opt = UsualOpt {
        directory: tmpdir.path().to_owned(),
        problem: "a-plus-b".parse().unwrap(),
    };
    assert_that!(main_usual(opt, &dry_run(), &upload_opt())).is_ok();
}
