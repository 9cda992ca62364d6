use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// How the points of a test group are awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointsPolicy {
    /// Every test of the group is scored independently.
    EachTest,
    /// The points of the group are awarded only if every test of the group passes.
    CompleteGroup,
}

/// How much feedback the participants get for a test group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackPolicy {
    /// No feedback at all.
    None,
    /// Only the points of the group.
    Points,
    /// Pass/fail with the first failing test, like in ICPC.
    Icpc,
    /// Full feedback on every test.
    Complete,
}

/// The kind of a file attached to a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A file available at compile time or runtime, like `testlib.h`.
    Resource,
    /// A source file: generators, checkers, validators, interactors.
    Source,
    /// Any other file kept with the package.
    Aux,
}

/// The expected verdict of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolutionTag {
    /// The main correct solution, used to generate the answers.
    #[serde(rename = "MA")]
    Main,
    /// A correct solution.
    #[serde(rename = "OK")]
    Ok,
    /// A solution that must fail on some test.
    #[serde(rename = "RJ")]
    Rejected,
    /// A solution exceeding the time limit.
    #[serde(rename = "TL")]
    TimeLimit,
    /// A solution that may or may not exceed the time limit.
    #[serde(rename = "TO")]
    TimeOrOk,
    /// A solution giving a wrong answer.
    #[serde(rename = "WA")]
    WrongAnswer,
    /// A solution with a presentation error.
    #[serde(rename = "PE")]
    PresentationError,
    /// A solution exceeding the memory limit.
    #[serde(rename = "ML")]
    MemoryLimit,
    /// A solution crashing at runtime.
    #[serde(rename = "RE")]
    RuntimeError,
}

/// Compilation or execution stage a resource file is available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Compilation of the sources.
    Compile,
    /// Execution.
    Run,
}

/// The kind of files a resource file is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// The input validator.
    Validator,
    /// The interactor.
    Interactor,
    /// The checker.
    Checker,
    /// The solutions.
    Solution,
}

/// Restricts a resource file to some languages, stages and assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAdvancedProperties {
    /// Semicolon separated list of source types, wildcards allowed (e.g. `cpp.*`).
    pub for_types: String,
    /// Whether this is the main file of the resource (e.g. a grader).
    pub main: bool,
    /// Stages in which the file is available.
    pub stages: Vec<Stage>,
    /// Kinds of files the resource is attached to.
    pub assets: Vec<Asset>,
}

/// A problem as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Id of the problem.
    pub id: u64,
    /// Login of the owner.
    #[serde(default)]
    pub owner: String,
    /// Name of the problem.
    pub name: String,
    /// Whether the problem is deleted.
    #[serde(default)]
    pub deleted: bool,
    /// `READ`, `WRITE` or `OWNER`.
    #[serde(default)]
    pub access_type: Option<String>,
    /// Current revision.
    #[serde(default)]
    pub revision: Option<u64>,
    /// Whether there are uncommitted changes.
    #[serde(default)]
    pub modified: bool,
}

/// Filter for listing the problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    /// Only the problem with this id.
    pub id: Option<u64>,
    /// Only the problems with this name.
    pub name: Option<String>,
    /// Only the problems of this owner.
    pub owner: Option<String>,
    /// Include the deleted problems.
    pub show_deleted: bool,
}

/// A test as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTest {
    /// 1-based index of the test.
    pub index: u32,
    /// Whether the input is stored, instead of generated.
    #[serde(default)]
    pub manual: bool,
    /// Present only for manual tests.
    #[serde(default)]
    pub input: Option<String>,
    /// Free text description of the test.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the test is shown in the statements.
    #[serde(default)]
    pub use_in_statements: bool,
    /// Name of the group of the test.
    #[serde(default)]
    pub group: Option<String>,
    /// Points of the test.
    #[serde(default)]
    pub points: Option<f64>,
}

/// Sections of a statement in one language. Only the present sections are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    /// Encoding of the statement, like `UTF-8`.
    pub encoding: Option<String>,
    /// Name of the problem.
    pub name: Option<String>,
    /// Main text.
    pub legend: Option<String>,
    /// Input format.
    pub input: Option<String>,
    /// Output format.
    pub output: Option<String>,
    /// Scoring section.
    pub scoring: Option<String>,
    /// Interaction protocol.
    pub interaction: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Tutorial.
    pub tutorial: Option<String>,
}

/// General information of a problem. Only the present fields are updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemInfo {
    /// Name of the input file, `stdin` for the standard input.
    pub input_file: Option<String>,
    /// Name of the output file, `stdout` for the standard output.
    pub output_file: Option<String>,
    /// Whether the problem is interactive.
    pub interactive: Option<bool>,
    /// Time limit in milliseconds.
    pub time_limit: Option<u32>,
    /// Memory limit in megabytes.
    pub memory_limit: Option<u32>,
}

/// Everything sent when saving a single test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    /// The test set to save the test into.
    pub test_set: String,
    /// 1-based index of the test inside the test set.
    pub index: u32,
    /// Content of the input file.
    pub input: String,
    /// Name of the group of the test.
    pub group: Option<String>,
    /// Points of the test.
    pub points: Option<u32>,
    /// Free text description of the test.
    pub description: Option<String>,
    /// Whether the test is shown in the statements.
    pub use_in_statements: bool,
    /// Input shown in the statements instead of the real one.
    pub input_for_statements: Option<String>,
    /// Output shown in the statements instead of the real one.
    pub output_for_statements: Option<String>,
    /// Whether the statement input and output are checked against the solutions.
    pub verify_input_output_for_statements: Option<bool>,
    /// Ask the service to refuse overwriting an existing test.
    pub check_existing: bool,
}

/// Everything sent when saving the policy of a test group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroupRecord {
    /// The test set of the group.
    pub test_set: String,
    /// Name of the group.
    pub group: String,
    /// How the points of the group are awarded.
    pub points_policy: PointsPolicy,
    /// Feedback given on the group.
    pub feedback_policy: FeedbackPolicy,
    /// Groups that must be passed before this one is scored.
    pub dependencies: Vec<String>,
}

impl PointsPolicy {
    /// Name of the policy on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PointsPolicy::EachTest => "EACH_TEST",
            PointsPolicy::CompleteGroup => "COMPLETE_GROUP",
        }
    }
}

impl FeedbackPolicy {
    /// Name of the policy on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackPolicy::None => "NONE",
            FeedbackPolicy::Points => "POINTS",
            FeedbackPolicy::Icpc => "ICPC",
            FeedbackPolicy::Complete => "COMPLETE",
        }
    }
}

impl FileType {
    /// Name of the file type on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Resource => "resource",
            FileType::Source => "source",
            FileType::Aux => "aux",
        }
    }
}

impl SolutionTag {
    /// Name of the tag on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionTag::Main => "MA",
            SolutionTag::Ok => "OK",
            SolutionTag::Rejected => "RJ",
            SolutionTag::TimeLimit => "TL",
            SolutionTag::TimeOrOk => "TO",
            SolutionTag::WrongAnswer => "WA",
            SolutionTag::PresentationError => "PE",
            SolutionTag::MemoryLimit => "ML",
            SolutionTag::RuntimeError => "RE",
        }
    }
}

impl Stage {
    /// Name of the stage on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Compile => "COMPILE",
            Stage::Run => "RUN",
        }
    }
}

impl Asset {
    /// Name of the asset on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Validator => "VALIDATOR",
            Asset::Interactor => "INTERACTOR",
            Asset::Checker => "CHECKER",
            Asset::Solution => "SOLUTION",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl Display for $ty {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(PointsPolicy, FeedbackPolicy, FileType, SolutionTag, Stage, Asset);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_test_deserialize() {
        let test: RemoteTest = serde_json::from_str(
            r#"{"index": 3, "manual": true, "input": "1 2\n", "group": "1", "points": 2.0,
                "useInStatements": false, "description": "x"}"#,
        )
        .unwrap();
        assert_eq!(test.index, 3);
        assert_eq!(test.input.as_deref(), Some("1 2\n"));
        assert_eq!(test.group.as_deref(), Some("1"));
        assert_eq!(test.points, Some(2.0));
    }

    #[test]
    fn test_remote_test_generated() {
        let test: RemoteTest =
            serde_json::from_str(r#"{"index": 7, "manual": false, "scriptLine": "gen 1"}"#)
                .unwrap();
        assert!(!test.manual);
        assert!(test.input.is_none());
        assert!(test.group.is_none());
    }

    #[test]
    fn test_problem_deserialize() {
        let problem: Problem = serde_json::from_str(
            r#"{"id": 123, "owner": "me", "name": "aplusb", "deleted": false,
                "favourite": false, "accessType": "OWNER", "revision": 4, "modified": false}"#,
        )
        .unwrap();
        assert_eq!(problem.id, 123);
        assert_eq!(problem.name, "aplusb");
        assert_eq!(problem.access_type.as_deref(), Some("OWNER"));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(PointsPolicy::CompleteGroup.to_string(), "COMPLETE_GROUP");
        assert_eq!(FeedbackPolicy::Icpc.to_string(), "ICPC");
        assert_eq!(FileType::Aux.to_string(), "aux");
        assert_eq!(SolutionTag::Main.to_string(), "MA");
        assert_eq!(
            serde_json::to_string(&PointsPolicy::EachTest).unwrap(),
            "\"EACH_TEST\""
        );
    }
}
