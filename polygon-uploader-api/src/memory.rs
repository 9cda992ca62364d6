//! An in-memory problem, used for dry runs and as a test double of the real service.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::{
    ApiError, FileType, ProblemInfo, ProblemService, RemoteTest, ResourceAdvancedProperties,
    SolutionTag, Statement, TestGroupRecord, TestRecord,
};

/// A problem kept entirely in memory. Every call is recorded, and failures can be scripted per
/// test index.
#[derive(Debug, Default)]
pub struct MemoryProblem {
    state: RefCell<MemoryState>,
}

/// Everything stored in a [`MemoryProblem`].
#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    /// The names of the called methods, in order, like `problem.saveTest`.
    pub calls: Vec<String>,
    /// The tests of each test set, by index.
    pub tests: HashMap<String, BTreeMap<u32, TestRecord>>,
    /// The saved test groups, in order.
    pub groups: Vec<TestGroupRecord>,
    /// The saved files with their type and content, in order.
    pub files: Vec<(FileType, String, Vec<u8>)>,
    /// The saved solutions with their tag, in order.
    pub solutions: Vec<(String, SolutionTag)>,
    /// The saved statements with their language, in order.
    pub statements: Vec<(String, Statement)>,
    /// The names of the saved statement resources.
    pub statement_resources: Vec<String>,
    /// Every update of the general information, in order.
    pub info: Vec<ProblemInfo>,
    /// The checker set with `set_checker`.
    pub checker: Option<String>,
    /// The validator set with `set_validator`.
    pub validator: Option<String>,
    /// The general description.
    pub description: Option<String>,
    /// The general tutorial.
    pub tutorial: Option<String>,
    /// The tags of the problem.
    pub tags: Vec<String>,
    /// Whether the points are enabled.
    pub points_enabled: bool,
    /// Whether the groups are enabled.
    pub groups_enabled: bool,
    /// Number of `save_test` calls that reached the problem, including failed ones.
    pub save_test_attempts: usize,
    /// Remaining failures of `save_test` by index, with the comment to report.
    failing_tests: HashMap<u32, (usize, String)>,
    /// Remaining failures of `save_file` by file type.
    failing_files: HashMap<FileType, (usize, String)>,
    /// Remaining failures of `save_test_group` by group name.
    failing_groups: HashMap<String, (usize, String)>,
    /// Remaining failures of `save_solution` by name.
    failing_solutions: HashMap<String, (usize, String)>,
    failing_tests_listing: bool,
}

fn take_failure<K: std::hash::Hash + Eq>(
    failures: &mut HashMap<K, (usize, String)>,
    key: &K,
    method: &str,
) -> Result<(), ApiError> {
    if let Some((times, comment)) = failures.get_mut(key) {
        if *times > 0 {
            *times -= 1;
            return Err(ApiError::RequestFailed {
                method: method.to_string(),
                comment: comment.clone(),
            });
        }
    }
    Ok(())
}

impl MemoryProblem {
    /// An empty problem, without tests and without scripted failures.
    pub fn new() -> MemoryProblem {
        MemoryProblem::default()
    }

    /// Make the next `times` saves of the test with this index fail with `comment`.
    pub fn fail_test<S: Into<String>>(&self, index: u32, times: usize, comment: S) {
        self.state
            .borrow_mut()
            .failing_tests
            .insert(index, (times, comment.into()));
    }

    /// Make the next `times` saves of files of this type fail with `comment`.
    pub fn fail_file<S: Into<String>>(&self, file_type: FileType, times: usize, comment: S) {
        self.state
            .borrow_mut()
            .failing_files
            .insert(file_type, (times, comment.into()));
    }

    /// Make the next `times` saves of the policy of this group fail with `comment`.
    pub fn fail_group<S: Into<String>>(&self, group: S, times: usize, comment: S) {
        self.state
            .borrow_mut()
            .failing_groups
            .insert(group.into(), (times, comment.into()));
    }

    /// Make the next `times` saves of the solution with this name fail with `comment`.
    pub fn fail_solution<S: Into<String>>(&self, name: S, times: usize, comment: S) {
        self.state
            .borrow_mut()
            .failing_solutions
            .insert(name.into(), (times, comment.into()));
    }

    /// Make the listing of the tests fail.
    pub fn fail_tests_listing(&self) {
        self.state.borrow_mut().failing_tests_listing = true;
    }

    /// A copy of the current state.
    pub fn state(&self) -> MemoryState {
        self.state.borrow().clone()
    }

    /// The tests stored in the test set, by index.
    pub fn test_set(&self, test_set: &str) -> BTreeMap<u32, TestRecord> {
        self.state
            .borrow()
            .tests
            .get(test_set)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, method: &str) {
        debug!("[memory] {}", method);
        self.state.borrow_mut().calls.push(method.to_string());
    }
}

impl ProblemService for MemoryProblem {
    fn enable_points(&self, enable: bool) -> Result<(), ApiError> {
        self.record("problem.enablePoints");
        self.state.borrow_mut().points_enabled = enable;
        Ok(())
    }

    fn enable_groups(&self, _test_set: &str, enable: bool) -> Result<(), ApiError> {
        self.record("problem.enableGroups");
        self.state.borrow_mut().groups_enabled = enable;
        Ok(())
    }

    fn tests(&self, test_set: &str) -> Result<Vec<RemoteTest>, ApiError> {
        self.record("problem.tests");
        if self.state.borrow().failing_tests_listing {
            return Err(ApiError::RequestFailed {
                method: "problem.tests".into(),
                comment: "testset: Test set not found".into(),
            });
        }
        Ok(self
            .test_set(test_set)
            .into_values()
            .map(|test| RemoteTest {
                index: test.index,
                manual: true,
                input: Some(test.input),
                description: test.description,
                use_in_statements: test.use_in_statements,
                group: test.group,
                points: test.points.map(f64::from),
            })
            .collect())
    }

    fn save_test(&self, test: &TestRecord) -> Result<(), ApiError> {
        self.record("problem.saveTest");
        let mut state = self.state.borrow_mut();
        state.save_test_attempts += 1;
        take_failure(&mut state.failing_tests, &test.index, "problem.saveTest")?;
        let tests = state.tests.entry(test.test_set.clone()).or_default();
        if test.check_existing && tests.contains_key(&test.index) {
            return Err(ApiError::RequestFailed {
                method: "problem.saveTest".into(),
                comment: format!("testIndex: Test #{} already exists", test.index),
            });
        }
        tests.insert(test.index, test.clone());
        Ok(())
    }

    fn save_test_group(&self, group: &TestGroupRecord) -> Result<(), ApiError> {
        self.record("problem.saveTestGroup");
        let mut state = self.state.borrow_mut();
        take_failure(&mut state.failing_groups, &group.group, "problem.saveTestGroup")?;
        state.groups.push(group.clone());
        Ok(())
    }

    fn save_file(
        &self,
        file_type: FileType,
        name: &str,
        content: &[u8],
        _properties: Option<&ResourceAdvancedProperties>,
    ) -> Result<(), ApiError> {
        self.record("problem.saveFile");
        let mut state = self.state.borrow_mut();
        take_failure(&mut state.failing_files, &file_type, "problem.saveFile")?;
        state
            .files
            .push((file_type, name.to_string(), content.to_vec()));
        Ok(())
    }

    fn save_solution(
        &self,
        name: &str,
        _content: &[u8],
        _source_type: Option<&str>,
        tag: SolutionTag,
    ) -> Result<(), ApiError> {
        self.record("problem.saveSolution");
        let mut state = self.state.borrow_mut();
        take_failure(
            &mut state.failing_solutions,
            &name.to_string(),
            "problem.saveSolution",
        )?;
        state.solutions.push((name.to_string(), tag));
        Ok(())
    }

    fn set_checker(&self, name: &str) -> Result<(), ApiError> {
        self.record("problem.setChecker");
        self.state.borrow_mut().checker = Some(name.to_string());
        Ok(())
    }

    fn set_validator(&self, name: &str) -> Result<(), ApiError> {
        self.record("problem.setValidator");
        self.state.borrow_mut().validator = Some(name.to_string());
        Ok(())
    }

    fn save_statement(&self, lang: &str, statement: &Statement) -> Result<(), ApiError> {
        self.record("problem.saveStatement");
        self.state
            .borrow_mut()
            .statements
            .push((lang.to_string(), statement.clone()));
        Ok(())
    }

    fn save_statement_resource(&self, name: &str, _content: &[u8]) -> Result<(), ApiError> {
        self.record("problem.saveStatementResource");
        self.state
            .borrow_mut()
            .statement_resources
            .push(name.to_string());
        Ok(())
    }

    fn update_info(&self, info: &ProblemInfo) -> Result<(), ApiError> {
        self.record("problem.updateInfo");
        self.state.borrow_mut().info.push(info.clone());
        Ok(())
    }

    fn save_general_description(&self, description: &str) -> Result<(), ApiError> {
        self.record("problem.saveGeneralDescription");
        self.state.borrow_mut().description = Some(description.to_string());
        Ok(())
    }

    fn save_general_tutorial(&self, tutorial: &str) -> Result<(), ApiError> {
        self.record("problem.saveGeneralTutorial");
        self.state.borrow_mut().tutorial = Some(tutorial.to_string());
        Ok(())
    }

    fn save_tags(&self, tags: &[String]) -> Result<(), ApiError> {
        self.record("problem.saveTags");
        self.state.borrow_mut().tags = tags.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u32, check_existing: bool) -> TestRecord {
        TestRecord {
            test_set: "tests".into(),
            index,
            input: "1 2\n".into(),
            group: Some("0".into()),
            points: Some(0),
            description: None,
            use_in_statements: true,
            input_for_statements: None,
            output_for_statements: None,
            verify_input_output_for_statements: None,
            check_existing,
        }
    }

    #[test]
    fn test_scripted_failures() {
        let problem = MemoryProblem::new();
        problem.fail_test(1, 2, "nope");
        assert_eq!(problem.save_test(&record(1, false)).unwrap_err().reason(), "nope");
        assert!(problem.save_test(&record(1, false)).is_err());
        assert!(problem.save_test(&record(1, false)).is_ok());
        assert_eq!(problem.state().save_test_attempts, 3);
        assert_eq!(problem.test_set("tests").len(), 1);
    }

    #[test]
    fn test_check_existing() {
        let problem = MemoryProblem::new();
        problem.save_test(&record(1, true)).unwrap();
        assert!(problem.save_test(&record(1, true)).is_err());
        assert!(problem.save_test(&record(1, false)).is_ok());
    }

    #[test]
    fn test_listing() {
        let problem = MemoryProblem::new();
        problem.save_test(&record(2, false)).unwrap();
        let tests = problem.tests("tests").unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].index, 2);
        assert_eq!(tests[0].input.as_deref(), Some("1 2\n"));
        assert_eq!(tests[0].points, Some(0.0));
        assert!(problem.tests("other").unwrap().is_empty());
    }

    #[test]
    fn test_failing_solution() {
        let problem = MemoryProblem::new();
        problem.fail_solution("a.cpp", 1, "name: Compilation error");
        assert!(problem
            .save_solution("a.cpp", b"", None, SolutionTag::Main)
            .is_err());
        assert!(problem
            .save_solution("b.cpp", b"", None, SolutionTag::Main)
            .is_ok());
        assert!(problem
            .save_solution("a.cpp", b"", None, SolutionTag::Ok)
            .is_ok());
        assert_eq!(problem.state().solutions.len(), 2);
    }
}
