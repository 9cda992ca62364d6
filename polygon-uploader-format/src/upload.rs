use std::collections::HashMap;

use anyhow::{Context, Error};
use polygon_uploader_api::{ApiError, ProblemService, TestGroupRecord, TestRecord};

use crate::{
    ConsolePrompt, ErrorRecoveryPolicy, Group, GroupId, GroupPolicy, RecoveryChoice,
    RecoveryPrompt,
};

/// Configuration of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// The test set to upload the tests into.
    pub test_set: String,
    /// Avoid sending tests already stored with the same group, points and input, and ask the
    /// service not to overwrite existing tests.
    pub check_existing: bool,
    /// What to do with the failures that survive the automatic retries.
    pub recovery: ErrorRecoveryPolicy,
    /// How many times a failed request is retried before applying `recovery`.
    pub retries: u32,
}

/// What happened during an upload. Indices are the global 1-based test indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Tests sent to the service.
    pub uploaded: Vec<u32>,
    /// Tests already present with the same content, not sent.
    pub unchanged: Vec<u32>,
    /// Tests given up after a failure. Their index stays unused.
    pub skipped: Vec<u32>,
    /// Groups whose policy has been saved.
    pub groups: Vec<GroupId>,
}

/// Whether a request eventually went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Skipped,
}

/// A test already stored by the service, reduced to what is needed to detect changes.
#[derive(Debug)]
struct ExistingTest {
    group: Option<String>,
    points: Option<f64>,
    input_hash: blake3::Hash,
}

/// Uploads the groups of a problem, numbering the tests with a global index that spans all the
/// groups.
pub struct Orchestrator<'a> {
    service: &'a dyn ProblemService,
    options: UploadOptions,
    prompt: Box<dyn RecoveryPrompt + 'a>,
    /// Index of the last test handed to the service, 0 before the first one.
    last_index: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            test_set: "tests".into(),
            check_existing: true,
            recovery: ErrorRecoveryPolicy::Skip,
            retries: 0,
        }
    }
}

impl ExistingTest {
    fn matches(&self, group: GroupId, points: u32, content: &str) -> bool {
        let same_group = self.group.as_deref() == Some(group.to_string().as_str());
        let same_points = self
            .points
            .map_or(false, |p| (p - f64::from(points)).abs() < 1e-6);
        same_group && same_points && self.input_hash == blake3::hash(content.as_bytes())
    }
}

impl<'a> Orchestrator<'a> {
    /// Make a new orchestrator that asks the operator on the terminal, if ever needed.
    pub fn new(service: &'a dyn ProblemService, options: UploadOptions) -> Orchestrator<'a> {
        Orchestrator {
            service,
            options,
            prompt: Box::new(ConsolePrompt),
            last_index: 0,
        }
    }

    /// Use a different prompt for [`ErrorRecoveryPolicy::RetryThenAsk`].
    pub fn with_prompt<P: RecoveryPrompt + 'a>(mut self, prompt: P) -> Orchestrator<'a> {
        self.prompt = Box::new(prompt);
        self
    }

    /// The global index of the last test handed to the service.
    pub fn last_index(&self) -> u32 {
        self.last_index
    }

    /// Upload all the tests of all the groups, in order, and then the policy of each group.
    ///
    /// The id of a group is its position in `groups`. Empty groups are skipped entirely, but
    /// still consume their id.
    pub fn upload_groups(&mut self, groups: &[Group]) -> Result<UploadReport, Error> {
        let existing = self.existing_tests();
        let service = self.service;
        let mut report = UploadReport::default();

        for (id, group) in groups.iter().enumerate() {
            let id = id as GroupId;
            if group.is_empty() {
                debug!("Group {} has no tests, skipping it", id);
                continue;
            }
            for (test, points) in group.iter() {
                self.last_index += 1;
                let index = self.last_index;
                let content = test
                    .content()
                    .with_context(|| format!("Cannot get the content of test {}", index))?;
                info!(
                    "problem.saveTest {} with group {} and points {}",
                    index, id, points
                );
                if let Some(remote) = existing.get(&index) {
                    if remote.matches(id, points, &content) {
                        info!("Test {} is already up to date", index);
                        report.unchanged.push(index);
                        continue;
                    }
                }
                let record = TestRecord {
                    test_set: self.options.test_set.clone(),
                    index,
                    input: content,
                    group: Some(id.to_string()),
                    points: Some(points),
                    description: Some(test.description.clone()),
                    use_in_statements: test.use_in_statements,
                    input_for_statements: test.input_for_statements.clone(),
                    output_for_statements: test.output_for_statements.clone(),
                    verify_input_output_for_statements: test.verify,
                    check_existing: self.options.check_existing,
                };
                let what = format!("Test {}", index);
                match self.with_recovery(&what, || service.save_test(&record))? {
                    Outcome::Done => report.uploaded.push(index),
                    Outcome::Skipped => report.skipped.push(index),
                }
            }

            let policy = GroupPolicy::for_group(id);
            info!(
                "problem.saveTestGroup group {}, pointsPolicy={}, feedbackPolicy={}",
                id, policy.points_policy, policy.feedback_policy
            );
            let record = TestGroupRecord {
                test_set: self.options.test_set.clone(),
                group: id.to_string(),
                points_policy: policy.points_policy,
                feedback_policy: policy.feedback_policy,
                dependencies: vec![],
            };
            let what = format!("Group {}", id);
            if self.with_recovery(&what, || service.save_test_group(&record))? == Outcome::Done {
                report.groups.push(id);
            }
        }
        Ok(report)
    }

    /// The tests already stored in the test set, by index. Empty if the check is disabled or
    /// the listing fails.
    fn existing_tests(&self) -> HashMap<u32, ExistingTest> {
        if !self.options.check_existing {
            return HashMap::new();
        }
        info!("problem.tests testset = {}", self.options.test_set);
        match self.service.tests(&self.options.test_set) {
            Ok(tests) => tests
                .into_iter()
                .filter_map(|test| {
                    let input = test.input?;
                    Some((
                        test.index,
                        ExistingTest {
                            group: test.group,
                            points: test.points,
                            input_hash: blake3::hash(input.as_bytes()),
                        },
                    ))
                })
                .collect(),
            Err(e) => {
                warn!(
                    "Cannot list the existing tests, all of them will be sent: {}",
                    e.reason()
                );
                HashMap::new()
            }
        }
    }

    /// Run `action` until it succeeds, or the recovery policy says to give up.
    fn with_recovery<F>(&mut self, what: &str, mut action: F) -> Result<Outcome, Error>
    where
        F: FnMut() -> Result<(), ApiError>,
    {
        let mut retries_left = self.options.retries;
        loop {
            let err = match action() {
                Ok(()) => return Ok(Outcome::Done),
                Err(err) => err,
            };
            if retries_left > 0 {
                retries_left -= 1;
                warn!("{}: {}, retrying", what, err.reason());
                continue;
            }
            match self.options.recovery {
                ErrorRecoveryPolicy::Skip => {
                    warn!("{}: {} skipped", what, err.reason());
                    return Ok(Outcome::Skipped);
                }
                ErrorRecoveryPolicy::Abort => {
                    error!("{}: {}", what, err.reason());
                    return Err(Error::new(err).context(format!("{} failed", what)));
                }
                ErrorRecoveryPolicy::RetryThenAsk => match self.prompt.ask(&err.reason())? {
                    RecoveryChoice::Retry => {
                        info!("{}: retrying", what);
                    }
                    RecoveryChoice::Skip => {
                        warn!("{}: {} skipped", what, err.reason());
                        return Ok(Outcome::Skipped);
                    }
                    RecoveryChoice::Terminate => {
                        return Err(Error::new(err).context(format!("Upload terminated at {}", what)));
                    }
                },
            }
        }
    }
}
