use crate::{
    ApiError, FileType, ProblemInfo, RemoteTest, ResourceAdvancedProperties, SolutionTag,
    Statement, TestGroupRecord, TestRecord,
};

/// The operations available on a single problem of the remote service.
///
/// Every mutation either succeeds or fails with an [`ApiError`]; a rejected request carries the
/// reason given by the service in [`ApiError::RequestFailed`].
pub trait ProblemService {
    /// Enable or disable the points for the problem.
    fn enable_points(&self, enable: bool) -> Result<(), ApiError>;

    /// Enable or disable the test groups for the test set.
    fn enable_groups(&self, test_set: &str, enable: bool) -> Result<(), ApiError>;

    /// List the tests currently stored in the test set, including the inputs of the manual ones.
    fn tests(&self, test_set: &str) -> Result<Vec<RemoteTest>, ApiError>;

    /// Create or overwrite a single test.
    fn save_test(&self, test: &TestRecord) -> Result<(), ApiError>;

    /// Set the scoring and feedback policy of a test group.
    fn save_test_group(&self, group: &TestGroupRecord) -> Result<(), ApiError>;

    /// Add or overwrite a file of the problem.
    fn save_file(
        &self,
        file_type: FileType,
        name: &str,
        content: &[u8],
        properties: Option<&ResourceAdvancedProperties>,
    ) -> Result<(), ApiError>;

    /// Add or overwrite a solution. When `source_type` is `None` the service detects it.
    fn save_solution(
        &self,
        name: &str,
        content: &[u8],
        source_type: Option<&str>,
        tag: SolutionTag,
    ) -> Result<(), ApiError>;

    /// Set the checker of the problem, a source file or a standard one like `std::wcmp.cpp`.
    fn set_checker(&self, name: &str) -> Result<(), ApiError>;

    /// Set the validator of the problem.
    fn set_validator(&self, name: &str) -> Result<(), ApiError>;

    /// Update the sections of the statement in the given language.
    fn save_statement(&self, lang: &str, statement: &Statement) -> Result<(), ApiError>;

    /// Add or overwrite a file used by the statements, like an image.
    fn save_statement_resource(&self, name: &str, content: &[u8]) -> Result<(), ApiError>;

    /// Update the general information of the problem. Only the present fields are changed.
    fn update_info(&self, info: &ProblemInfo) -> Result<(), ApiError>;

    /// Save the general description, visible only to the problem writers.
    fn save_general_description(&self, description: &str) -> Result<(), ApiError>;

    /// Save the general tutorial, visible only to the problem writers.
    fn save_general_tutorial(&self, tutorial: &str) -> Result<(), ApiError>;

    /// Replace the tags of the problem.
    fn save_tags(&self, tags: &[String]) -> Result<(), ApiError>;
}
