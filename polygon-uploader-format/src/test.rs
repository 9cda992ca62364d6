use std::path::PathBuf;

use anyhow::Error;

use crate::{FileContent, MemoryContent, TestContent};

/// A single test case ready to be uploaded: how to get its content plus its metadata.
///
/// Importers may patch the metadata (description and the statement fields) after construction,
/// for example when extra information is found in sibling files, but only before the upload.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TestDescriptor {
    #[derivative(Debug = "ignore")]
    content: Box<dyn TestContent>,
    /// Where the test comes from, stored with the test.
    pub description: String,
    /// Whether the test is shown in the statement.
    pub use_in_statements: bool,
    /// Input shown in the statement instead of the judged one.
    pub input_for_statements: Option<String>,
    /// Output shown in the statement instead of the judged one.
    pub output_for_statements: Option<String>,
    /// Whether the service should check the statement output against the judged one.
    pub verify: Option<bool>,
}

impl TestDescriptor {
    /// Make a new test from any content provider.
    pub fn new<C, S>(content: C, description: S) -> TestDescriptor
    where
        C: TestContent + 'static,
        S: Into<String>,
    {
        TestDescriptor {
            content: Box::new(content),
            description: description.into(),
            use_in_statements: false,
            input_for_statements: None,
            output_for_statements: None,
            verify: None,
        }
    }

    /// A test whose content is read from a file when uploaded.
    pub fn from_file<P: Into<PathBuf>, S: Into<String>>(path: P, description: S) -> Self {
        TestDescriptor::new(FileContent::new(path), description)
    }

    /// A test whose content is already known.
    pub fn from_memory<C: Into<String>, S: Into<String>>(content: C, description: S) -> Self {
        TestDescriptor::new(MemoryContent::new(content), description)
    }

    /// Mark the test to be shown in the statement.
    pub fn in_statements(mut self) -> Self {
        self.use_in_statements = true;
        self
    }

    /// Show this input and output in the statement instead of the judged ones.
    pub fn with_statement_io(
        mut self,
        input: Option<String>,
        output: Option<String>,
        verify: Option<bool>,
    ) -> Self {
        self.input_for_statements = input;
        self.output_for_statements = output;
        self.verify = verify;
        self
    }

    /// Materialize the content of the test.
    pub fn content(&self) -> Result<String, Error> {
        self.content.content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let test = TestDescriptor::from_memory("1\n", "sample 1")
            .in_statements()
            .with_statement_io(Some("> 1".into()), Some("< 2".into()), Some(false));
        assert_eq!(test.content().unwrap(), "1\n");
        assert_eq!(test.description, "sample 1");
        assert!(test.use_in_statements);
        assert_eq!(test.input_for_statements.as_deref(), Some("> 1"));
        assert_eq!(test.output_for_statements.as_deref(), Some("< 2"));
        assert_eq!(test.verify, Some(false));
    }

    #[test]
    fn test_debug_skips_content() {
        let test = TestDescriptor::new(|| Ok::<_, Error>("secret".to_string()), "lazy");
        let debug = format!("{:?}", test);
        assert!(debug.contains("lazy"));
        assert!(!debug.contains("secret"));
    }
}
