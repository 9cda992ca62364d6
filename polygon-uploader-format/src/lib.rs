//! Test groups and their upload to the problem service.
//!
//! The importers of the various judges describe the tests of a problem as a sequence of
//! [`Group`]s: each group is an ordered list of [`TestDescriptor`]s worth some points, split
//! among the tests according to the [`GroupScoring`] of the group.
//!
//! The [`Orchestrator`] then flattens the groups into a single stream of tests numbered from 1,
//! sends them to a [`ProblemService`](polygon_uploader_api::ProblemService) one at a time, and
//! declares the [`GroupPolicy`] of each group after its tests. The failures of the service are
//! handled according to an [`ErrorRecoveryPolicy`]: skipped, retried on request of the operator
//! or fatal.
//!
//! ```
//! use polygon_uploader_api::MemoryProblem;
//! use polygon_uploader_format::*;
//!
//! let groups = vec![
//!     Group::new(0, vec![TestDescriptor::from_memory("1 2\n", "sample").in_statements()], GroupScoring::Sum),
//!     Group::new(100, vec![
//!         TestDescriptor::from_memory("3 4\n", "t1"),
//!         TestDescriptor::from_memory("5 6\n", "t2"),
//!     ], GroupScoring::Sum),
//! ];
//! let problem = MemoryProblem::new();
//! let mut orchestrator = Orchestrator::new(&problem, UploadOptions::default());
//! let report = orchestrator.upload_groups(&groups).unwrap();
//! assert_eq!(report.uploaded, vec![1, 2, 3]);
//! assert_eq!(report.groups, vec![0, 1]);
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

mod content;
mod error;
mod group;
mod policy;
mod recovery;
mod test;
mod upload;

pub use content::{FileContent, MemoryContent, TestContent};
pub use error::FormatError;
pub use group::{distribute_points, Group, GroupId, GroupScoring, SAMPLES_GROUP};
pub use policy::GroupPolicy;
pub use recovery::{
    skip_on_error, ConsolePrompt, ErrorRecoveryPolicy, RecoveryChoice, RecoveryPrompt,
};
pub use test::TestDescriptor;
pub use upload::{Orchestrator, UploadOptions, UploadReport};
