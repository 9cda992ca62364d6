//! The importers of the supported sources of problems.
//!
//! Each importer turns the data of a problem into a sequence of test groups, uploads them with
//! the [`Orchestrator`](polygon_uploader_format::Orchestrator) and then sends the auxiliary
//! files of the problem.

pub mod common;
pub mod domjudge;
pub mod loj;
pub mod usaco;
pub mod usual;

pub use domjudge::main_domjudge;
pub use loj::main_loj;
pub use usaco::main_usaco;
pub use usual::main_usual;
