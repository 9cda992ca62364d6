//! # polygon-uploader
//!
//! Import competitive programming problems into Polygon. Each importer reads the tests, the
//! solutions and the statement of a problem from a different source (a local directory, a
//! DOMjudge package, loj.ac or usaco.org) and uploads them to an existing Polygon problem.
//!
//! The binary is a thin wrapper around this library: the same importers can be driven against any
//! [`ProblemService`](polygon_uploader_api::ProblemService).

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod auth;
pub mod download;
pub mod error;
pub mod importers;
pub mod opt;
pub mod scratch;
pub mod session;

pub use opt::*;
