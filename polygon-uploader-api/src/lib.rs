//! Client side of the Polygon problem-management service.
//!
//! The operations available on a problem are described by the [`ProblemService`] trait, so that
//! the upload pipeline can be driven against the real service ([`RemoteProblem`]) or against an
//! in-memory [`MemoryProblem`] for dry runs and tests.
//!
//! Every request to the real service is a signed `POST` to `{url}/api/{method}`; a request refused
//! by the service is reported as [`ApiError::RequestFailed`] carrying the reason given by the
//! service.

#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod client;
mod error;
pub mod memory;
mod service;
mod types;

pub use client::{PolygonClient, RemoteProblem};
pub use error::ApiError;
pub use memory::MemoryProblem;
pub use service::ProblemService;
pub use types::*;
