//! Business logic services

pub mod ctf_service;
pub mod review_service;
pub mod submission_service;

pub use ctf_service::CtfService;
pub use review_service::ReviewService;
pub use submission_service::SubmissionService;
