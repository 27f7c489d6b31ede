//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod ctf_repo;
pub mod submission_repo;

pub use ctf_repo::CtfRepository;
pub use submission_repo::SubmissionRepository;
