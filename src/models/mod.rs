//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod ctf;
pub mod submission;

pub use ctf::*;
pub use submission::*;
