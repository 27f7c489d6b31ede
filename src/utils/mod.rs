//! Utility functions

pub mod crypto;
pub mod validation;
