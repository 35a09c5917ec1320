//! Command implementations

pub mod cache;
pub mod import;
pub mod locate;
pub mod tree;
pub mod versions;
