//! Utility functions shared by the filter engine

pub mod sql;
pub mod time;
