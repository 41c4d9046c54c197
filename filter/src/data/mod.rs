pub mod filters;
pub mod sql;
