pub mod apply;
pub mod query;
