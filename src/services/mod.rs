pub mod backend;
pub mod catalog;
