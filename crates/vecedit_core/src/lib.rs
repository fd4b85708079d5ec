pub mod archive;
pub mod catalog;
pub mod core_api;
pub mod document;
pub mod entity;
pub mod mutations;
pub mod spatial;
