pub mod catalog;
pub mod config;
pub mod expand;
pub mod scan;
