pub mod args;
pub mod build;
