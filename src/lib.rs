pub mod cli;
pub mod config;
pub mod crypto;
pub mod document;
pub mod errors;
pub mod output;
pub mod process;
pub mod reader;
pub mod store;
