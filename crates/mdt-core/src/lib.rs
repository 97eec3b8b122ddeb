pub mod artifact;
pub mod config;
pub mod cr;
pub mod decision;
pub mod document;
pub mod engine;
pub mod error;
pub mod io;
pub mod paths;
pub mod pattern;
pub mod sizing;
pub mod threshold;
pub mod ticket;
pub mod types;
pub mod validate;

pub use error::{MdtError, Result};
