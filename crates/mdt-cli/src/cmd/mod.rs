pub mod config;
pub mod cr;
pub mod design;
pub mod init;
pub mod thresholds;
