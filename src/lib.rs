pub mod award;
pub mod chance;
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod output;
pub mod pack;
pub mod report;
pub mod tables;
