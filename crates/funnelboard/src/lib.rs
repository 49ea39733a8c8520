pub mod charts;
pub mod report;
pub mod server;
pub mod views;
