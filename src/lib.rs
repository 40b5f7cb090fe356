pub mod api;
pub mod calculator;
pub mod client;
pub mod format;
pub mod forms;
pub mod host;
pub mod market;
pub mod overview;
pub mod settings;
