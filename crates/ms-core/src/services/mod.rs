pub mod chat;
pub mod compose;
pub mod config_store;
pub mod descriptor;
pub mod docker;
pub mod inventory;
pub mod jobs;
pub mod pipeline;
pub mod ports;
