pub mod app;
pub mod completion;
pub mod config;
pub mod constants;
pub mod credential;
pub mod message;
pub mod notification;
pub mod speech;
