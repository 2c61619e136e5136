pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod state;
pub mod storage;
pub mod sync;
pub mod views;
