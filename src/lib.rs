pub mod clients;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod views;

pub use error::{Error, Result};
