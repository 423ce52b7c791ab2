pub mod config;
pub mod logging;

pub mod auth;
pub mod checksum;
pub mod digest;
pub mod http;
pub mod providers;
pub mod resume;
pub mod source;
pub mod transfer;
pub mod url_model;
