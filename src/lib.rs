pub mod apis;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod logger;
pub mod pools;
pub mod run;
pub mod services;
#[cfg(feature = "web")]
pub mod webserver;
