pub mod config;
pub mod route;
pub mod serve;
pub mod workflows;
