mod app;
mod cli;
mod config;
mod effects;
mod history;
mod logging;
mod notify;
mod session;
mod ui;

pub use app::run_app;
