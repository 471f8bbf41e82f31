pub mod app;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod gate;
pub mod logging;
pub mod notify;
pub mod output;
pub mod report;
pub mod service;
pub mod view;

#[cfg(test)]
mod tests;
