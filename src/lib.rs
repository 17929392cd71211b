pub mod common;
pub mod config;
pub mod history;
pub mod quiz;
pub mod session;

#[cfg(test)]
mod tests;
