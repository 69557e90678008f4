//! Job implementations behind the CLI subcommands

pub mod common;
pub mod fantasycalc;
pub mod ktc;
pub mod nflverse;
pub mod silver;
pub mod sleeper;

#[cfg(test)]
mod tests;

pub use common::JobContext;
