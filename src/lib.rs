//! Rhythm Refiner - playlist analysis and track recommendations.
//!
//! Summarizes which artists make up a playlist and recommends tracks it
//! doesn't contain yet, each with an explainable 0-100% confidence built
//! from a fixed linear blend of signals.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod recommend;

pub use error::{Error, Result};
