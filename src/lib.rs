//! A small companion living in your terminal. It is happy while you type, grows sad when you
//! wander off and comments on what you have running.
//! The interesting part is [companion]: activity tracking, the mood score and status selection.
//!

pub mod cli;
pub mod companion;
pub mod config;
pub mod display;
pub mod idle_api;
pub mod processes;
pub mod utils;
