//! Instruction handlers

pub mod admin;
pub mod player;
pub mod settlement;

pub use admin::*;
pub use player::*;
pub use settlement::*;
