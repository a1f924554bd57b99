//! Core type definitions used across the EcoLearn workspace.

pub mod id;

pub use id::*;
