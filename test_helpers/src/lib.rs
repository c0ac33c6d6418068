//! Test helpers shared across crates.
//!
//! This crate provides a canonical rv32emu-shaped source tree for exercising
//! the template generator, either as in-memory text or written to a
//! temporary directory.

pub mod sample;
