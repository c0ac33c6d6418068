//! Generator for the tier-2 JIT instruction template.
//!
//! The interpreter implements each instruction once, as an
//! `RVOP(mnemonic, { ... })` block in its operation table. This crate turns
//! that table, plus a few declarations from the interpreter headers, into
//! the code-generation template the tracing JIT compiles traces with:
//!
//! 1. [`features`] resolves build flags into the set of excluded mnemonics;
//! 2. [`extract`] pulls the required declarations out of the headers;
//! 3. [`collect`] lists every operation definition;
//! 4. [`transform`] rewrites each surviving body into emission directives;
//! 5. [`template`] assembles and renders the document.
//!
//! [`pipeline`] wires the stages together. [`profile`] holds unrelated
//! helpers for reading the JIT's profiling output.

pub mod check;
pub mod collect;
pub mod config;
pub mod error;
pub mod extract;
pub mod features;
pub mod fs_helpers;
pub mod pipeline;
pub mod profile;
pub mod source;
pub mod template;
pub mod transform;
