//! algoblocks: declarative strategy evaluation engine.
//!
//! Hexagonal layout: pure evaluation logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], and the command-line
//! front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
