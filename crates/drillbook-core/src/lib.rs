//! drillbook-core — Adaptive drill engine for function tables and mental arithmetic.
//!
//! This crate holds everything below the terminal: operand range specs,
//! question generation with replay of past mistakes, answer validation,
//! the bounded error/timeout record store and its persistence, and the
//! batch-oriented session runner.

pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod persistence;
pub mod range_spec;
pub mod report;
pub mod session;
pub mod statistics;
pub mod store;
pub mod validator;
