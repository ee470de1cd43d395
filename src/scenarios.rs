//! End-to-end behavioral pinning for the execution engine.
//!
//! These scenarios exercise the whole stack together: configuration
//! parsing, unlock thresholds, program execution, terrain triggers and
//! save/restore merging. Each test pins an observable contract a
//! presentation layer depends on.
