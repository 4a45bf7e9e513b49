//! Utility functions and helpers for the fumiopt-rs library.

pub mod finite_difference;
