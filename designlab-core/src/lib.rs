//! DesignLab Core — domain types, solver-adapter contract, deterministic RNG,
//! perturbation sampling.
//!
//! This crate contains the pieces shared by every analysis stage:
//! - Domain types (design points, attribution, subjects, conditions)
//! - The `DesignProgram` trait: the nonlinear program consumed as a pure
//!   solve capability with per-call substitution maps
//! - BLAKE3-based seed hierarchy for order-independent parallel determinism
//! - Truncated-normal perturbation sampling for the robustness sweep

pub mod domain;
pub mod perturb;
pub mod rng;
pub mod solver;
