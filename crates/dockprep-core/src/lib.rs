//! # dockprep Core Library
//!
//! A library for preparing macromolecular receptor structures for molecular docking,
//! covering structural repair, partial-charge assignment, and cleanup of non-essential
//! atoms, with PDBQT output suitable for AutoDock-family programs.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers with a strict separation of concerns:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`), the
//!   chemistry toolbox (bond inference, hydrogen placement, Gasteiger charges), and
//!   structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** Preparation policies and their application:
//!   repair, charge, and cleanup configuration, plus progress reporting.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It ties
//!   the `engine` and `core` together into the complete receptor preparation
//!   procedure invoked by front ends.

pub mod core;
pub mod engine;
pub mod workflows;
