//! Core rust implementation of dfba.rs, a crate for dynamic flux balance analysis
//! driven by an external constraint-based solver.
#![allow(unused)]

pub mod configuration;
pub mod dfba;
pub mod io;
pub mod kinetics;
pub mod metabolic_model;
pub mod optimize;
