//! `er-dispatch` — choosing which ambulance answers an accident.
//!
//! # Crate layout
//!
//! | Module        | Contents                                           |
//! |---------------|----------------------------------------------------|
//! | [`ambulance`] | `Ambulance`, `AmbulanceFleet` (deployment status)  |
//! | [`fitness`]   | `Candidate`, `AccidentSite`, the fitness function  |
//! | [`genetic`]   | `GeneticDispatcher`, `Selection`                   |
//! | [`error`]     | `DispatchError`, `DispatchResult<T>`               |
//!
//! The crate knows nothing about the traffic simulator.  The caller samples
//! each available ambulance's position and congestion into a [`Candidate`]
//! and hands the list to [`GeneticDispatcher::select`].

pub mod ambulance;
pub mod error;
pub mod fitness;
pub mod genetic;


pub use ambulance::{Ambulance, AmbulanceFleet};
pub use error::{DispatchError, DispatchResult};
pub use fitness::{AccidentSite, Candidate, NEUTRAL_CONGESTION, UNREACHABLE_FITNESS, edge_bonus, fitness};
pub use genetic::{GeneticDispatcher, Selection};
