//! `courier-grid` — tile grid and pathfinding.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`grid`]  | `Grid` — immutable tile matrix, loaders, zone scans       |
//! | [`astar`] | `find_path` (A*), `distance`, `longest_path` probe        |
//! | [`error`] | `GridError`, `GridResult<T>`                              |
//!
//! Pathfinding treats the grid as static and takes the **dynamic** obstacle
//! set (tiles currently hosting other agents) as a per-query parameter, so
//! the same grid value serves every query for the whole session.

pub mod astar;
pub mod error;
pub mod grid;


pub use astar::{distance, find_path, longest_path, Path};
pub use error::{GridError, GridResult};
pub use grid::Grid;
