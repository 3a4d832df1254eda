//! Terraclaim - Turn-based territory-claim agent for a tile-grid strategy game

pub mod actions;
pub mod core;
pub mod decision;
pub mod entity;
pub mod map;
pub mod transport;
pub mod turn;
pub mod view;
