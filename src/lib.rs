//! Booking lifecycle and availability engine.
//!
//! `tessera` manages bookable resources (rooms, equipment, vehicles)
//! reserved over half-open time intervals. It enforces that no two active
//! bookings on the same resource overlap, drives the booking status state
//! machine, and derives open availability windows from weekly recurring
//! schedules. Persistence, event delivery, and the wall clock are injected
//! through the [`store`], [`notify`], and [`clock`] traits; a surrounding
//! service adapts the [`Engine`] operations to its own protocol.

pub mod clock;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod schedule;
pub mod store;
pub mod sweeper;

pub use engine::{Engine, EngineError};
