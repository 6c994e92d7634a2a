//! Shared trip expenses: who paid what, who owes whom, and the payments that
//! settle a trip.
//!
//! The computation lives in [`balance`] and [`settlement`] and works on plain
//! in-memory records. [`service`] and [`api`] wrap it in trip, member and
//! expense bookkeeping backed by a [`repository`].

pub mod api;
pub mod balance;
pub mod config;
pub mod error;
pub mod repository;
pub mod schemas;
pub mod service;
pub mod settlement;
pub mod summary;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use balance::{compute_balances, BalanceError, MemberBalance};
pub use settlement::{compute_settlements, Settlement};
