//! ladle - Recipe-bookmark manager server.
//!
//! Serves the REST API over the persisted collection. Every mutation is
//! a coordinated read-modify-write through [`larder::Coordinator`]; the
//! handlers themselves hold no collection state.

pub mod ops;
pub mod web;
