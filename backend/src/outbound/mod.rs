//! Outbound adapters: concrete implementations of the domain's driven ports.

pub mod persistence;
