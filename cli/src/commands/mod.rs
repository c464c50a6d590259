//! Subcommand implementations, one module per domain:
//! - `upload`: queue documents and render progress
//! - `transactions`: list, edit and delete stored transactions; list documents
//! - `export`: CSV export
//! - `stats`: dashboard totals
//! - `config`: effective configuration

pub mod config;
pub mod export;
pub mod stats;
pub mod transactions;
pub mod upload;
