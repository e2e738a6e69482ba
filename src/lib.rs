//! Core of the iFinance admin console: a key/value backed record store,
//! repositories with name-reference cascades, a searchable list model and
//! entity forms with three save modes.

pub mod commands;
pub mod config;
pub mod departments;
pub mod error;
pub mod forms;
pub mod listing;
pub mod lookups;
pub mod models;
pub mod pages;
pub mod repository;
pub mod seeds;
pub mod session;
pub mod storage;
pub mod tui;
