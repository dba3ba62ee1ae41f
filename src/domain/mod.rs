//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod position;
pub mod account;
pub mod execution;
pub mod event;
pub mod config;
pub mod config_validation;
pub mod simulation;
pub mod metrics;
pub mod search;
pub mod error;
