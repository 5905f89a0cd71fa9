//! # datafilter-contracts
//!
//! Shared types and the error taxonomy for the datafilter row-level access
//! engine.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only data definitions, constructors and the error type.

pub mod access;
pub mod basis;
pub mod error;
pub mod filter;
pub mod grant;
pub mod principal;
