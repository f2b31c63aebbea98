//! Shared test utilities for the addon-manager workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not each
//! grow their own manifest writers. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`addons`] — [`TestAddons`] builder for on-disk module trees
//! - [`literal`] — rendering of JSON values as Python literal source

pub mod addons;
pub mod literal;

pub use addons::TestAddons;
pub use literal::to_python_literal;
