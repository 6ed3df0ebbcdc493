//! Core billing logic for Telbill.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain calculations and validation rules live here.
//!
//! # Modules
//!
//! - `rates` - Tiered rate calculation for phone and internet usage
//! - `payment` - Payment settlement math (partial payments, capping)
//! - `import` - CSV batch-import row parsing and validation
//! - `auth` - Password hashing

pub mod auth;
pub mod import;
pub mod payment;
pub mod rates;
