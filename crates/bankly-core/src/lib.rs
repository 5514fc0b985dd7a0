// ABOUTME: Core types and constants for the Bankly identity server bootstrap
// ABOUTME: Foundation crate with error handling, constants, and resource catalog models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Bankly Core
//!
//! Foundation crate shared by the bootstrap library and its binaries. It carries
//! no database or runtime dependencies unless the `database-errors` feature is on.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `AppResult`
//! - **constants**: Configuration keys, defaults and service names
//! - **models**: Static resource catalog entries (clients, resources, scopes)

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Resource catalog data models
pub mod models;
