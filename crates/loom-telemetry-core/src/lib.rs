// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom user-action telemetry SDK.
//!
//! This crate provides the shared data model for captured user interactions
//! and the batch wire format used to upload them. It is used by the client
//! SDK (`loom-telemetry`) and by any server-side consumer of the batch
//! payload.
//!
//! # Overview
//!
//! - [`UserAction`]: one captured interaction plus its local sync state
//! - [`ActionBatch`]: the transmission unit built fresh per flush attempt
//! - [`BufferStatistics`]: sync-state counts reported by the client buffer
//!
//! # Example
//!
//! ```
//! use loom_telemetry_core::{ActionType, UserAction};
//!
//! let action = UserAction::new(ActionType::ButtonTap, "session-1")
//!     .with_screen_name("Checkout")
//!     .with_element("buy_now", "button")
//!     .with_property("cart_size", 3);
//!
//! assert!(!action.is_synced());
//! assert_eq!(action.retry_count(), 0);
//! ```

pub mod action;
pub mod batch;
pub mod error;
pub mod stats;

pub use action::{ActionId, ActionType, UserAction, DEFAULT_MAX_RETRIES};
pub use batch::{ActionBatch, BatchId, BatchInfo, FlushReason, IdentitySnapshot, SessionInfo};
pub use error::TelemetryCoreError;
pub use stats::BufferStatistics;
