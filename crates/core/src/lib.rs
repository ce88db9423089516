// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! es-core: Shared library for the edgesync store-and-forward layer
//!
//! This crate provides the data structures and durable SQLite storage used by
//! the `edgesync` services and the `edgesyncd` daemon: queued mutations, the
//! versioned cache stores, and the sync health record.

pub mod db;
pub mod entry;
pub mod error;
pub mod http;
pub mod status;

pub use db::Database;
pub use entry::{EntryId, EntryState, NewEntry, OperationType, SyncEntry};
pub use error::{Error, Result};
pub use http::{Method, Request, Response};
pub use status::{QueueCounts, SyncRecord};
