// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for async frame analysis
//!
//! Turns camera frames into detection batches. Currently implements QR code
//! detection only.

pub mod tasks;

pub use tasks::QrDetector;
