// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer
//!
//! - [`camera`]: camera session trait and the image-folder implementation

pub mod camera;
