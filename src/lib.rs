// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! EdgeFirst M8 Publisher Library
//!
//! Decodes Quanergy M8 data packets into timestamped polar point clouds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌───────────────┐     ┌─────────────────┐
//! │  M8DataPacket   │ ──► │   M8Decoder   │ ──► │   PointCloud    │
//! │  (from bytes)   │     │ (scan state)  │     │ (caller-owned)  │
//! └─────────────────┘     └───────────────┘     └─────────────────┘
//!                           │          │                │
//!                           ▼          ▼                ▼
//!                     AngleTables  select_returns   formats::to_xyz
//! ```
//!
//! The decoder keeps its streaming state across calls:
//! 1. Caller creates a decoder: `M8Decoder::with_config(config)`
//! 2. Caller feeds packets in order: `decoder.decode(&packet)`
//! 3. When a revolution completes (returns `Ok(Some(cloud))`), the caller owns
//!    the cloud and the decoder starts filling a new one
//! 4. `Err` with [`Error::is_fatal`] set means the decoder must be dropped
//!
//! # Modules
//!
//! - [`angles`]: Horizontal and vertical angle lookup tables
//! - [`cloud`]: Polar point cloud container and ring-major organizer
//! - [`decoder`]: Scan assembler
//! - [`formats`]: Cartesian conversion and packed point formatting
//! - [`lidar`]: Common types, trait and error handling
//! - [`m8`]: Sensor constants and packet layout
//! - [`returns`]: Echo selection policy

pub mod angles;
pub mod cloud;
pub mod decoder;
pub mod formats;
pub mod lidar;
pub mod m8;
pub mod returns;

// Re-exports for convenience
pub use cloud::{CloudHeader, PointCloud, PointHVDIR};
pub use decoder::{DecoderConfig, M8Decoder};
pub use lidar::{Error, LidarDriver, Points};
pub use m8::{M8DataPacket, M8Firing};
pub use returns::ReturnSelection;
