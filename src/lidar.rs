// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Common LiDAR types, error handling and the driver trait.
//!
//! The decoder reports two very different kinds of failure through the same
//! [`Error`] type: a sensor status of `1` means the firmware speaks a protocol
//! this decoder does not understand and the decoder must not be used any
//! further, while every other nonzero status only drops the current packet.
//! Use [`Error::is_fatal`] to tell them apart.

use crate::cloud::PointCloud;
use std::fmt;

/// Cartesian point cloud in structure-of-arrays layout.
///
/// Filled by [`crate::formats::to_xyz`] from a decoded [`PointCloud`] and
/// consumed by the packed formatters in [`crate::formats`].
#[derive(Clone, Debug, Default)]
pub struct Points {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub intensity: Vec<u8>,
}

impl Points {
    /// Create an empty Points structure with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
        }
    }

    /// Append a single point
    #[inline]
    pub fn push(&mut self, x: f32, y: f32, z: f32, intensity: u8) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.intensity.push(intensity);
    }

    /// Clear all points while retaining capacity
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.intensity.clear();
    }

    /// Get the current number of points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Common error type for LiDAR operations
#[derive(Debug)]
pub enum Error {
    /// I/O error (capture file, socket)
    Io(std::io::Error),
    /// Unexpected end of data at given byte position
    UnexpectedEnd(usize),
    /// Invalid packet data
    InvalidPacket(String),
    /// Sensor reported a nonzero status, the packet was dropped
    SensorStatus(u16),
    /// Sensor firmware and decoder protocol versions do not match.
    ///
    /// This is unrecoverable: the decoder instance must not be used again.
    FirmwareVersionMismatch,
}

impl Error {
    /// Returns true if processing must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FirmwareVersionMismatch)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::UnexpectedEnd(len) => write!(f, "unexpected end of data at {} bytes", len),
            Error::InvalidPacket(msg) => write!(f, "invalid packet: {}", msg),
            Error::SensorStatus(status) => write!(f, "sensor status nonzero: {}", status),
            Error::FirmwareVersionMismatch => {
                write!(f, "sensor firmware version does not match decoder protocol")
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Trait for byte-oriented LiDAR driver implementations
///
/// Implementations handle packet parsing, scan assembly and point cloud
/// construction internally.
pub trait LidarDriver: Send {
    /// Process a raw packet, returning a complete cloud when ready
    ///
    /// # Returns
    /// - `Ok(None)` if more packets are needed to complete the scan
    /// - `Ok(Some(cloud))` when a complete scan is ready
    /// - `Err` on packet parsing errors or sensor faults
    fn process_packet(&mut self, data: &[u8]) -> Result<Option<PointCloud>, Error>;
}
