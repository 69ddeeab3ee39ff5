// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Quanergy M8 sensor model constants and data packet layout.
//!
//! The M8 is a spinning 8-laser LiDAR. Every data packet holds 50 firings,
//! each firing one encoder position plus three echoes per laser.
//!
//! # Packet Structure
//!
//! All fields are big-endian (network byte order).
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ firing[0..50]            50 × 132 bytes      │
//! │   position     u16                           │
//! │   padding      u16                           │
//! │   distances    u32 × 3 returns × 8 lasers    │
//! │   intensities  u8  × 3 returns × 8 lasers    │
//! │   status       u8  × 8 lasers                │
//! ├──────────────────────────────────────────────┤
//! │ seconds        u32                           │
//! │ nanoseconds    u32                           │
//! │ version        u16                           │
//! │ status         u16                           │
//! └──────────────────────────────────────────────┘
//! ```

use crate::lidar::Error;

/// Number of laser channels (rings)
pub const NUM_LASERS: usize = 8;

/// Number of echoes reported per laser per firing
pub const NUM_RETURNS: usize = 3;

/// Number of firings per data packet
pub const FIRING_PER_PKT: usize = 50;

/// Encoder ticks per revolution
pub const NUM_ROT_ANGLES: usize = 10400;

/// Fixed per-laser elevation in radians, laser 0 is the lowest beam.
pub const VERTICAL_ANGLES: [f64; NUM_LASERS] = [
    -0.318505,
    -0.2692,
    -0.218009,
    -0.165195,
    -0.111003,
    -0.0557982,
    0.0,
    0.0557982,
];

/// Raw distance unit in meters (10mm)
pub const DISTANCE_RESOLUTION: f64 = 0.01;

/// Position difference (in ticks) across one packet beyond which the encoder
/// is assumed to have wrapped within the packet.
pub const DIRECTION_WRAP_THRESHOLD: i32 = 4000;

/// A single firing: one encoder position and all echoes for every laser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct M8Firing {
    /// Raw encoder position in `[0, NUM_ROT_ANGLES]`
    pub position: u16,
    /// Raw distances indexed `[return][laser]`, 0 means no return
    pub distances: [[u32; NUM_LASERS]; NUM_RETURNS],
    /// Raw intensities indexed `[return][laser]`
    pub intensities: [[u8; NUM_LASERS]; NUM_RETURNS],
    /// Per-laser return status flags
    pub status: [u8; NUM_LASERS],
}

impl M8Firing {
    /// Length of a firing in bytes/octets.
    pub const LEN: usize = 132;

    /// Parse a firing from its wire representation.
    ///
    /// Only the length is checked here. The encoder position is validated by
    /// the decoder once the packet status is known to be good.
    pub fn from_slice(slice: &[u8]) -> Result<M8Firing, Error> {
        if slice.len() < Self::LEN {
            return Err(Error::UnexpectedEnd(slice.len()));
        }

        let mut firing = M8Firing {
            position: u16::from_be_bytes([slice[0], slice[1]]),
            ..Default::default()
        };

        // bytes 2-3 are padding
        let mut offset = 4;
        for distances in firing.distances.iter_mut() {
            for distance in distances.iter_mut() {
                *distance = u32::from_be_bytes([
                    slice[offset],
                    slice[offset + 1],
                    slice[offset + 2],
                    slice[offset + 3],
                ]);
                offset += 4;
            }
        }

        for intensities in firing.intensities.iter_mut() {
            intensities.copy_from_slice(&slice[offset..offset + NUM_LASERS]);
            offset += NUM_LASERS;
        }

        firing
            .status
            .copy_from_slice(&slice[offset..offset + NUM_LASERS]);

        Ok(firing)
    }

    /// Append the wire representation of this firing to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.position.to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        for distances in &self.distances {
            for distance in distances {
                out.extend_from_slice(&distance.to_be_bytes());
            }
        }
        for intensities in &self.intensities {
            out.extend_from_slice(intensities);
        }
        out.extend_from_slice(&self.status);
    }
}

/// A complete M8 data packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct M8DataPacket {
    pub firings: [M8Firing; FIRING_PER_PKT],
    /// Whole seconds of the packet timestamp
    pub seconds: u32,
    /// Sub-second ticks: 10ns units for version <= 3, nanoseconds after
    pub nanoseconds: u32,
    /// Packet protocol version
    pub version: u16,
    /// Sensor status, nonzero means the sensor is in error
    pub status: u16,
}

impl M8DataPacket {
    /// Length of a data packet in bytes/octets.
    pub const LEN: usize = FIRING_PER_PKT * M8Firing::LEN + 12;

    pub fn from_slice(slice: &[u8]) -> Result<M8DataPacket, Error> {
        if slice.len() < Self::LEN {
            return Err(Error::UnexpectedEnd(slice.len()));
        }

        let mut packet = M8DataPacket::default();
        for (index, firing) in packet.firings.iter_mut().enumerate() {
            let start = index * M8Firing::LEN;
            *firing = M8Firing::from_slice(&slice[start..start + M8Firing::LEN])?;
        }

        let tail = &slice[FIRING_PER_PKT * M8Firing::LEN..Self::LEN];
        packet.seconds = u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]);
        packet.nanoseconds = u32::from_be_bytes([tail[4], tail[5], tail[6], tail[7]]);
        packet.version = u16::from_be_bytes([tail[8], tail[9]]);
        packet.status = u16::from_be_bytes([tail[10], tail[11]]);

        Ok(packet)
    }

    /// Serialize the packet into its wire representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        for firing in &self.firings {
            firing.write_to(&mut out);
        }
        out.extend_from_slice(&self.seconds.to_be_bytes());
        out.extend_from_slice(&self.nanoseconds.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.status.to_be_bytes());
        out
    }

    pub fn first_position(&self) -> u16 {
        self.firings[0].position
    }

    pub fn last_position(&self) -> u16 {
        self.firings[FIRING_PER_PKT - 1].position
    }
}

impl Default for M8DataPacket {
    fn default() -> Self {
        Self {
            firings: [M8Firing::default(); FIRING_PER_PKT],
            seconds: 0,
            nanoseconds: 0,
            version: 0,
            status: 0,
        }
    }
}
