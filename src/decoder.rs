// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Quanergy M8 scan assembler.
//!
//! [`M8Decoder`] consumes data packets in arrival order and returns a
//! [`PointCloud`] every time the encoder completes a revolution. Completion is
//! detected when the azimuth moves backwards relative to the spin direction,
//! which only happens where the angle wraps from `+180°` to `-180°`.
//!
//! The decoder owns two clouds: the active cloud being filled and a spare
//! used as scratch space by [`organize`]. A finished cloud is moved out to the
//! caller and a new active cloud takes its place.
//!
//! # Example
//!
//! ```ignore
//! use edgefirst_m8pub::{M8Decoder, M8DataPacket, ReturnSelection};
//!
//! let mut decoder = M8Decoder::new();
//! decoder.set_return_selection(ReturnSelection::First);
//!
//! loop {
//!     let packet = M8DataPacket::from_slice(&buf)?;
//!     match decoder.decode(&packet) {
//!         Ok(Some(cloud)) => publish(cloud),
//!         Ok(None) => {}
//!         Err(err) if err.is_fatal() => return Err(err),
//!         Err(err) => log::warn!("{}", err),
//!     }
//! }
//! ```

use crate::{
    angles::{azimuth_degrees, AngleTables},
    cloud::{organize, PointCloud, PointHVDIR},
    lidar::{Error, LidarDriver},
    m8::{
        M8DataPacket, DIRECTION_WRAP_THRESHOLD, DISTANCE_RESOLUTION, NUM_LASERS, NUM_ROT_ANGLES,
    },
    returns::{select_returns, ReturnSelection},
};
use log::{debug, trace, warn};

/// Initial last azimuth, outside the valid ±180° range.
const AZIMUTH_SENTINEL: f64 = 65000.0;

/// Decoder settings, applied with [`M8Decoder::with_config`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub return_selection: ReturnSelection,
    /// Clouds with this many points or fewer are discarded
    pub min_cloud_size: usize,
    /// Points beyond this count are dropped until the next revolution
    pub max_cloud_size: Option<usize>,
    /// Frame identifier stamped on every emitted cloud
    pub frame_id: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            return_selection: ReturnSelection::default(),
            min_cloud_size: 1,
            max_cloud_size: None,
            frame_id: String::from("quanergy"),
        }
    }
}

/// Streaming M8 packet decoder.
///
/// Every call mutates the scan state, so one capture thread owns one
/// decoder.
pub struct M8Decoder {
    tables: AngleTables,
    packet_counter: u64,
    cloud_counter: u32,
    last_azimuth: f64,
    /// Cloud being filled
    active: PointCloud,
    /// Scratch cloud swapped in and out by the organizer
    spare: PointCloud,
    /// Set when firings were skipped because the active cloud was full
    cloud_full: bool,
    return_selection: ReturnSelection,
    min_cloud_size: usize,
    max_cloud_size: usize,
    frame_id: String,
}

impl M8Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        let mut decoder = Self {
            tables: AngleTables::new(),
            packet_counter: 0,
            cloud_counter: 0,
            last_azimuth: AZIMUTH_SENTINEL,
            active: PointCloud::new(),
            spare: PointCloud::new(),
            cloud_full: false,
            return_selection: ReturnSelection::default(),
            min_cloud_size: 1,
            max_cloud_size: usize::MAX,
            frame_id: String::new(),
        };

        decoder.set_return_selection(config.return_selection);
        decoder.set_cloud_size_limits(Some(config.min_cloud_size), config.max_cloud_size);
        decoder.set_frame_id(config.frame_id);
        decoder
    }

    pub fn set_return_selection(&mut self, selection: ReturnSelection) {
        self.return_selection = selection;
    }

    /// Set the minimum and/or maximum cloud size.
    ///
    /// `None` leaves a limit unchanged. The minimum is clamped to at least 1
    /// and the maximum to at least the minimum.
    pub fn set_cloud_size_limits(&mut self, min: Option<usize>, max: Option<usize>) {
        if let Some(min) = min {
            self.min_cloud_size = min.max(1);
        }
        if let Some(max) = max {
            self.max_cloud_size = max;
        }
        self.max_cloud_size = self.max_cloud_size.max(self.min_cloud_size);
    }

    pub fn set_frame_id(&mut self, frame_id: impl Into<String>) {
        self.frame_id = frame_id.into();
    }

    pub fn return_selection(&self) -> ReturnSelection {
        self.return_selection
    }

    /// Current `(minimum, maximum)` cloud size, maximum is `usize::MAX` when
    /// unbounded.
    pub fn cloud_size_limits(&self) -> (usize, usize) {
        (self.min_cloud_size, self.max_cloud_size)
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Number of packets accepted for decoding.
    pub fn packet_count(&self) -> u64 {
        self.packet_counter
    }

    /// Number of clouds emitted so far.
    pub fn cloud_count(&self) -> u32 {
        self.cloud_counter
    }

    /// Points accumulated for the revolution in progress.
    pub fn pending_points(&self) -> usize {
        self.active.len()
    }

    pub fn angle_tables(&self) -> &AngleTables {
        &self.tables
    }

    /// Decode one packet.
    ///
    /// # Returns
    /// - `Ok(None)` while the revolution is incomplete
    /// - `Ok(Some(cloud))` when this packet completed a revolution
    /// - `Err(Error::SensorStatus)` when the sensor flagged the packet; it is
    ///   dropped without touching the decoder state
    /// - `Err(Error::FirmwareVersionMismatch)` for status 1, after which the
    ///   decoder must not be used again
    pub fn decode(&mut self, packet: &M8DataPacket) -> Result<Option<PointCloud>, Error> {
        if packet.status != 0 {
            warn!("sensor status nonzero: {}", packet.status);
            if packet.status == 1 {
                return Err(Error::FirmwareVersionMismatch);
            }
            return Err(Error::SensorStatus(packet.status));
        }

        if let Some(firing) = packet
            .firings
            .iter()
            .find(|firing| firing.position as usize > NUM_ROT_ANGLES)
        {
            return Err(Error::InvalidPacket(format!(
                "encoder position {} out of range",
                firing.position
            )));
        }

        let stamp = packet_timestamp(packet.seconds, packet.nanoseconds, packet.version);
        self.packet_counter += 1;

        let direction = spin_direction(packet.first_position(), packet.last_position()) as f64;
        let scale = distance_scale(packet.version);
        let mut result: Option<PointCloud> = None;

        for firing in &packet.firings {
            let azimuth = azimuth_degrees(firing.position);

            if direction * azimuth < direction * self.last_azimuth {
                if let Some(cloud) = self.complete_scan(stamp) {
                    if let Some(dropped) = result.replace(cloud) {
                        warn!(
                            "multiple revolutions in one packet, dropping cloud {}",
                            dropped.header.seq
                        );
                    }
                }
            }

            if self.active.len() >= self.max_cloud_size {
                self.cloud_full = true;
                self.last_azimuth = azimuth;
                continue;
            }

            let h = self.tables.horizontal(firing.position) as f32;

            for laser in 0..NUM_LASERS {
                let v = self.tables.vertical(laser) as f32;
                let selected = select_returns(
                    [
                        firing.distances[0][laser],
                        firing.distances[1][laser],
                        firing.distances[2][laser],
                    ],
                    [
                        firing.intensities[0][laser],
                        firing.intensities[1][laser],
                        firing.intensities[2][laser],
                    ],
                    self.return_selection,
                    scale,
                );

                for echo in selected.as_slice() {
                    if echo.distance.is_nan() {
                        self.active.is_dense = false;
                    }
                    self.active.push(PointHVDIR {
                        h,
                        v,
                        d: echo.distance,
                        intensity: echo.intensity,
                        ring: laser as u16,
                    });
                }
            }

            self.last_azimuth = azimuth;
        }

        Ok(result)
    }

    /// Close the revolution in progress, returning the cloud if it satisfies
    /// the size policy, and start a new one.
    fn complete_scan(&mut self, stamp: u64) -> Option<PointCloud> {
        let size = self.active.len();

        if self.cloud_full {
            warn!(
                "maximum cloud size limit of ({}) exceeded",
                self.max_cloud_size
            );
        }
        self.cloud_full = false;

        if size > self.min_cloud_size {
            self.active.header.stamp = stamp;
            self.active.header.seq = self.cloud_counter;
            self.active.header.frame_id.clone_from(&self.frame_id);

            // variable returns per laser cannot be arranged as a grid
            if self.return_selection != ReturnSelection::All {
                organize(&mut self.active, &mut self.spare, NUM_LASERS);
            }

            debug!(
                "cloud {} complete: {} points at {} us",
                self.cloud_counter, size, stamp
            );
            self.cloud_counter = self.cloud_counter.wrapping_add(1);

            return Some(std::mem::replace(
                &mut self.active,
                PointCloud::with_capacity(size),
            ));
        }

        if size > 0 {
            warn!(
                "minimum cloud size limit of ({}) not reached ({})",
                self.min_cloud_size, size
            );
        } else {
            trace!("revolution boundary with empty cloud");
        }

        self.active.clear();
        self.active.is_dense = true;
        None
    }
}

impl Default for M8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LidarDriver for M8Decoder {
    fn process_packet(&mut self, data: &[u8]) -> Result<Option<PointCloud>, Error> {
        let packet = M8DataPacket::from_slice(data)?;
        self.decode(&packet)
    }
}

/// Packet timestamp in microseconds.
///
/// Protocol versions up to 3 count sub-second ticks in 10ns units, later
/// versions in nanoseconds. Fractional microseconds are truncated.
pub fn packet_timestamp(seconds: u32, ticks: u32, version: u16) -> u64 {
    let seconds = seconds as f64 * 1e6;
    let stamp = if version <= 3 {
        seconds + ticks as f64 * 1e-2
    } else {
        seconds + ticks as f64 * 1e-3
    };
    stamp as u64
}

/// Spin direction (`1` or `-1`) from the first and last encoder positions of
/// a packet, correcting for an encoder wrap inside the packet.
pub fn spin_direction(first: u16, last: u16) -> i32 {
    let delta = first as i32 - last as i32;
    if delta > 0 {
        if delta > DIRECTION_WRAP_THRESHOLD {
            1
        } else {
            -1
        }
    } else if -delta > DIRECTION_WRAP_THRESHOLD {
        -1
    } else {
        1
    }
}

/// Raw distance to meters.
// TODO: both branches use 10mm units; confirm with Quanergy whether protocol
// version 5 changed the range resolution.
// The scale is the exact f64 0.01. Vendor tooling widens an f32 0.01
// (0.0099999998), so the last bit of some f32 distances may differ from theirs.
#[allow(clippy::if_same_then_else)]
fn distance_scale(version: u16) -> f64 {
    if version > 4 {
        DISTANCE_RESOLUTION
    } else {
        DISTANCE_RESOLUTION
    }
}
