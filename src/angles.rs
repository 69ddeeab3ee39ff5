// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Precomputed horizontal and vertical angle lookup tables.
//!
//! The horizontal table maps a raw encoder tick to a signed angle in radians.
//! Ticks are shifted by half a revolution before normalizing, so tick 0 maps
//! to 0 rad and the `±π` discontinuity sits at the middle of the table. The
//! table increases strictly on either side of that midpoint, and the first
//! and last entries are equal.
//!
//! The vertical table is the per-laser elevation copied from the sensor model.

use crate::m8::{NUM_ROT_ANGLES, VERTICAL_ANGLES};
use std::f64::consts::PI;

/// Immutable angle lookup tables for one sensor model.
#[derive(Clone, Debug)]
pub struct AngleTables {
    rot_angles: usize,
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
}

impl AngleTables {
    /// Build the tables for the M8.
    pub fn new() -> Self {
        Self::for_model(NUM_ROT_ANGLES, &VERTICAL_ANGLES)
    }

    /// Build the tables for a sensor with `rot_angles` encoder ticks per
    /// revolution and the given per-laser elevations.
    ///
    /// The horizontal table has `rot_angles + 1` entries so the encoder value
    /// equal to a full revolution is addressable.
    ///
    /// # Panics
    ///
    /// Panics if `rot_angles` is zero.
    pub fn for_model(rot_angles: usize, vertical: &[f64]) -> Self {
        assert!(rot_angles > 0, "encoder must have at least one tick");

        let horizontal = (0..=rot_angles)
            .map(|tick| {
                let shifted = (tick + rot_angles / 2) % rot_angles;
                let normalized = shifted as f64 / rot_angles as f64;
                normalized * 2.0 * PI - PI
            })
            .collect();

        Self {
            rot_angles,
            horizontal,
            vertical: vertical.to_vec(),
        }
    }

    /// Horizontal angle in radians for a raw encoder position.
    ///
    /// # Panics
    ///
    /// Panics if `position` exceeds the number of encoder ticks.
    #[inline]
    pub fn horizontal(&self, position: u16) -> f64 {
        self.horizontal[position as usize]
    }

    /// Vertical angle in radians for a laser channel.
    #[inline]
    pub fn vertical(&self, laser: usize) -> f64 {
        self.vertical[laser]
    }

    pub fn horizontal_table(&self) -> &[f64] {
        &self.horizontal
    }

    pub fn vertical_table(&self) -> &[f64] {
        &self.vertical
    }

    pub fn num_lasers(&self) -> usize {
        self.vertical.len()
    }

    pub fn rot_angles(&self) -> usize {
        self.rot_angles
    }
}

impl Default for AngleTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Azimuth in degrees for a raw M8 encoder position, using the same half
/// revolution shift as the horizontal table.
#[inline]
pub fn azimuth_degrees(position: u16) -> f64 {
    let shifted = (position as usize + NUM_ROT_ANGLES / 2) % NUM_ROT_ANGLES;
    shifted as f64 / NUM_ROT_ANGLES as f64 * 360.0 - 180.0
}
