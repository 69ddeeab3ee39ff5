// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Return (echo) selection policy.
//!
//! Each laser reports up to three echoes per firing. Slot 0 holds the
//! strongest return, slot 1 the first and slot 2 the last. A
//! [`ReturnSelection`] decides which of them become points.

use crate::m8::NUM_RETURNS;
use clap::ValueEnum;
use std::fmt;

/// Which echoes to keep from every firing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[repr(u8)]
pub enum ReturnSelection {
    /// Strongest return only (slot 0)
    #[default]
    Strongest = 0,
    /// First return only (slot 1)
    First = 1,
    /// Last return only (slot 2)
    Last = 2,
    /// All distinct, valid returns. Clouds cannot be organized in this mode.
    All = 3,
}

impl ReturnSelection {
    /// Echo slot for single-return modes, `None` for [`ReturnSelection::All`].
    pub fn slot(&self) -> Option<usize> {
        match self {
            ReturnSelection::All => None,
            other => Some(*other as usize),
        }
    }
}

impl fmt::Display for ReturnSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReturnSelection::Strongest => write!(f, "strongest"),
            ReturnSelection::First => write!(f, "first"),
            ReturnSelection::Last => write!(f, "last"),
            ReturnSelection::All => write!(f, "all"),
        }
    }
}

/// A selected echo, distance in meters or NaN when the sensor saw nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Echo {
    pub distance: f32,
    pub intensity: u8,
}

/// Up to [`NUM_RETURNS`] echoes selected for one laser in one firing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Selected {
    echoes: [Echo; NUM_RETURNS],
    len: usize,
}

impl Selected {
    #[inline]
    fn push(&mut self, distance: f32, intensity: u8) {
        self.echoes[self.len] = Echo {
            distance,
            intensity,
        };
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[Echo] {
        &self.echoes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Raw distance scaled to meters, rounded once to `f32`.
#[inline]
fn to_meters(raw: u32, scale: f64) -> f32 {
    (raw as f32 as f64 * scale) as f32
}

/// Select the echoes of one laser channel.
///
/// `distances` and `intensities` are the three slots for the channel, raw
/// distances are multiplied by `scale` to get meters.
///
/// Single-slot modes always yield exactly one echo, NaN if the raw distance
/// is zero. [`ReturnSelection::All`] never yields NaN: zero distances are
/// skipped and slots 1 and 2 are dropped when they repeat slot 0's range.
/// Slots 1 and 2 carry slot 0's intensity in that mode.
pub fn select_returns(
    distances: [u32; NUM_RETURNS],
    intensities: [u8; NUM_RETURNS],
    selection: ReturnSelection,
    scale: f64,
) -> Selected {
    let mut selected = Selected::default();

    match selection.slot() {
        Some(slot) => {
            let distance = match distances[slot] {
                0 => f32::NAN,
                raw => to_meters(raw, scale),
            };
            selected.push(distance, intensities[slot]);
        }
        None => {
            let strongest = distances[0];
            let intensity = intensities[0];
            if strongest != 0 {
                selected.push(to_meters(strongest, scale), intensity);
            }
            for &raw in &distances[1..] {
                if raw != 0 && raw != strongest {
                    selected.push(to_meters(raw, scale), intensity);
                }
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: f64 = 0.01;

    #[test]
    fn test_single_slot_modes() {
        let distances = [1000, 2000, 3000];
        let intensities = [10, 20, 30];

        for (selection, meters, intensity) in [
            (ReturnSelection::Strongest, 10.0, 10),
            (ReturnSelection::First, 20.0, 20),
            (ReturnSelection::Last, 30.0, 30),
        ] {
            let selected = select_returns(distances, intensities, selection, SCALE);
            assert_eq!(selected.len(), 1);
            let echo = selected.as_slice()[0];
            assert!((echo.distance - meters).abs() < 1e-4);
            assert_eq!(echo.intensity, intensity);
        }
    }

    #[test]
    fn test_to_meters_rounds_once() {
        assert_eq!(to_meters(12_345, 0.01), 123.45f32);
        assert_eq!(to_meters(1, 0.01), 0.01f32);
        assert_eq!(to_meters(10_000, 0.01), 100.0f32);
        // widening an f32 scale first gives a slightly smaller value
        assert!((12_345.0 * (0.01f32 as f64)) < 123.45);
    }

    #[test]
    fn test_single_slot_no_return_is_nan() {
        let selected = select_returns([0, 500, 0], [1, 2, 3], ReturnSelection::Strongest, SCALE);
        assert_eq!(selected.len(), 1);
        assert!(selected.as_slice()[0].distance.is_nan());
        assert_eq!(selected.as_slice()[0].intensity, 1);
    }

    #[test]
    fn test_all_distinct() {
        let selected = select_returns([1000, 900, 1100], [50, 20, 30], ReturnSelection::All, SCALE);
        let echoes = selected.as_slice();
        assert_eq!(echoes.len(), 3);
        assert!((echoes[0].distance - 10.0).abs() < 1e-4);
        assert!((echoes[1].distance - 9.0).abs() < 1e-4);
        assert!((echoes[2].distance - 11.0).abs() < 1e-4);
        // slots 1 and 2 report the strongest return's intensity
        assert!(echoes.iter().all(|e| e.intensity == 50));
    }

    #[test]
    fn test_all_suppresses_duplicates() {
        let selected = select_returns([1000, 1000, 1200], [5, 6, 7], ReturnSelection::All, SCALE);
        let echoes = selected.as_slice();
        assert_eq!(echoes.len(), 2);
        assert!((echoes[1].distance - 12.0).abs() < 1e-4);

        let selected = select_returns([1000, 1000, 1000], [5, 6, 7], ReturnSelection::All, SCALE);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_all_never_nan() {
        let selected = select_returns([0, 0, 0], [5, 6, 7], ReturnSelection::All, SCALE);
        assert!(selected.is_empty());

        // strongest missing, later echoes still kept
        let selected = select_returns([0, 300, 0], [5, 6, 7], ReturnSelection::All, SCALE);
        assert_eq!(selected.len(), 1);
        assert!(!selected.as_slice()[0].distance.is_nan());
        assert_eq!(selected.as_slice()[0].intensity, 5);
    }

    #[test]
    fn test_slots() {
        assert_eq!(ReturnSelection::Strongest.slot(), Some(0));
        assert_eq!(ReturnSelection::First.slot(), Some(1));
        assert_eq!(ReturnSelection::Last.slot(), Some(2));
        assert_eq!(ReturnSelection::All.slot(), None);
        assert_eq!(ReturnSelection::default(), ReturnSelection::Strongest);
        assert_eq!(ReturnSelection::Last.to_string(), "last");
    }
}
