// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Polar to Cartesian conversion and packed point formatting.
//!
//! Decoded clouds are in sensor polar form. [`to_xyz`] converts them into the
//! structure-of-arrays [`Points`] layout, and [`format_points_13byte`] packs
//! that into the byte layout used by PointCloud2 consumers.
//!
//! # 13-byte format (xyz + intensity)
//! ```text
//! ┌───────┬───────┬───────┬───────────┐
//! │ x:f32 │ y:f32 │ z:f32 │ intensity │
//! │ 4B    │ 4B    │ 4B    │ 1B        │
//! └───────┴───────┴───────┴───────────┘
//! ```

use crate::{cloud::PointCloud, lidar::Points};

/// Convert a polar cloud into Cartesian coordinates.
///
/// `x` points forward at zero horizontal angle, `z` up. NaN distances give
/// NaN coordinates so organized clouds keep their grid shape. The output is
/// cleared first and keeps its allocation across calls.
pub fn to_xyz(cloud: &PointCloud, out: &mut Points) {
    out.clear();

    for point in cloud.points() {
        let (sin_h, cos_h) = point.h.sin_cos();
        let (sin_v, cos_v) = point.v.sin_cos();
        let planar = point.d * cos_v;

        out.push(
            planar * cos_h,
            planar * sin_h,
            point.d * sin_v,
            point.intensity,
        );
    }
}

/// Format point cloud data into 13-byte packed format (XYZ + intensity).
///
/// # Returns
///
/// A vector of bytes in packed 13-byte-per-point format.
pub fn format_points_13byte(points: &Points) -> Vec<u8> {
    let mut data = vec![0u8; 13 * points.len()];
    format_points_13byte_into(points, &mut data);
    data
}

/// Format point cloud data into a pre-allocated buffer (13-byte format).
///
/// # Panics
///
/// Panics if `out` is smaller than `13 * points.len()` bytes.
pub fn format_points_13byte_into(points: &Points, out: &mut [u8]) {
    let n_points = points.len();
    assert!(out.len() >= 13 * n_points);

    for index in 0..n_points {
        let offset = index * 13;
        out[offset..offset + 4].copy_from_slice(&points.x[index].to_le_bytes());
        out[offset + 4..offset + 8].copy_from_slice(&points.y[index].to_le_bytes());
        out[offset + 8..offset + 12].copy_from_slice(&points.z[index].to_le_bytes());
        out[offset + 12] = points.intensity[index];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::PointHVDIR;
    use std::f32::consts::FRAC_PI_2;

    fn cloud_of(points: &[PointHVDIR]) -> PointCloud {
        let mut cloud = PointCloud::new();
        for &p in points {
            cloud.push(p);
        }
        cloud
    }

    #[test]
    fn test_to_xyz_axes() {
        let cloud = cloud_of(&[
            PointHVDIR {
                h: 0.0,
                v: 0.0,
                d: 2.0,
                intensity: 10,
                ring: 6,
            },
            PointHVDIR {
                h: FRAC_PI_2,
                v: 0.0,
                d: 3.0,
                intensity: 20,
                ring: 6,
            },
            PointHVDIR {
                h: 0.0,
                v: FRAC_PI_2,
                d: 4.0,
                intensity: 30,
                ring: 6,
            },
        ]);

        let mut points = Points::default();
        to_xyz(&cloud, &mut points);
        assert_eq!(points.len(), 3);

        assert!((points.x[0] - 2.0).abs() < 1e-6);
        assert!(points.y[0].abs() < 1e-6);
        assert!(points.z[0].abs() < 1e-6);

        assert!(points.x[1].abs() < 1e-5);
        assert!((points.y[1] - 3.0).abs() < 1e-6);

        assert!(points.x[2].abs() < 1e-5);
        assert!((points.z[2] - 4.0).abs() < 1e-6);
        assert_eq!(points.intensity, vec![10, 20, 30]);
    }

    #[test]
    fn test_to_xyz_nan_propagates() {
        let cloud = cloud_of(&[PointHVDIR {
            h: 0.3,
            v: -0.1,
            d: f32::NAN,
            intensity: 0,
            ring: 1,
        }]);

        let mut points = Points::with_capacity(1);
        to_xyz(&cloud, &mut points);
        assert!(points.x[0].is_nan());
        assert!(points.y[0].is_nan());
        assert!(points.z[0].is_nan());
    }

    #[test]
    fn test_format_points_13byte() {
        let mut points = Points::default();
        points.push(1.0, 10.0, 100.0, 128);
        points.push(5.0, 50.0, 500.0, 100);

        let data = format_points_13byte(&points);
        assert_eq!(data.len(), 13 * 2);

        let x0 = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let z0 = f32::from_le_bytes([data[8], data[9], data[10], data[11]]);
        assert_eq!(x0, 1.0);
        assert_eq!(z0, 100.0);
        assert_eq!(data[12], 128);

        let y1 = f32::from_le_bytes([data[17], data[18], data[19], data[20]]);
        assert_eq!(y1, 50.0);
        assert_eq!(data[25], 100);
    }

    #[test]
    #[should_panic]
    fn test_format_into_too_small() {
        let mut points = Points::default();
        points.push(1.0, 2.0, 3.0, 4);
        let mut out = [0u8; 12];
        format_points_13byte_into(&points, &mut out);
    }
}
