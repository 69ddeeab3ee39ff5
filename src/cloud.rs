// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Polar point cloud container and the ring-major organizer.
//!
//! A [`PointCloud`] is filled in collection order: every laser of firing 0,
//! then every laser of firing 1, and so on. [`organize`] transposes a
//! completed cloud into a `lasers × columns` grid, top laser first, using a
//! second scratch cloud so the decoder never reallocates per scan.
//!
//! ```text
//!   collection order            organized (2 lasers, 3 firings)
//!   f0c0 f0c1 f1c0 f1c1 ...  →  f0c1 f1c1 f2c1
//!                               f0c0 f1c0 f2c0
//! ```

/// A point in sensor polar coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointHVDIR {
    /// Horizontal angle in radians
    pub h: f32,
    /// Vertical angle in radians
    pub v: f32,
    /// Distance in meters, NaN when the laser saw no return
    pub d: f32,
    pub intensity: u8,
    /// Laser channel
    pub ring: u16,
}

/// Cloud metadata stamped when a scan is finalized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudHeader {
    /// Timestamp in microseconds
    pub stamp: u64,
    /// Scan sequence number
    pub seq: u32,
    pub frame_id: String,
}

/// Ordered collection of [`PointHVDIR`] with a header.
///
/// Until [`organize`] runs, `height` is 1 and `width` is the point count.
#[derive(Clone, Debug)]
pub struct PointCloud {
    pub header: CloudHeader,
    points: Vec<PointHVDIR>,
    /// False once any point carries a NaN distance
    pub is_dense: bool,
    width: u32,
    height: u32,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            header: CloudHeader::default(),
            points: Vec::with_capacity(capacity),
            is_dense: true,
            width: 0,
            height: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, point: PointHVDIR) {
        self.points.push(point);
        self.width = self.points.len() as u32;
        self.height = 1;
    }

    /// Remove all points, keeping the allocation.
    pub fn clear(&mut self) {
        self.points.clear();
        self.width = 0;
        self.height = 0;
    }

    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn points(&self) -> &[PointHVDIR] {
        &self.points
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True once the cloud has been arranged as a ring × column grid.
    pub fn is_organized(&self) -> bool {
        self.height > 1
    }

    /// Point at `row` (0 is the top laser) and `col` of an organized cloud.
    pub fn at(&self, row: usize, col: usize) -> Option<&PointHVDIR> {
        if !self.is_organized() || col >= self.width as usize {
            return None;
        }
        self.points.get(row * self.width as usize + col)
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

/// Reorder `cloud` from collection order into ring-major order.
///
/// Rows run from the highest laser index down to 0, columns keep firing
/// order. The transposed points are written into `scratch` and the two clouds
/// are swapped, so afterwards `scratch` holds the old collection-order points.
/// Trailing points that do not complete a column are dropped.
pub fn organize(cloud: &mut PointCloud, scratch: &mut PointCloud, num_lasers: usize) {
    if num_lasers == 0 {
        return;
    }

    scratch.clear();
    scratch.header.clone_from(&cloud.header);
    scratch.is_dense = cloud.is_dense;
    scratch.reserve(cloud.len());

    let width = cloud.len() / num_lasers;

    for ring in (0..num_lasers).rev() {
        for col in 0..width {
            scratch.points.push(cloud.points[col * num_lasers + ring]);
        }
    }

    std::mem::swap(cloud, scratch);

    cloud.height = num_lasers as u32;
    cloud.width = width as u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(firing: u16, ring: u16) -> PointHVDIR {
        PointHVDIR {
            h: firing as f32,
            v: ring as f32,
            d: 1.0,
            intensity: (firing * 10 + ring) as u8,
            ring,
        }
    }

    fn tags(cloud: &PointCloud) -> Vec<(u16, u16)> {
        cloud
            .points()
            .iter()
            .map(|p| (p.h as u16, p.ring))
            .collect()
    }

    #[test]
    fn test_push_clear() {
        let mut cloud = PointCloud::with_capacity(16);
        assert!(cloud.is_empty());
        assert!(cloud.is_dense);

        cloud.push(point(0, 0));
        cloud.push(point(0, 1));
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.width(), 2);
        assert_eq!(cloud.height(), 1);
        assert!(!cloud.is_organized());

        cloud.clear();
        assert!(cloud.is_empty());
        assert_eq!(cloud.width(), 0);
        assert!(cloud.capacity() >= 16);
    }

    #[test]
    fn test_organize_two_lasers() {
        let mut cloud = PointCloud::new();
        for firing in 0..3 {
            for ring in 0..2 {
                cloud.push(point(firing, ring));
            }
        }
        cloud.header = CloudHeader {
            stamp: 42,
            seq: 7,
            frame_id: "m8".to_string(),
        };

        let mut scratch = PointCloud::new();
        organize(&mut cloud, &mut scratch, 2);

        // top ring first, firing order kept within the ring
        assert_eq!(
            tags(&cloud),
            vec![(0, 1), (1, 1), (2, 1), (0, 0), (1, 0), (2, 0)]
        );
        assert_eq!(cloud.height(), 2);
        assert_eq!(cloud.width(), 3);
        assert_eq!(cloud.header.stamp, 42);
        assert_eq!(cloud.header.seq, 7);
        assert_eq!(cloud.header.frame_id, "m8");

        // scratch now holds the collection-order points
        assert_eq!(scratch.len(), 6);
        assert_eq!(tags(&scratch)[1], (0, 1));
    }

    #[test]
    fn test_organize_index_mapping() {
        let lasers = 8;
        let width = 5;
        let mut cloud = PointCloud::new();
        for firing in 0..width {
            for ring in 0..lasers {
                cloud.push(point(firing, ring));
            }
        }

        let mut scratch = PointCloud::new();
        organize(&mut cloud, &mut scratch, lasers as usize);

        for row in 0..lasers as usize {
            for col in 0..width as usize {
                let p = cloud.at(row, col).unwrap();
                assert_eq!(p.ring as usize, lasers as usize - 1 - row);
                assert_eq!(p.h as usize, col);
            }
        }
        assert!(cloud.at(0, width as usize).is_none());
    }

    #[test]
    fn test_organize_keeps_density() {
        let mut cloud = PointCloud::new();
        cloud.push(point(0, 0));
        cloud.push(point(0, 1));
        cloud.is_dense = false;

        let mut scratch = PointCloud::new();
        organize(&mut cloud, &mut scratch, 2);
        assert!(!cloud.is_dense);
    }

    #[test]
    fn test_organize_drops_partial_column() {
        let mut cloud = PointCloud::new();
        for i in 0..5 {
            cloud.push(point(i / 2, i % 2));
        }

        let mut scratch = PointCloud::new();
        organize(&mut cloud, &mut scratch, 2);
        assert_eq!(cloud.len(), 4);
        assert_eq!(cloud.width(), 2);
    }
}
