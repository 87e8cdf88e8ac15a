//! Neutral voxel model produced by the codec.
//!
//! `Creature` is the handoff type for downstream mesh builders: a sparse
//! voxel map, the palette its indices refer to, and the bounds grown while
//! decoding. `VoxelGrid` is the dense view a mesher consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer voxel coordinate `[x, y, z]`.
pub type Point3 = [i32; 3];

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 8-bit components (`value / 255`).
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Quantize back to 8-bit components, clamping out-of-range values.
    pub fn to_bytes(self) -> [u8; 3] {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Ordered color table indexed by voxel color indices.
///
/// # Examples
/// ```
/// use voxcritter_core::{Palette, Rgb};
///
/// let palette = Palette::default();
/// assert_eq!(palette.colors(), &[Rgb::BLACK]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![Rgb::BLACK],
        }
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<Rgb> {
        self.colors.get(index as usize).copied()
    }

    /// Color for `index`, falling back to the first entry (or black) when the
    /// index is outside the palette.
    pub fn color_for(&self, index: u32) -> Rgb {
        self.get(index)
            .or_else(|| self.colors.first().copied())
            .unwrap_or(Rgb::BLACK)
    }
}

/// Sparse voxel positions mapped to palette indices.
///
/// Positions not present read as 0 (air). Iteration is in coordinate order so
/// reports stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelMap {
    cells: BTreeMap<Point3, u32>,
}

impl VoxelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color index at `position`, returning the previous one.
    pub fn insert(&mut self, position: Point3, color: u32) -> Option<u32> {
        self.cells.insert(position, color)
    }

    pub fn get(&self, position: Point3) -> Option<u32> {
        self.cells.get(&position).copied()
    }

    /// Color index at `position`, 0 when unset.
    pub fn color_index(&self, position: Point3) -> u32 {
        self.get(position).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point3, u32)> + '_ {
        self.cells.iter().map(|(position, color)| (*position, *color))
    }
}

impl FromIterator<(Point3, u32)> for VoxelMap {
    fn from_iter<I: IntoIterator<Item = (Point3, u32)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Axis-aligned integer box around the decoded voxels.
///
/// Starts at `(-1,-1,-1)..(1,1,1)` and only ever grows, so the origin is
/// always inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point3,
    pub max: Point3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: [-1, -1, -1],
            max: [1, 1, 1],
        }
    }
}

impl Bounds {
    /// Widen the box so that it contains `position`.
    pub fn include(&mut self, position: Point3) {
        for axis in 0..3 {
            let value = position[axis];
            if value < 0 && value < self.min[axis] {
                self.min[axis] = value;
            }
            if value > 0 && value > self.max[axis] {
                self.max[axis] = value;
            }
        }
    }

    pub fn contains(&self, position: Point3) -> bool {
        (0..3).all(|axis| self.min[axis] <= position[axis] && position[axis] <= self.max[axis])
    }

    /// Copy of the box grown by `margin` cells on every side.
    pub fn padded(&self, margin: i32) -> Bounds {
        Bounds {
            min: self.min.map(|v| v.saturating_sub(margin)),
            max: self.max.map(|v| v.saturating_add(margin)),
        }
    }

    /// Number of cells along each axis (inclusive on both ends).
    pub fn size(&self) -> [usize; 3] {
        [0, 1, 2].map(|axis| {
            let cells = (i64::from(self.max[axis]) - i64::from(self.min[axis]) + 1).max(0);
            usize::try_from(cells).unwrap_or(usize::MAX)
        })
    }
}

/// Decoded creature: geometry, palette and bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Creature {
    pub voxels: VoxelMap,
    pub palette: Palette,
    pub bounds: Bounds,
}

impl Creature {
    /// Color of the voxel at `position`, or `None` for air.
    pub fn color_at(&self, position: Point3) -> Option<Rgb> {
        self.voxels
            .get(position)
            .map(|index| self.palette.color_for(index))
    }

    /// Dense grid view; see [`VoxelGrid::from_creature`].
    pub fn grid(&self) -> Result<VoxelGrid, GridError> {
        VoxelGrid::from_creature(self)
    }

    /// Voxels holding a non-zero palette index, i.e. the solid cells of the
    /// dense grid, counted without building it.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|(_, color)| *color != 0).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid of {size:?} cells exceeds the {limit} cell limit")]
    TooLarge { size: [usize; 3], limit: usize },
}

/// Dense voxel grid covering a creature's bounds plus a one-cell margin.
///
/// Cells are stored x-fastest: `x + size_x * (y + size_y * z)`, relative to
/// `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelGrid {
    origin: Point3,
    size: [usize; 3],
    cells: Vec<u32>,
}

impl VoxelGrid {
    pub const MARGIN: i32 = 1;
    /// Largest grid `from_creature` allocates (64 MiB of cells).
    pub const MAX_CELLS: usize = 1 << 24;

    /// Build the padded dense grid for `creature`.
    ///
    /// Bounds grow by up to 31 cells per axis for every few payload
    /// characters, so a short payload can describe a huge box.
    ///
    /// # Errors
    /// Returns `GridError::TooLarge` when the grid would hold more than
    /// [`VoxelGrid::MAX_CELLS`] cells.
    pub fn from_creature(creature: &Creature) -> Result<Self, GridError> {
        let extent = creature.bounds.padded(Self::MARGIN);
        let size = extent.size();
        let count = size[0]
            .checked_mul(size[1])
            .and_then(|cells| cells.checked_mul(size[2]))
            .filter(|cells| *cells <= Self::MAX_CELLS)
            .ok_or(GridError::TooLarge {
                size,
                limit: Self::MAX_CELLS,
            })?;
        let mut cells = vec![0u32; count];
        for (position, color) in creature.voxels.iter() {
            if let Some(index) = linear_index(extent.min, size, position) {
                cells[index] = color;
            }
        }
        Ok(Self {
            origin: extent.min,
            size,
            cells,
        })
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Palette index at `position`; 0 outside the grid.
    pub fn get(&self, position: Point3) -> u32 {
        linear_index(self.origin, self.size, position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(0)
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != 0).count()
    }
}

fn linear_index(origin: Point3, size: [usize; 3], position: Point3) -> Option<usize> {
    let mut offset = [0usize; 3];
    for axis in 0..3 {
        let rel = usize::try_from(position[axis] - origin[axis]).ok()?;
        if rel >= size[axis] {
            return None;
        }
        offset[axis] = rel;
    }
    Some(offset[0] + size[0] * (offset[1] + size[1] * offset[2]))
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Creature, GridError, Palette, Rgb, VoxelGrid, VoxelMap};

    #[test]
    fn bounds_grow_monotonically() {
        let mut bounds = Bounds::default();
        bounds.include([3, -2, 0]);
        bounds.include([1, 1, -5]);
        bounds.include([0, 0, 0]);
        assert_eq!(bounds.min, [-1, -2, -5]);
        assert_eq!(bounds.max, [3, 1, 1]);
        assert!(bounds.contains([0, 0, 0]));
    }

    #[test]
    fn bounds_size_is_inclusive() {
        assert_eq!(Bounds::default().size(), [3, 3, 3]);
        assert_eq!(Bounds::default().padded(1).size(), [5, 5, 5]);
    }

    #[test]
    fn palette_color_for_falls_back_to_first_entry() {
        let palette = Palette::new(vec![Rgb::from_bytes(255, 0, 0), Rgb::from_bytes(0, 255, 0)]);
        assert_eq!(palette.color_for(1), Rgb::new(0.0, 1.0, 0.0));
        assert_eq!(palette.color_for(9), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(Palette::new(Vec::new()).color_for(0), Rgb::BLACK);
    }

    #[test]
    fn rgb_bytes_round_trip() {
        let color = Rgb::from_bytes(0x12, 0xab, 0xff);
        assert_eq!(color.to_bytes(), [0x12, 0xab, 0xff]);
        assert_eq!(Rgb::new(1.5, -0.2, 0.5).to_bytes(), [255, 0, 128]);
    }

    #[test]
    fn voxel_map_reads_air_as_zero() {
        let mut voxels = VoxelMap::new();
        voxels.insert([1, 2, 3], 4);
        assert_eq!(voxels.color_index([1, 2, 3]), 4);
        assert_eq!(voxels.color_index([0, 0, 0]), 0);
        assert_eq!(voxels.insert([1, 2, 3], 5), Some(4));
        assert_eq!(voxels.len(), 1);
    }

    #[test]
    fn grid_pads_bounds_and_places_voxels() {
        let mut creature = Creature::default();
        creature.voxels.insert([2, 0, 0], 3);
        creature.bounds.include([2, 0, 0]);
        creature.voxels.insert([-1, 1, 0], 1);

        let grid = VoxelGrid::from_creature(&creature).unwrap();
        assert_eq!(grid.origin(), [-2, -2, -2]);
        assert_eq!(grid.size(), [6, 5, 5]);
        assert_eq!(grid.cells().len(), 150);
        assert_eq!(grid.get([2, 0, 0]), 3);
        assert_eq!(grid.get([-1, 1, 0]), 1);
        assert_eq!(grid.get([0, 0, 0]), 0);
        assert_eq!(grid.get([50, 0, 0]), 0);
        assert_eq!(grid.solid_count(), 2);
        assert_eq!(creature.solid_count(), 2);
    }

    #[test]
    fn grid_rejects_oversized_bounds() {
        let mut creature = Creature::default();
        for step in 1..=100 {
            let position = [31 * step; 3];
            creature.voxels.insert(position, 1);
            creature.bounds.include(position);
        }

        let err = VoxelGrid::from_creature(&creature).unwrap_err();
        assert_eq!(err, GridError::TooLarge {
            size: [3104, 3104, 3104],
            limit: VoxelGrid::MAX_CELLS
        });
        assert_eq!(creature.solid_count(), 100);
    }

    #[test]
    fn grid_size_overflow_is_rejected() {
        let creature = Creature {
            bounds: Bounds {
                min: [i32::MIN + 1; 3],
                max: [i32::MAX - 1; 3],
            },
            ..Creature::default()
        };
        assert!(matches!(
            creature.grid(),
            Err(GridError::TooLarge { .. })
        ));
    }

    #[test]
    fn creature_color_at_uses_palette() {
        let mut creature = Creature::default();
        creature.voxels.insert([0, 0, 1], 0);
        assert_eq!(creature.color_at([0, 0, 1]), Some(Rgb::BLACK));
        assert_eq!(creature.color_at([0, 0, 2]), None);
    }
}
