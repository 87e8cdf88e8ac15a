//! voxcritter core library: voxel creatures hidden in PNG pixels.
//!
//! voxel-painter images carry a small voxel model in the least-significant
//! bits of their R, G and B channels. This crate recovers it in two pure
//! stages: `stego` pulls the hidden text out of an RGBA buffer and checks the
//! `voxel-painter:` marker, then `codec` decodes the chunk text into a sparse
//! voxel map, a palette and bounds. Image I/O sits behind the `PixelSource`
//! trait so the decoders never touch files.
//!
//! Invariants:
//! - An image without the marker is `Ok(None)`, never an error.
//! - Bounds always contain the origin and only grow while decoding.
//! - A failed decode returns no partial model.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use voxcritter_core::{LoadOptions, load_creature_file};
//!
//! if let Some(creature) = load_creature_file(Path::new("critter.png"), &LoadOptions::default())? {
//!     println!("{} voxels", creature.voxels.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod codec;
mod loader;
mod model;
mod source;
pub mod stego;

pub use codec::{
    CodecError, DecodeOptions, GeometryPolicy, decode, decode_with, encode, encode_payload,
};
pub use loader::{LoadError, LoadOptions, load_creature, load_creature_file, load_payload};
pub use model::{Bounds, Creature, GridError, Palette, Point3, Rgb, VoxelGrid, VoxelMap};
pub use source::{PixelFrame, PixelSource, PngFileSource, SourceError, write_png};
pub use stego::{StegoError, StopRule, embed_payload, extract_payload, extract_rgb_payload};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// JSON-friendly summary of a decoded creature.
///
/// # Examples
/// ```
/// use voxcritter_core::{decode, make_report};
///
/// let creature = decode("C=ff0000:A=wh").unwrap();
/// let report = make_report("critter.png", 512, &creature, false);
/// assert_eq!(report.voxel_count, 1);
/// assert!(report.grid.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input image metadata.
    pub input: InputInfo,
    /// Palette entries as `[r, g, b]` in `[0, 1]`.
    pub palette: Vec<[f32; 3]>,
    /// Axis-aligned bounds grown while decoding.
    pub bounds: Bounds,
    /// Number of placed voxels.
    pub voxel_count: usize,
    /// Voxels in coordinate order.
    pub voxels: Vec<VoxelEntry>,
    /// Dense grid summary, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided by the caller.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// One placed voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelEntry {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Palette index.
    pub color: u32,
}

/// Shape of the dense grid a mesher would receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSummary {
    pub origin: Point3,
    pub size: [usize; 3],
    /// Cells holding a non-zero palette index.
    pub solid_cells: usize,
}

/// Build a report for `creature` decoded from `input_path`.
pub fn make_report(
    input_path: &str,
    input_bytes: u64,
    creature: &Creature,
    include_grid: bool,
) -> CreatureReport {
    // Summarized from the sparse map; the dense grid can be far too large.
    let grid = include_grid.then(|| {
        let extent = creature.bounds.padded(VoxelGrid::MARGIN);
        GridSummary {
            origin: extent.min,
            size: extent.size(),
            solid_cells: creature.solid_count(),
        }
    });
    CreatureReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "voxcritter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        palette: creature
            .palette
            .colors()
            .iter()
            .map(|color| color.to_array())
            .collect(),
        bounds: creature.bounds,
        voxel_count: creature.voxels.len(),
        voxels: creature
            .voxels
            .iter()
            .map(|([x, y, z], color)| VoxelEntry { x, y, z, color })
            .collect(),
        grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_grid_when_not_requested() {
        let creature = decode("A=wh").unwrap();
        let report = make_report("critter.png", 1, &creature, false);

        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("grid").is_none());
        assert_eq!(value["palette"][0], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(value["bounds"]["max"], serde_json::json!([1, 1, 1]));
        assert_eq!(value["voxels"][0]["x"], 1);
    }

    #[test]
    fn report_includes_grid_summary() {
        let creature = decode("C=000000ffffff:A=yihyhf").unwrap();
        let report = make_report("critter.png", 1, &creature, true);

        let grid = report.grid.expect("grid");
        assert_eq!(grid.origin, [-2, -2, -2]);
        assert_eq!(grid.size, [7, 5, 5]);
        assert_eq!(grid.solid_cells, 1);
        assert_eq!(report.voxel_count, 2);
        assert_eq!(report.voxels[1], VoxelEntry {
            x: 3,
            y: 0,
            z: 0,
            color: 0
        });
    }

    #[test]
    fn grid_summary_handles_long_stride_payload() {
        // Color +1 at the origin, then 100 emits stepping +31 on x, y and z.
        let payload = format!("A=ih{}", "8///".repeat(100));
        let creature = decode(&payload).unwrap();
        assert_eq!(creature.bounds.max, [3100, 3100, 3100]);

        let report = make_report("critter.png", 1, &creature, true);
        let grid = report.grid.expect("grid");
        assert_eq!(grid.origin, [-2, -2, -2]);
        assert_eq!(grid.size, [3104, 3104, 3104]);
        assert_eq!(grid.solid_cells, 101);
        assert!(creature.grid().is_err());
    }
}
