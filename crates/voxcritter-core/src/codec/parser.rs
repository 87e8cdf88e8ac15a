use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::error::{CodecError, Component};
use super::layout;
use super::reader::{ChunkMap, CodeFlags, SymbolReader, read_palette};
use crate::model::{Bounds, Creature, Palette, VoxelMap};

/// What to do when a payload carries no geometry chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryPolicy {
    /// Fail with `CodecError::MissingGeometry`.
    #[default]
    Reject,
    /// Return an empty voxel map with the initial bounds.
    Empty,
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    pub geometry: GeometryPolicy,
}

/// Decode a voxel-painter chunk payload into a creature.
///
/// Uses the default options, which reject payloads without geometry.
///
/// # Examples
/// ```
/// use voxcritter_core::{Rgb, decode};
///
/// // 'w' = emit + x delta, 'h' = +1.
/// let creature = decode("C=ff000000ff00:A=wh").unwrap();
/// assert_eq!(creature.palette.colors(), &[Rgb::new(1.0, 0.0, 0.0), Rgb::new(0.0, 1.0, 0.0)]);
/// assert_eq!(creature.voxels.get([1, 0, 0]), Some(0));
/// ```
///
/// # Errors
/// Returns `CodecError` for malformed palettes, unknown geometry symbols,
/// truncated delta sequences and missing geometry.
pub fn decode(payload: &str) -> Result<Creature, CodecError> {
    decode_with(payload, &DecodeOptions::default())
}

/// Decode a voxel-painter chunk payload with explicit options.
///
/// # Errors
/// Same as [`decode`]; `GeometryPolicy::Empty` turns a missing geometry
/// chunk into an empty creature instead of an error.
pub fn decode_with(payload: &str, options: &DecodeOptions) -> Result<Creature, CodecError> {
    let chunks = ChunkMap::parse(payload);

    let palette = match chunks.get(layout::TAG_COLORS) {
        Some(value) => Palette::new(read_palette(value)?),
        None => Palette::default(),
    };

    let (voxels, bounds) = match chunks.get(layout::TAG_GEOMETRY) {
        Some(value) => decode_geometry(value)?,
        None => match options.geometry {
            GeometryPolicy::Reject => return Err(CodecError::MissingGeometry),
            GeometryPolicy::Empty => {
                debug!("payload has no geometry chunk, using empty creature");
                (VoxelMap::new(), Bounds::default())
            }
        },
    };

    debug!(
        "decoded {} voxels, {} palette entries, bounds {:?}..{:?}",
        voxels.len(),
        palette.len(),
        bounds.min,
        bounds.max
    );
    Ok(Creature {
        voxels,
        palette,
        bounds,
    })
}

/// Decode the delta-coded geometry value of an `A` chunk.
///
/// # Errors
/// See [`CodecError`].
pub fn decode_geometry(value: &str) -> Result<(VoxelMap, Bounds), CodecError> {
    let mut reader = SymbolReader::new(value)?;
    let mut cursor = [0i32; layout::COMPONENTS];
    let mut voxels = VoxelMap::new();
    let mut bounds = Bounds::default();

    while let Some(code) = reader.next_code() {
        let flags = CodeFlags::from_code(code);
        for (slot, component) in Component::ALL.into_iter().enumerate() {
            if !flags.deltas[slot] {
                continue;
            }
            let position = reader.position();
            let delta = reader.read_delta(component)?;
            cursor[slot] = step(cursor[slot], delta, component, position)?;
        }

        if flags.emit {
            let point = [cursor[0], cursor[1], cursor[2]];
            let color = u32::try_from(cursor[3]).map_err(|_| CodecError::NegativeColorIndex {
                index: cursor[3],
                position: reader.position(),
            })?;
            bounds.include(point);
            voxels.insert(point, color);
            trace!("voxel {point:?} -> {color}");
        }
    }

    Ok((voxels, bounds))
}

fn step(value: i32, delta: i32, component: Component, position: usize) -> Result<i32, CodecError> {
    value
        .checked_add(delta)
        .ok_or(CodecError::CoordinateOverflow {
            component,
            position,
        })
}
