use log::debug;

use super::error::{CodecError, Component};
use super::layout;
use crate::model::{Creature, Point3};
use crate::stego::layout::{MAGIC_PREFIX, PAYLOAD_DELIMITER};

/// Encode a creature as `C=<palette>:A=<geometry>` chunk text.
///
/// Voxels are written in z, y, x order. Every code places a voxel, so each
/// step between consecutive voxels must fit in one biased delta.
///
/// # Examples
/// ```
/// use voxcritter_core::{Creature, decode, encode};
///
/// let mut creature = Creature::default();
/// creature.voxels.insert([1, 0, 0], 0);
/// creature.bounds.include([1, 0, 0]);
///
/// let text = encode(&creature).unwrap();
/// assert_eq!(text, "C=000000:A=wh");
/// assert_eq!(decode(&text).unwrap(), creature);
/// ```
///
/// # Errors
/// Returns `CodecError::DeltaOutOfRange` when two consecutive voxels (or a
/// color change) are further apart than -32..=31.
pub fn encode(creature: &Creature) -> Result<String, CodecError> {
    let mut text = String::new();
    if !creature.palette.is_empty() {
        text.push(layout::TAG_COLORS);
        text.push(layout::VALUE_DELIMITER);
        for color in creature.palette.colors() {
            let [r, g, b] = color.to_bytes();
            text.push_str(&format!("{r:02x}{g:02x}{b:02x}"));
        }
        text.push(layout::CHUNK_SEPARATOR);
    }
    text.push(layout::TAG_GEOMETRY);
    text.push(layout::VALUE_DELIMITER);
    text.push_str(&encode_geometry(creature)?);
    Ok(text)
}

/// Encode a creature with the `voxel-painter:` prefix and delimiter, ready to
/// be embedded verbatim.
///
/// # Errors
/// Same as [`encode`].
pub fn encode_payload(creature: &Creature) -> Result<String, CodecError> {
    let chunks = encode(creature)?;
    let mut text = String::with_capacity(MAGIC_PREFIX.len() + 1 + chunks.len());
    text.push_str(MAGIC_PREFIX);
    text.push(PAYLOAD_DELIMITER);
    text.push_str(&chunks);
    Ok(text)
}

fn encode_geometry(creature: &Creature) -> Result<String, CodecError> {
    let mut voxels: Vec<(Point3, u32)> = creature.voxels.iter().collect();
    voxels.sort_by_key(|([x, y, z], _)| (*z, *y, *x));

    let mut cursor = [0i64; layout::COMPONENTS];
    let mut codes = Vec::with_capacity(voxels.len() * 2);
    for ([x, y, z], color) in voxels {
        let target = [i64::from(x), i64::from(y), i64::from(z), i64::from(color)];
        let mut code = layout::EMIT_CODE;
        let mut deltas = Vec::with_capacity(layout::COMPONENTS);
        for (slot, component) in Component::ALL.into_iter().enumerate() {
            let delta = target[slot] - cursor[slot];
            if delta == 0 {
                continue;
            }
            if delta < i64::from(layout::MIN_DELTA) || delta > i64::from(layout::MAX_DELTA) {
                return Err(CodecError::DeltaOutOfRange { component, delta });
            }
            code |= layout::DELTA_FLAG_CODES[slot];
            deltas.push((delta + i64::from(layout::DELTA_BIAS)) as u8);
        }
        codes.push(code);
        codes.extend(deltas);
        cursor = target;
    }

    debug!(
        "encoded {} voxels into {} geometry codes",
        creature.voxels.len(),
        codes.len()
    );
    Ok(codes
        .into_iter()
        .map(|value| char::from(layout::ALPHABET[usize::from(value)]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{encode, encode_payload};
    use crate::codec::error::{CodecError, Component};
    use crate::codec::parser::decode;
    use crate::model::{Creature, Palette, Rgb};

    #[test]
    fn encode_orders_voxels_z_y_x() {
        let mut creature = Creature::default();
        creature.voxels.insert([0, 0, 1], 0);
        creature.voxels.insert([1, 0, 0], 0);
        let text = encode(&creature).unwrap();
        // (1,0,0): emit+x, +1; then (0,0,1): emit+x+z, -1, +1
        assert_eq!(text, "C=000000:A=wh0fh");
    }

    #[test]
    fn encode_palette_hex() {
        let creature = Creature {
            palette: Palette::new(vec![Rgb::from_bytes(0xff, 0, 0), Rgb::from_bytes(0, 0xff, 0)]),
            ..Creature::default()
        };
        assert_eq!(encode(&creature).unwrap(), "C=ff000000ff00:A=");
    }

    #[test]
    fn encode_empty_palette_omits_chunk() {
        let mut creature = Creature {
            palette: Palette::new(Vec::new()),
            ..Creature::default()
        };
        creature.voxels.insert([0, 0, 0], 0);
        assert_eq!(encode(&creature).unwrap(), "A=g");
    }

    #[test]
    fn encode_rejects_long_jump() {
        let mut creature = Creature::default();
        creature.voxels.insert([40, 0, 0], 0);
        let err = encode(&creature).unwrap_err();
        assert_eq!(
            err,
            CodecError::DeltaOutOfRange {
                component: Component::X,
                delta: 40
            }
        );
    }

    #[test]
    fn encode_payload_round_trips_through_decoder() {
        let mut creature = Creature {
            palette: Palette::new(vec![
                Rgb::from_bytes(0x10, 0x20, 0x30),
                Rgb::from_bytes(0xaa, 0xbb, 0xcc),
                Rgb::from_bytes(0xff, 0xff, 0xff),
            ]),
            ..Creature::default()
        };
        for (position, color) in [([0, 0, 0], 1), ([-4, 2, 0], 2), ([3, -1, 5], 1)] {
            creature.voxels.insert(position, color);
            creature.bounds.include(position);
        }

        let payload = encode_payload(&creature).unwrap();
        assert!(payload.starts_with("voxel-painter:#C="));
        let decoded = decode(&payload[15..]).unwrap();
        assert_eq!(decoded, creature);
    }
}
