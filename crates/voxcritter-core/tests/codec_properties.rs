use voxcritter_core::stego::{extract_text, strip_magic};
use voxcritter_core::{
    Bounds, CodecError, Creature, Palette, Rgb, StopRule, decode, encode, encode_payload,
    extract_rgb_payload,
};

fn assert_bounds_contain_origin(bounds: &Bounds) {
    for axis in 0..3 {
        assert!(bounds.min[axis] <= 0, "min {:?}", bounds.min);
        assert!(bounds.max[axis] >= 0, "max {:?}", bounds.max);
    }
}

fn staircase() -> Creature {
    let mut creature = Creature {
        palette: Palette::new(vec![
            Rgb::from_bytes(0, 0, 0),
            Rgb::from_bytes(0x80, 0x40, 0x20),
            Rgb::from_bytes(0x01, 0x02, 0x03),
        ]),
        ..Creature::default()
    };
    for step in 0..8 {
        let position = [step - 4, step, -step];
        creature.voxels.insert(position, (step as u32) % 3);
        creature.bounds.include(position);
    }
    creature
}

#[test]
fn encoded_creature_decodes_identically() {
    let creature = staircase();
    let decoded = decode(&encode(&creature).unwrap()).unwrap();
    assert_eq!(decoded.voxels, creature.voxels);
    assert_eq!(decoded.palette, creature.palette);
    assert_eq!(decoded.bounds, creature.bounds);
}

#[test]
fn encoded_payload_survives_embedding() {
    let creature = staircase();
    let text = encode_payload(&creature).unwrap();
    let mut pixels = vec![0x55u8; 4 * 256];
    voxcritter_core::stego::embed_text(
        &mut pixels,
        &text,
        voxcritter_core::stego::rgb_channel_index,
        StopRule::default(),
    )
    .unwrap();

    let payload = extract_rgb_payload(&pixels, StopRule::default())
        .unwrap()
        .expect("payload");
    assert_eq!(decode(&payload).unwrap(), creature);
}

#[test]
fn prefix_gate_rejects_other_text() {
    for text in ["not-a-payload-prefix...", "", "voxel-painter", "VOXEL-PAINTER:#A=g"] {
        assert_eq!(strip_magic(text), None, "{text:?}");
    }
}

#[test]
fn bounds_contain_origin_after_decode() {
    for payload in ["A=g", "A=wb", "A=wh", "A=+AAAgwz", "A=+///gw/"] {
        let creature = decode(payload).unwrap();
        assert_bounds_contain_origin(&creature.bounds);
        for (position, _) in creature.voxels.iter() {
            assert!(creature.bounds.contains(position), "{payload}: {position:?}");
        }
    }
}

#[test]
fn palette_defaults_to_black() {
    let creature = decode("A=wh").unwrap();
    assert_eq!(creature.palette.colors(), &[Rgb::BLACK]);
}

#[test]
fn packed_palette_decodes_red_green() {
    let creature = decode("C=ff000000ff00:A=g").unwrap();
    assert_eq!(
        creature.palette.colors(),
        &[Rgb::new(1.0, 0.0, 0.0), Rgb::new(0.0, 1.0, 0.0)]
    );
}

#[test]
fn emit_with_x_delta_places_voxel() {
    // 0b110000 (emit, dx) then 33 (+1).
    let creature = decode("A=wh").unwrap();
    assert_eq!(creature.voxels.get([1, 0, 0]), Some(0));
    assert_eq!(creature.voxels.len(), 1);
    assert!(creature.bounds.max[0] >= 1);
}

#[test]
fn decoding_twice_is_identical() {
    let payload = encode(&staircase()).unwrap();
    let first = decode(&payload).unwrap();
    let second = decode(&payload).unwrap();
    assert_eq!(first, second);
}

#[test]
fn non_alphabet_symbol_is_rejected() {
    for (payload, symbol) in [("A=wh=", '='), ("A=g g", ' '), ("A=\u{e9}", '\u{e9}')] {
        let err = decode(payload).unwrap_err();
        assert!(
            matches!(err, CodecError::MalformedAlphabet { symbol: s, .. } if s == symbol),
            "{payload:?}: {err}"
        );
    }
}

#[test]
fn raw_text_extraction_keeps_prefix() {
    let mut pixels = vec![0u8; 4 * 64];
    voxcritter_core::embed_payload(&mut pixels, "A=g", StopRule::default()).unwrap();
    let text = extract_text(
        &pixels,
        voxcritter_core::stego::rgb_channel_index,
        StopRule::default(),
    )
    .unwrap();
    assert_eq!(text, "voxel-painter:#A=g");
}
