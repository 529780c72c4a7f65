//! Schematic encoding and decoding
//!
//! Uses RON (Rusty Object Notation) for human-readable map documents.
//! - Reading: auto-detects plain RON or brotli-compressed RON
//! - Writing: plain pretty RON, or brotli when compression is requested
//!
//! Decoded documents are validated before they reach the spawn engine.

use std::io::Cursor;
use glam::Vec3;
use tracing::warn;
use crate::error::{MapEditorError, Result};
use crate::transform::is_random_axis;
use super::Schematic;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of descriptors in one map
    pub const MAX_OBJECTS: usize = 4096;
    /// Maximum string length for names and item identifiers
    pub const MAX_STRING_LEN: usize = 256;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
    /// Longest teleport cooldown or watcher guard, in seconds (one day)
    pub const MAX_COOLDOWN: f32 = 86_400.0;
}

fn validation(message: String) -> MapEditorError {
    MapEditorError::Serialization(format!("validation failed: {}", message))
}

/// Check if a float is valid (not NaN or Inf)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_vec(v: Vec3, context: &str) -> std::result::Result<(), String> {
    if is_valid_float(v.x) && is_valid_float(v.y) && is_valid_float(v.z) {
        Ok(())
    } else {
        Err(format!("{}: invalid vector ({}, {}, {})", context, v.x, v.y, v.z))
    }
}

/// Rotations may additionally carry the randomize sentinel
fn validate_rotation(v: Vec3, context: &str) -> std::result::Result<(), String> {
    for axis in [v.x, v.y, v.z] {
        if !is_random_axis(axis) && !is_valid_float(axis) {
            return Err(format!("{}: invalid rotation ({}, {}, {})", context, v.x, v.y, v.z));
        }
    }
    Ok(())
}

fn validate_string(s: &str, context: &str) -> std::result::Result<(), String> {
    if s.len() > limits::MAX_STRING_LEN {
        return Err(format!("{}: string too long ({} > {})", context, s.len(), limits::MAX_STRING_LEN));
    }
    Ok(())
}

fn validate_all(map: &Schematic) -> std::result::Result<(), String> {
    validate_string(&map.name, "name")?;

    for (i, d) in map.doors.iter().enumerate() {
        let ctx = format!("doors[{}]", i);
        validate_vec(d.position, &ctx)?;
        validate_rotation(d.rotation, &ctx)?;
        validate_vec(d.scale, &ctx)?;
        if !d.health.is_finite() {
            return Err(format!("{}: invalid health {}", ctx, d.health));
        }
    }
    for (i, d) in map.work_stations.iter().enumerate() {
        let ctx = format!("work_stations[{}]", i);
        validate_vec(d.position, &ctx)?;
        validate_rotation(d.rotation, &ctx)?;
        validate_vec(d.scale, &ctx)?;
    }
    for (i, d) in map.item_spawn_points.iter().enumerate() {
        let ctx = format!("item_spawn_points[{}]", i);
        validate_vec(d.position, &ctx)?;
        validate_rotation(d.rotation, &ctx)?;
        validate_string(&d.item, &ctx)?;
        if d.spawn_chance > 100 {
            return Err(format!("{}: spawn chance {} above 100", ctx, d.spawn_chance));
        }
    }
    for (i, d) in map.player_spawn_points.iter().enumerate() {
        validate_vec(d.position, &format!("player_spawn_points[{}]", i))?;
    }
    for (i, d) in map.ragdoll_spawn_points.iter().enumerate() {
        let ctx = format!("ragdoll_spawn_points[{}]", i);
        validate_vec(d.position, &ctx)?;
        validate_rotation(d.rotation, &ctx)?;
        validate_string(&d.name, &ctx)?;
        validate_string(&d.death_reason, &ctx)?;
    }
    for (i, d) in map.shooting_targets.iter().enumerate() {
        let ctx = format!("shooting_targets[{}]", i);
        validate_vec(d.position, &ctx)?;
        validate_rotation(d.rotation, &ctx)?;
        validate_vec(d.scale, &ctx)?;
    }
    for (i, d) in map.light_controllers.iter().enumerate() {
        if d.color.iter().chain([d.shift_speed].iter()).any(|c| !c.is_finite()) {
            return Err(format!("light_controllers[{}]: invalid color or shift speed", i));
        }
    }
    for (i, d) in map.teleports.iter().enumerate() {
        let ctx = format!("teleports[{}]", i);
        validate_vec(d.entrance.position, &ctx)?;
        validate_vec(d.entrance.scale, &ctx)?;
        validate_vec(d.exit.position, &ctx)?;
        validate_vec(d.exit.scale, &ctx)?;
        if !(d.cooldown > 0.0 && d.cooldown <= limits::MAX_COOLDOWN) {
            return Err(format!("{}: invalid cooldown {}", ctx, d.cooldown));
        }
    }
    Ok(())
}

/// Validate an entire schematic
pub fn validate_schematic(map: &Schematic) -> Result<()> {
    if map.len() > limits::MAX_OBJECTS {
        return Err(validation(format!("too many objects ({} > {})", map.len(), limits::MAX_OBJECTS)));
    }
    validate_all(map).map_err(validation)
}

/// Parse a schematic from a RON string
pub fn schematic_from_str(contents: &str) -> Result<Schematic> {
    let map: Schematic = match ron::from_str(contents) {
        Ok(map) => map,
        Err(e) => {
            let line = contents.lines().nth(e.position.line.saturating_sub(1)).unwrap_or("");
            warn!(line = e.position.line, col = e.position.col, context = line.trim(), "RON parse error: {}", e.code);
            return Err(e.into());
        }
    };
    validate_schematic(&map)?;
    Ok(map)
}

fn decompress(bytes: &[u8]) -> Result<String> {
    let mut decompressed = Vec::new();
    brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
        .map_err(|e| MapEditorError::Serialization(format!("brotli decompression failed: {}", e)))?;
    String::from_utf8(decompressed)
        .map_err(|e| MapEditorError::Serialization(format!("invalid UTF-8 after decompression: {}", e)))
}

/// Parse schematic data from document bytes (plain or compressed).
///
/// Text is read as RON first (comments, extension attributes and a byte order
/// mark are fine); brotli is tried for anything else, or when that fails.
pub fn parse_schematic(bytes: &[u8]) -> Result<Schematic> {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return schematic_from_str(&decompress(bytes)?);
    };
    match schematic_from_str(text.trim_start_matches('\u{feff}')) {
        Ok(map) => Ok(map),
        Err(plain) => match decompress(bytes) {
            Ok(contents) => schematic_from_str(&contents),
            Err(_) => Err(plain),
        },
    }
}

/// Encode a schematic as pretty RON text
pub fn to_ron_string(map: &Schematic) -> Result<String> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(map, config)?)
}

/// Encode a schematic as document bytes
pub fn serialize_schematic(map: &Schematic, compress: bool) -> Result<Vec<u8>> {
    let text = to_ron_string(map)?;
    if !compress {
        return Ok(text.into_bytes());
    }

    // Quality 6, window 22 - good balance of speed/ratio
    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(text.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| MapEditorError::Serialization(format!("brotli compression failed: {}", e)))?;
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomType;
    use crate::schematic::*;
    use crate::transform::RANDOM_ROTATION;

    fn sample() -> Schematic {
        let mut map = Schematic::new("sample");
        map.player_spawn_points.push(PlayerSpawnPointDescriptor {
            role: Role::ClassD,
            position: Vec3::new(1.0, 0.5, -2.0),
            room_type: RoomType::LczClassDSpawn,
        });
        map.doors.push(DoorDescriptor {
            door_type: DoorType::HeavyContainment,
            position: Vec3::new(3.0, 0.0, 1.0),
            rotation: Vec3::new(0.0, RANDOM_ROTATION, 0.0),
            scale: Vec3::new(1.0, 2.0, 1.0),
            room_type: RoomType::HczArmory,
            is_locked: true,
            ..DoorDescriptor::default()
        });
        map.item_spawn_points.push(ItemSpawnPointDescriptor {
            item: "GunCOM15".to_string(),
            rotation: Vec3::new(RANDOM_ROTATION, RANDOM_ROTATION, RANDOM_ROTATION),
            room_type: RoomType::LczArmory,
            ..ItemSpawnPointDescriptor::default()
        });
        map.light_controllers.push(LightControllerDescriptor {
            room_type: RoomType::EzPcs,
            color: [1.0, 0.0, 0.0, 1.0],
            ..LightControllerDescriptor::default()
        });
        map.teleports.push(TeleportDescriptor {
            bidirectional: true,
            cooldown: 2.5,
            ..TeleportDescriptor::default()
        });
        map
    }

    #[test]
    fn test_round_trip_preserves_sentinels() {
        let map = sample();
        let bytes = serialize_schematic(&map, false).unwrap();
        let parsed = parse_schematic(&bytes).unwrap();

        assert_eq!(parsed, map);
        assert_eq!(parsed.doors[0].rotation.y, RANDOM_ROTATION);
        assert_eq!(parsed.item_spawn_points[0].rotation, Vec3::splat(RANDOM_ROTATION));
    }

    #[test]
    fn test_compressed_documents_are_detected() {
        let map = sample();
        let bytes = serialize_schematic(&map, true).unwrap();
        assert_ne!(bytes.first(), Some(&b'('));
        assert_eq!(parse_schematic(&bytes).unwrap(), map);
    }

    #[test]
    fn test_hand_edited_text_is_not_brotli() {
        let documents: [&[u8]; 3] = [
            b"// edited by hand\n(name: \"notes\", doors: [(room_type: LczCafe)])",
            b"#![enable(implicit_some)]\n(name: \"notes\", doors: [(room_type: LczCafe)])",
            b"\xEF\xBB\xBF(name: \"notes\", doors: [(room_type: LczCafe)])",
        ];
        for bytes in documents {
            let map = parse_schematic(bytes).unwrap();
            assert_eq!(map.name, "notes");
            assert_eq!(map.doors.len(), 1);
        }
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        let err = parse_schematic(b"(name: \"broken\", doors: [").unwrap_err();
        assert!(matches!(err, MapEditorError::Serialization(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut map = sample();
        map.doors[0].position.x = f32::NAN;
        assert!(validate_schematic(&map).is_err());

        let mut map = sample();
        map.item_spawn_points[0].spawn_chance = 150;
        assert!(validate_schematic(&map).is_err());

        let mut map = sample();
        map.teleports[0].cooldown = -1.0;
        assert!(validate_schematic(&map).is_err());
    }

    #[test]
    fn test_cooldown_bounds() {
        let mut map = sample();
        for cooldown in [0.0, 1.0e20, f32::INFINITY, f32::NAN] {
            map.teleports[0].cooldown = cooldown;
            assert!(validate_schematic(&map).is_err(), "cooldown {cooldown}");
        }
        for cooldown in [0.01, limits::MAX_COOLDOWN] {
            map.teleports[0].cooldown = cooldown;
            assert!(validate_schematic(&map).is_ok(), "cooldown {cooldown}");
        }
    }

    #[test]
    fn test_partial_document_loads() {
        let map = schematic_from_str("(name: \"tiny\", doors: [(room_type: LczCafe)])").unwrap();
        assert_eq!(map.name, "tiny");
        assert_eq!(map.doors.len(), 1);
        assert!(map.teleports.is_empty());
    }
}
