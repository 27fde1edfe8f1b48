//! Snapshots
//!
//! Canonical JSON serialization of the whole world document. Registries
//! serialize in insertion order and mappings are ordered, so the same
//! world always produces the same bytes; restore followed by the same
//! advances reproduces the same bytes again.

use crate::error::{SimError, SimResult};
use crate::state::{Sim, SCHEMA_VERSION};

/// Serializes the world document to canonical JSON bytes.
pub fn to_canonical_json(sim: &Sim) -> SimResult<Vec<u8>> {
    Ok(serde_json::to_vec(sim)?)
}

/// Parses snapshot bytes, rejecting unknown schema versions.
pub fn from_canonical_json(bytes: &[u8]) -> SimResult<Sim> {
    let sim: Sim = serde_json::from_slice(bytes)?;
    if sim.meta.schema_version != SCHEMA_VERSION {
        return Err(SimError::Serialization(format!(
            "snapshot schema version {} does not match engine version {}",
            sim.meta.schema_version, SCHEMA_VERSION
        )));
    }
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTables;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn sim() -> Sim {
        let content = ContentTables::default();
        setup::genesis("snapshot-test", WorldArchetype::Standard, &content)
    }

    #[test]
    fn test_roundtrip_structural_equality() {
        let original = sim();
        let bytes = to_canonical_json(&original).unwrap();
        let restored = from_canonical_json(&bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_roundtrip_byte_stability() {
        let original = sim();
        let bytes = to_canonical_json(&original).unwrap();
        let restored = from_canonical_json(&bytes).unwrap();
        let bytes_again = to_canonical_json(&restored).unwrap();
        assert_eq!(bytes, bytes_again);
    }

    #[test]
    fn test_top_level_keys() {
        let bytes = to_canonical_json(&sim()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("meta").is_some());
        assert!(value.get("world").is_some());
        assert!(value.get("state").is_some());
        assert!(value["meta"].get("seed").is_some());
        assert!(value["state"].get("rng").is_some());
    }

    #[test]
    fn test_wrong_schema_version_rejected() {
        let mut world = sim();
        world.meta.schema_version = 999;
        let bytes = to_canonical_json(&world).unwrap();
        assert!(matches!(
            from_canonical_json(&bytes),
            Err(SimError::Serialization(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            from_canonical_json(b"not json at all"),
            Err(SimError::Serialization(_))
        ));
    }
}
