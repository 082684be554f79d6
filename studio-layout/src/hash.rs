//! Content hashing for commit deduplication.
//!
//! The drag library fires several identical events per gesture; the
//! reconciler compares payload hashes against the last committed hash to
//! collapse them. Hashing goes through `serde_json`, whose default map type
//! is ordered, so equal payloads always hash equal.

use sha2::{Digest, Sha256};
use studio_model::RawLayouts;

/// Stable sha256 hex digest of a raw layout payload.
#[must_use]
pub fn content_hash(raw: &RawLayouts) -> String {
    let bytes = serde_json::to_vec(raw).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_model::RawLayoutItem;

    #[test]
    fn equal_payloads_hash_equal() {
        let mut a = RawLayouts::default();
        a.desktop.push(RawLayoutItem {
            i: Some("a".into()),
            x: Some(1.0),
            y: Some(2.0),
            w: Some(3.0),
            h: Some(4.0),
            ..Default::default()
        });
        let b = a.clone();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn geometry_changes_the_hash() {
        let mut a = RawLayouts::default();
        a.desktop.push(RawLayoutItem {
            i: Some("a".into()),
            x: Some(1.0),
            ..Default::default()
        });
        let mut b = a.clone();
        b.desktop[0].x = Some(2.0);
        assert_ne!(content_hash(&a), content_hash(&b));
    }
}
