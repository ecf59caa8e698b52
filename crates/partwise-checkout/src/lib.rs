#![warn(missing_docs)]

//! Composite identity and purchase gating.
//!
//! A composite — the full set of currently selected parts — is
//! identified by a canonical fingerprint of its part-id set. Previously
//! generated composites are indexed by fingerprint so that "does the
//! user already own (or have in cart) this exact combination" is an
//! O(1) membership test, no matter which click path produced the
//! selection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use partwise_catalog::{CompositeMeshId, PartId};

/// Composite-mesh status code meaning "ready for download".
///
/// The encoding is external: anything else means still processing.
pub const MESH_STATUS_READY: i64 = 1;

/// A previously generated composite mesh and the part set it was
/// generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeMeshRecord {
    /// Unique identifier.
    pub id: CompositeMeshId,
    /// The part ids the mesh was generated from.
    pub selected_part_ids: Vec<PartId>,
    /// External processing status, see [`MESH_STATUS_READY`].
    #[serde(default)]
    pub status: i64,
}

impl CompositeMeshRecord {
    /// Whether the generated mesh can be downloaded right now.
    pub fn is_ready(&self) -> bool {
        self.status == MESH_STATUS_READY
    }
}

/// Canonical identity of a composite's part-id set.
///
/// Ids are sorted descending numerically and joined with `:`, so any
/// permutation of the same set produces the same fingerprint. The
/// descending order is an arbitrary but fixed convention — externally
/// stored ownership records use it, so both sides of every comparison
/// must match it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a part-id set.
    pub fn of(part_ids: &[PartId]) -> Self {
        let mut ids = part_ids.to_vec();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(":");
        Self(joined)
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint membership index over a composite collection.
///
/// Always rebuilt wholesale from the backing collection — incremental
/// patching would go stale after deletions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeIndex {
    fingerprints: HashSet<Fingerprint>,
}

impl CompositeIndex {
    /// Build the index from a composite collection.
    pub fn build<'a>(records: impl IntoIterator<Item = &'a CompositeMeshRecord>) -> Self {
        let fingerprints = records
            .into_iter()
            .map(|record| Fingerprint::of(&record.selected_part_ids))
            .collect();
        Self { fingerprints }
    }

    /// Whether a part-id set is present in the indexed collection.
    pub fn contains(&self, part_ids: &[PartId]) -> bool {
        self.fingerprints.contains(&Fingerprint::of(part_ids))
    }

    /// Number of distinct fingerprints indexed.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

/// Inputs to the purchase-gating decision that do not depend on the
/// current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseTerms {
    /// Whether pay-per-download is enabled for this customizer at all.
    pub pay_per_download: bool,
    /// Whether the caller can edit — owners and admins never buy.
    pub edit_mode: bool,
    /// Price of a composite download.
    pub price: f64,
}

/// Whether the current selection must be bought before download.
///
/// Checked in priority order: pay-per-download disabled, edit mode, and
/// a non-positive price each exempt the user outright; otherwise the
/// user must buy exactly when they do not already own the composite.
/// Side-effect-free — re-evaluate on every relevant state change, never
/// cache across them.
pub fn must_buy(terms: &PurchaseTerms, owns_selection: bool) -> bool {
    if !terms.pay_per_download {
        return false;
    }
    if terms.edit_mode {
        return false;
    }
    if terms.price <= 0.0 {
        return false;
    }
    !owns_selection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: CompositeMeshId, ids: &[PartId]) -> CompositeMeshRecord {
        CompositeMeshRecord {
            id,
            selected_part_ids: ids.to_vec(),
            status: 0,
        }
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let base = Fingerprint::of(&[3, 11, 7]);
        assert_eq!(Fingerprint::of(&[7, 3, 11]), base);
        assert_eq!(Fingerprint::of(&[11, 7, 3]), base);
        assert_eq!(base.as_str(), "11:7:3");
    }

    #[test]
    fn fingerprint_sorts_numerically_not_lexically() {
        // Lexical sort would put "9" after "10".
        assert_eq!(Fingerprint::of(&[9, 10]).as_str(), "10:9");
    }

    #[test]
    fn distinct_sets_have_distinct_fingerprints() {
        assert_ne!(Fingerprint::of(&[1, 2, 3]), Fingerprint::of(&[1, 2, 4]));
        assert_ne!(Fingerprint::of(&[1, 2]), Fingerprint::of(&[1, 2, 3]));
    }

    #[test]
    fn index_membership_matches_build_input() {
        let records = vec![record(1, &[5, 2, 9]), record(2, &[1])];
        let index = CompositeIndex::build(&records);

        assert_eq!(index.len(), 2);
        assert!(index.contains(&[9, 5, 2]));
        assert!(index.contains(&[1]));
        assert!(!index.contains(&[5, 2]));
    }

    #[test]
    fn rebuild_drops_removed_composites() {
        let mut records = vec![record(1, &[5, 2]), record(2, &[7])];
        let index = CompositeIndex::build(&records);
        assert!(index.contains(&[7]));

        records.retain(|r| r.id != 2);
        let rebuilt = CompositeIndex::build(&records);
        assert!(!rebuilt.contains(&[7]));
        assert!(rebuilt.contains(&[2, 5]));
    }

    #[test]
    fn pay_per_download_disabled_never_buys() {
        for edit_mode in [false, true] {
            for price in [0.0, 10.0] {
                for owned in [false, true] {
                    let terms = PurchaseTerms {
                        pay_per_download: false,
                        edit_mode,
                        price,
                    };
                    assert!(!must_buy(&terms, owned));
                }
            }
        }
    }

    #[test]
    fn edit_mode_is_exempt() {
        let terms = PurchaseTerms {
            pay_per_download: true,
            edit_mode: true,
            price: 10.0,
        };
        assert!(!must_buy(&terms, false));
    }

    #[test]
    fn free_customizer_never_buys() {
        let terms = PurchaseTerms {
            pay_per_download: true,
            edit_mode: false,
            price: 0.0,
        };
        assert!(!must_buy(&terms, false));
    }

    #[test]
    fn unowned_priced_selection_must_buy() {
        let terms = PurchaseTerms {
            pay_per_download: true,
            edit_mode: false,
            price: 10.0,
        };
        assert!(must_buy(&terms, false));
        assert!(!must_buy(&terms, true));
    }

    #[test]
    fn record_readiness() {
        let mut r = record(1, &[1]);
        assert!(!r.is_ready());
        r.status = MESH_STATUS_READY;
        assert!(r.is_ready());
    }

    #[test]
    fn record_wire_shape() {
        let r: CompositeMeshRecord =
            serde_json::from_str(r#"{ "id": 4, "selectedPartIds": [3, 1, 2] }"#).unwrap();
        assert_eq!(r.selected_part_ids, vec![3, 1, 2]);
        assert_eq!(r.status, 0);
    }
}
