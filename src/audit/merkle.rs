//! Merkle Tree for Audit Logs
//!
//! Folds the ordered entry hashes into a single root so a whole log can be
//! compared or anchored by one value. Layers are built bottom-up, pairing
//! neighbours and duplicating the last node of an odd layer. Parent hashes are
//! `sha256_hex(left ++ right)` over the lowercase hex strings, no separator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::entry::AuditLogEntry;
use crate::audit::hash::sha256_hex;
use crate::error::VerifierError;

/// Hash of two child nodes
pub fn hash_pair(left: &str, right: &str) -> String {
    sha256_hex(format!("{}{}", left, right).as_bytes())
}

/// All layers of the tree, leaves first, root layer last. Empty for no leaves.
fn build_layers<S: AsRef<str>>(leaves: &[S]) -> Vec<Vec<String>> {
    if leaves.is_empty() {
        return Vec::new();
    }

    let mut layers = vec![leaves
        .iter()
        .map(|leaf| leaf.as_ref().to_lowercase())
        .collect::<Vec<String>>()];

    while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
        let next: Vec<String> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [single] => hash_pair(single, single),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
        layers.push(next);
    }

    layers
}

/// Merkle root over `leaves` in the order given; `""` when there are none.
pub fn merkle_root<S: AsRef<str>>(leaves: &[S]) -> String {
    let layers = build_layers(leaves);
    let root = layers
        .last()
        .and_then(|layer| layer.first())
        .cloned()
        .unwrap_or_default();

    debug!(
        "Merkle root over {} leaves ({} layers): {}",
        leaves.len(),
        layers.len(),
        root
    );
    root
}

/// Merkle root over the stored hashes of `entries`, valid or not.
pub fn merkle_root_of_entries(entries: &[AuditLogEntry]) -> String {
    let leaves: Vec<&str> = entries.iter().map(|entry| entry.hash.as_str()).collect();
    merkle_root(&leaves)
}

/// Compare the recomputed root with a claimed one, ignoring hex case.
/// No leaves means the empty root `""`.
pub fn verify_merkle_root<S: AsRef<str>>(leaves: &[S], claimed_root: &str) -> bool {
    merkle_root(leaves).eq_ignore_ascii_case(claimed_root.trim())
}

/// Which side of the running hash a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: String,
    pub side: Side,
}

/// Inclusion proof for one leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub leaf_hash: String,
    pub steps: Vec<ProofStep>,
    pub root_hash: String,
}

/// Generate Merkle proof for the leaf at `leaf_index`
pub fn generate_merkle_proof<S: AsRef<str>>(
    leaves: &[S],
    leaf_index: usize,
) -> Result<MerkleProof, VerifierError> {
    if leaf_index >= leaves.len() {
        return Err(VerifierError::index_out_of_range(leaf_index, leaves.len()));
    }

    let layers = build_layers(leaves);
    let mut steps = Vec::with_capacity(layers.len().saturating_sub(1));
    let mut index = leaf_index;

    for layer in &layers[..layers.len() - 1] {
        let (sibling_index, side) = if index % 2 == 0 {
            (index + 1, Side::Right)
        } else {
            (index - 1, Side::Left)
        };
        // Odd layer: the last node is paired with itself.
        let sibling = layer.get(sibling_index).unwrap_or(&layer[index]).clone();
        steps.push(ProofStep { sibling, side });
        index /= 2;
    }

    Ok(MerkleProof {
        leaf_index,
        leaf_hash: layers[0][leaf_index].clone(),
        steps,
        root_hash: layers[layers.len() - 1][0].clone(),
    })
}

/// Verify Merkle proof against a leaf and root
pub fn verify_merkle_proof(proof: &MerkleProof, leaf_hash: &str, root_hash: &str) -> bool {
    let mut current = leaf_hash.to_lowercase();

    for step in &proof.steps {
        current = match step.side {
            Side::Left => hash_pair(&step.sibling, &current),
            Side::Right => hash_pair(&current, &step.sibling),
        };
    }

    current.eq_ignore_ascii_case(root_hash)
}

impl MerkleProof {
    /// Verify this proof
    pub fn verify(&self) -> bool {
        verify_merkle_proof(self, &self.leaf_hash, &self.root_hash)
    }

    /// Get proof size
    pub fn size(&self) -> usize {
        self.steps.len()
    }

    /// Get human-readable representation
    pub fn summary(&self) -> String {
        format!(
            "Merkle proof for leaf {}: {} hashes, root: {}",
            self.leaf_index,
            self.steps.len(),
            self.root_hash
        )
    }
}
