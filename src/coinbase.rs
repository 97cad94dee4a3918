use super::*;

/// Joins the four hex fragments pool and miner contribute to the coinbase
/// transaction and decodes them once.
pub fn build_coinbase(
    coinb1: &str,
    extranonce1: &str,
    extranonce2: &str,
    coinb2: &str,
) -> Result<Vec<u8>> {
    hex::decode(format!("{coinb1}{extranonce1}{extranonce2}{coinb2}"))
        .context("coinbase fragments are not valid hex")
}

/// Folds the coinbase hash up the tree. Branches are raw digests, left to
/// right from the leaf level, and the coinbase is always the left child.
pub fn build_merkle_root(coinbase_tx: &[u8], branches: &[[u8; 32]]) -> [u8; 32] {
    let mut root = hash::double_hash(coinbase_tx);

    for branch in branches {
        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&root);
        concat[32..].copy_from_slice(branch);
        root = hash::double_hash(&concat);
    }

    root
}
