//! Block header assembly and the double SHA-256 proof-of-work check.
//!
//! Hashes are handled as raw 32-byte digests in the order SHA-256 produces
//! them. Block explorers print them reversed, which [`display_hex`] does.
//! Targets from [`target_from_bits`] are big-endian, so comparing a hash
//! against a target walks the hash from its last byte.

use super::*;

pub const HEADER_SIZE: usize = 80;

const NONCE_OFFSET: usize = 76;
const MIDSTATE_SIZE: usize = 64;

pub fn double_hash(bytes: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(bytes).to_byte_array()
}

/// Assembles an 80-byte header. `prev_hash` and `merkle_root` are given in
/// display order and are reversed into the header.
pub fn build_header(
    version: u32,
    prev_hash: &str,
    merkle_root: &str,
    timestamp: u32,
    bits: u32,
    nonce: u32,
) -> Result<[u8; HEADER_SIZE]> {
    let prev_hash = from_display_hex(prev_hash).context("invalid previous block hash")?;
    let merkle_root = from_display_hex(merkle_root).context("invalid merkle root")?;

    Ok(HeaderTemplate::new(version, prev_hash, merkle_root, timestamp, bits).with_nonce(nonce))
}

pub fn from_display_hex(hex: &str) -> Result<[u8; 32]> {
    let decoded = hex::decode(hex)?;
    let mut bytes = <[u8; 32]>::try_from(decoded.as_slice())
        .map_err(|_| anyhow!("expected 32 bytes, got {}", decoded.len()))?;
    bytes.reverse();
    Ok(bytes)
}

pub fn display_hex(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Expands compact difficulty bits into a big-endian 256-bit target.
///
/// The mantissa is the low 23 bits and lands so that its last byte sits
/// `exponent - 3` bytes from the end. Exponents that would place it outside
/// the 32 bytes produce an all-zero target, which no hash can meet.
pub fn target_from_bits(bits: u32) -> [u8; 32] {
    let exponent = i64::from(bits >> 24);
    let mantissa = bits & 0x007f_ffff;
    let shift = exponent - 3;

    let mut target = [0u8; 32];

    if (0..29).contains(&shift) {
        let offset = (32 - shift - 3) as usize;
        target[offset..offset + 3].copy_from_slice(&mantissa.to_be_bytes()[1..]);
    }

    target
}

/// True when the hash, read as a little-endian number, is at most the target.
pub fn hash_satisfies_target(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    for (hash_byte, target_byte) in hash.iter().rev().zip(target) {
        match hash_byte.cmp(target_byte) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
    }

    true
}

/// Zero bytes at the most significant end of the hash.
pub fn leading_zero_bytes(hash: &[u8; 32]) -> u32 {
    hash.iter().rev().take_while(|byte| **byte == 0).count() as u32
}

/// A header with everything but the nonce filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate([u8; HEADER_SIZE]);

impl HeaderTemplate {
    pub fn new(
        version: u32,
        prev_hash: [u8; 32],
        merkle_root: [u8; 32],
        time: u32,
        bits: u32,
    ) -> Self {
        let mut header = [0u8; HEADER_SIZE];

        LittleEndian::write_u32(&mut header[0..4], version);
        header[4..36].copy_from_slice(&prev_hash);
        header[36..68].copy_from_slice(&merkle_root);
        LittleEndian::write_u32(&mut header[68..72], time);
        LittleEndian::write_u32(&mut header[72..76], bits);

        Self(header)
    }

    pub fn prev_hash(&self) -> [u8; 32] {
        let mut prev_hash = [0u8; 32];
        prev_hash.copy_from_slice(&self.0[4..36]);
        prev_hash
    }

    pub fn time(&self) -> u32 {
        LittleEndian::read_u32(&self.0[68..72])
    }

    pub fn bits(&self) -> u32 {
        LittleEndian::read_u32(&self.0[72..76])
    }

    pub fn with_nonce(&self, nonce: u32) -> [u8; HEADER_SIZE] {
        let mut header = self.0;
        LittleEndian::write_u32(&mut header[NONCE_OFFSET..], nonce);
        header
    }

    /// Hasher that reuses the SHA-256 state after the first 64 bytes.
    pub fn hasher(&self) -> HeaderHasher {
        let mut midstate = sha256::Hash::engine();
        midstate.input(&self.0[..MIDSTATE_SIZE]);

        let mut tail = [0u8; HEADER_SIZE - MIDSTATE_SIZE];
        tail.copy_from_slice(&self.0[MIDSTATE_SIZE..]);

        HeaderHasher { midstate, tail }
    }
}

#[derive(Clone)]
pub struct HeaderHasher {
    midstate: sha256::HashEngine,
    tail: [u8; HEADER_SIZE - MIDSTATE_SIZE],
}

impl HeaderHasher {
    pub fn hash(&mut self, nonce: u32) -> [u8; 32] {
        LittleEndian::write_u32(&mut self.tail[NONCE_OFFSET - MIDSTATE_SIZE..], nonce);

        let mut engine = self.midstate.clone();
        engine.input(&self.tail);
        let first = sha256::Hash::from_engine(engine);

        sha256::Hash::hash(first.as_byte_array()).to_byte_array()
    }
}
