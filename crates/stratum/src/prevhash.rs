use super::*;

/// Previous block hash as sent in `mining.notify`: the internal byte order with
/// every 4-byte word byte-swapped.
#[derive(Debug, PartialEq, Eq, Clone, Copy, DeserializeFromStr, SerializeDisplay)]
pub struct PrevHash(BlockHash);

impl PrevHash {
    /// Internal (header) byte order.
    pub fn to_byte_array(self) -> [u8; 32] {
        self.0.to_byte_array()
    }

    pub fn block_hash(self) -> BlockHash {
        self.0
    }
}

impl FromStr for PrevHash {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wire = <[u8; 32]>::from_hex(s)?;

        let mut internal = [0u8; 32];
        for (src, dst) in wire.chunks_exact(4).zip(internal.chunks_exact_mut(4)) {
            LittleEndian::write_u32(dst, BigEndian::read_u32(src));
        }

        Ok(Self(BlockHash::from_byte_array(internal)))
    }
}

impl Display for PrevHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut wire = [0u8; 32];
        for (src, dst) in self
            .0
            .as_byte_array()
            .chunks_exact(4)
            .zip(wire.chunks_exact_mut(4))
        {
            BigEndian::write_u32(dst, LittleEndian::read_u32(src));
        }

        f.write_str(&hex::encode(wire))
    }
}

impl From<BlockHash> for PrevHash {
    fn from(block_hash: BlockHash) -> Self {
        Self(block_hash)
    }
}
