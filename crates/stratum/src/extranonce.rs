use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, DeserializeFromStr, SerializeDisplay)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    /// Encodes `counter` big-endian into exactly `size` bytes, dropping high bytes
    /// that do not fit and left-padding with zeros when `size` exceeds eight.
    pub fn from_counter(counter: u64, size: usize) -> Self {
        let be = counter.to_be_bytes();
        let mut bytes = vec![0u8; size];

        let take = size.min(be.len());
        bytes[size - take..].copy_from_slice(&be[be.len() - take..]);

        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(hex::decode(s)?))
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Vec<u8>> for Extranonce {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
