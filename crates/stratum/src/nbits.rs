use super::*;

/// Compact target bits, hex encoded big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nbits(u32);

impl Nbits {
    pub fn to_consensus(self) -> u32 {
        self.0
    }
}

impl FromStr for Nbits {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|err| InternalError::Parse {
                message: format!("invalid nbits hex string '{s}': {err}"),
            })
    }
}

impl Display for Nbits {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<u32> for Nbits {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}
