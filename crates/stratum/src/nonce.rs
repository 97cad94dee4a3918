use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nonce(u32);

impl FromStr for Nonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|err| InternalError::Parse {
                message: format!("invalid nonce hex string '{s}': {err}"),
            })
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Nonce> for u32 {
    fn from(nonce: Nonce) -> u32 {
        nonce.0
    }
}

impl From<u32> for Nonce {
    fn from(nonce: u32) -> Nonce {
        Nonce(nonce)
    }
}
