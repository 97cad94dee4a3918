use super::*;

/// Pool share difficulty. Informational only: the miner derives its target from the
/// job's nbits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(f64);

impl Difficulty {
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for Difficulty {
    fn from(difficulty: f64) -> Self {
        Self(difficulty)
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
