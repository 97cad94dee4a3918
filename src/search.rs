use super::*;

pub mod hints;

pub const CHUNK_SIZE: u32 = 250_000;
pub const NONCE_SPACE: u64 = 1 << 32;
pub const DEFAULT_WINDOW_SIZE: u64 = 0x1000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub nonce: u32,
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found(Solution),
    /// Every window has been swept for this coinbase.
    Exhausted,
    Preempted,
    RotationLimit,
}

/// How a coinbase's nonce space is walked. Shared by every search.
#[derive(Clone)]
pub struct Plan {
    pub window_size: u64,
    pub rotation_limit: u64,
    pub hints: Option<Arc<dyn HintStrategy>>,
}

impl Plan {
    pub fn window_count(&self) -> u64 {
        NONCE_SPACE.div_ceil(self.window_size)
    }

    /// The window a given rotation index maps to. Indexes wrap around the
    /// nonce space and the last window may be short.
    pub fn window(&self, rotation_index: u64) -> RangeInclusive<u32> {
        let slot = rotation_index % self.window_count();
        let start = slot * self.window_size;
        let end = (start + self.window_size).min(NONCE_SPACE) - 1;
        start as u32..=end as u32
    }

    fn limit_reached(&self, stats: &Stats) -> bool {
        self.rotation_limit > 0 && stats.rotation_index() >= self.rotation_limit
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            rotation_limit: 0,
            hints: Some(Arc::new(hints::ResidueHints)),
        }
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("window_size", &self.window_size)
            .field("rotation_limit", &self.rotation_limit)
            .field("hints", &self.hints.is_some())
            .finish()
    }
}

/// Nonce search over one header template.
///
/// Runs on a blocking thread. The cancellation token is polled between
/// chunks and between hint windows, so preemption takes at most one chunk.
pub struct Search {
    cancel: CancellationToken,
    chunk_size: u32,
    hasher: HeaderHasher,
    target: [u8; 32],
}

impl Search {
    pub fn new(template: &HeaderTemplate, target: [u8; 32], cancel: CancellationToken) -> Self {
        Self {
            cancel,
            chunk_size: CHUNK_SIZE,
            hasher: template.hasher(),
            target,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Hint phase, then windows from the current rotation index until every
    /// window has been covered once.
    pub fn run(&mut self, template: &HeaderTemplate, plan: &Plan, stats: &Stats) -> Outcome {
        if plan.limit_reached(stats) {
            return Outcome::RotationLimit;
        }

        if let Some(strategy) = &plan.hints {
            match self.hint_phase(template, strategy.as_ref(), stats) {
                Outcome::Exhausted => {}
                outcome => return outcome,
            }
        }

        for _ in 0..plan.window_count() {
            let window = plan.window(stats.rotation_index());

            match self.sweep(window, stats) {
                Outcome::Exhausted => {
                    let rotation_index = stats.advance_rotation();
                    debug!("Window exhausted, rotation index now {rotation_index}");

                    if plan.limit_reached(stats) {
                        return Outcome::RotationLimit;
                    }
                }
                outcome => return outcome,
            }
        }

        Outcome::Exhausted
    }

    pub fn hint_phase(
        &mut self,
        template: &HeaderTemplate,
        strategy: &dyn HintStrategy,
        stats: &Stats,
    ) -> Outcome {
        for window in strategy.windows(template) {
            if self.cancel.is_cancelled() {
                return Outcome::Preempted;
            }

            if let Some(solution) = self.scan(window, stats) {
                return Outcome::Found(solution);
            }
        }

        Outcome::Exhausted
    }

    pub fn sweep(&mut self, window: RangeInclusive<u32>, stats: &Stats) -> Outcome {
        let (mut start, end) = window.into_inner();

        loop {
            if self.cancel.is_cancelled() {
                return Outcome::Preempted;
            }

            let chunk_end = start.saturating_add(self.chunk_size - 1).min(end);

            if let Some(solution) = self.scan(start..=chunk_end, stats) {
                return Outcome::Found(solution);
            }

            match chunk_end.checked_add(1) {
                Some(next) if next <= end => start = next,
                _ => return Outcome::Exhausted,
            }
        }
    }

    fn scan(&mut self, nonces: RangeInclusive<u32>, stats: &Stats) -> Option<Solution> {
        let mut hashes = 0;
        let mut best = 0;
        let mut found = None;

        for nonce in nonces {
            let hash = self.hasher.hash(nonce);
            hashes += 1;
            best = best.max(hash::leading_zero_bytes(&hash));

            if hash::hash_satisfies_target(&hash, &self.target) {
                found = Some(Solution { nonce, hash });
                break;
            }
        }

        stats.add_hashes(hashes);
        stats.record_leading_zero_bytes(best);

        found
    }
}
