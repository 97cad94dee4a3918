use {super::*, parking_lot::Mutex};

const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct HashRate(pub f64);

impl HashRate {
    pub fn measure(hashes: u64, elapsed: Duration) -> Self {
        if elapsed.is_zero() {
            return Self(0.0);
        }

        Self(hashes as f64 / elapsed.as_secs_f64())
    }
}

impl Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            return write!(f, "0 H/s");
        }

        let (prefix, divisor) = SI_PREFIXES
            .iter()
            .rev()
            .find(|(_, divisor)| self.0.abs() >= *divisor)
            .unwrap_or(&SI_PREFIXES[0]);

        let scaled = format!("{:.3}", self.0 / divisor);
        let trimmed = scaled.trim_end_matches('0').trim_end_matches('.');

        write!(f, "{trimmed} {prefix}H/s")
    }
}

struct Sample {
    at: Instant,
    hashes: u64,
}

/// Counters shared between the controller and the search thread.
pub struct Stats {
    blocks_found: AtomicU64,
    best_leading_zero_bytes: AtomicU32,
    extranonce2_counter: AtomicU64,
    last_sample: Mutex<Sample>,
    rotation_index: AtomicU64,
    shares_accepted: AtomicU64,
    shares_rejected: AtomicU64,
    started: Instant,
    total_hashes: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        let started = Instant::now();

        Self {
            blocks_found: AtomicU64::new(0),
            best_leading_zero_bytes: AtomicU32::new(0),
            extranonce2_counter: AtomicU64::new(0),
            last_sample: Mutex::new(Sample {
                at: started,
                hashes: 0,
            }),
            rotation_index: AtomicU64::new(0),
            shares_accepted: AtomicU64::new(0),
            shares_rejected: AtomicU64::new(0),
            started,
            total_hashes: AtomicU64::new(0),
        }
    }

    /// Advances the extranonce2 counter and returns the new value.
    pub fn next_extranonce2(&self) -> u64 {
        self.extranonce2_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn extranonce2_counter(&self) -> u64 {
        self.extranonce2_counter.load(Ordering::Relaxed)
    }

    pub fn rotation_index(&self) -> u64 {
        self.rotation_index.load(Ordering::Relaxed)
    }

    pub fn advance_rotation(&self) -> u64 {
        self.rotation_index.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_hashes(&self, hashes: u64) {
        self.total_hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub fn total_hashes(&self) -> u64 {
        self.total_hashes.load(Ordering::Relaxed)
    }

    pub fn record_leading_zero_bytes(&self, zeros: u32) {
        self.best_leading_zero_bytes
            .fetch_max(zeros, Ordering::Relaxed);
    }

    pub fn best_leading_zero_bytes(&self) -> u32 {
        self.best_leading_zero_bytes.load(Ordering::Relaxed)
    }

    pub fn record_block(&self) {
        self.blocks_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn blocks_found(&self) -> u64 {
        self.blocks_found.load(Ordering::Relaxed)
    }

    pub fn record_share(&self, accepted: bool) {
        if accepted {
            self.shares_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.shares_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn shares_accepted(&self) -> u64 {
        self.shares_accepted.load(Ordering::Relaxed)
    }

    pub fn shares_rejected(&self) -> u64 {
        self.shares_rejected.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn average_hash_rate(&self) -> HashRate {
        HashRate::measure(self.total_hashes(), self.uptime())
    }

    /// Rate since the previous call.
    pub fn recent_hash_rate(&self) -> HashRate {
        let now = Instant::now();
        let total = self.total_hashes();

        let mut sample = self.last_sample.lock();
        let rate = HashRate::measure(
            total.saturating_sub(sample.hashes),
            now.duration_since(sample.at),
        );

        *sample = Sample { at: now, hashes: total };

        rate
    }

    pub fn status_line(&self) -> String {
        format!(
            "hashrate={}  hashes={}  best={}  rotation={}  extranonce2={}  uptime={}s",
            self.recent_hash_rate(),
            self.total_hashes(),
            self.best_leading_zero_bytes(),
            self.rotation_index(),
            self.extranonce2_counter(),
            self.uptime().as_secs(),
        )
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_hashes: self.total_hashes(),
            hash_rate: self.average_hash_rate().to_string(),
            best_leading_zero_bytes: self.best_leading_zero_bytes(),
            rotation_index: self.rotation_index(),
            extranonce2_counter: self.extranonce2_counter(),
            shares_accepted: self.shares_accepted(),
            shares_rejected: self.shares_rejected(),
            blocks_found: self.blocks_found(),
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

/// Final statistics, printed as JSON on exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_hashes: u64,
    pub hash_rate: String,
    pub best_leading_zero_bytes: u32,
    pub rotation_index: u64,
    pub extranonce2_counter: u64,
    pub shares_accepted: u64,
    pub shares_rejected: u64,
    pub blocks_found: u64,
    pub uptime_secs: u64,
}
