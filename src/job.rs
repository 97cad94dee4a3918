use super::*;

/// Work announced by the pool in one `mining.notify`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Job {
    pub(crate) job_id: String,
    pub(crate) prevhash: PrevHash,
    pub(crate) coinb1: String,
    pub(crate) coinb2: String,
    pub(crate) merkle_branches: Vec<[u8; 32]>,
    pub(crate) version: u32,
    pub(crate) nbits: u32,
    pub(crate) ntime: Ntime,
    pub(crate) clean: bool,
}

impl Job {
    pub(crate) fn target(&self) -> [u8; 32] {
        hash::target_from_bits(self.nbits)
    }

    /// Builds the header template for one extranonce2 value.
    pub(crate) fn template(
        &self,
        extranonce1: &Extranonce,
        extranonce2: &Extranonce,
    ) -> Result<HeaderTemplate> {
        let coinbase = coinbase::build_coinbase(
            &self.coinb1,
            &extranonce1.to_hex(),
            &extranonce2.to_hex(),
            &self.coinb2,
        )?;

        let merkle_root = coinbase::build_merkle_root(&coinbase, &self.merkle_branches);

        Ok(HeaderTemplate::new(
            self.version,
            self.prevhash.to_byte_array(),
            merkle_root,
            self.ntime.into(),
            self.nbits,
        ))
    }
}

impl From<Notify> for Job {
    fn from(notify: Notify) -> Self {
        Self {
            job_id: notify.job_id,
            prevhash: notify.prevhash,
            coinb1: notify.coinb1,
            coinb2: notify.coinb2,
            merkle_branches: notify
                .merkle_branches
                .into_iter()
                .map(|branch| branch.to_byte_array())
                .collect(),
            version: notify.version.to_consensus(),
            nbits: notify.nbits.to_consensus(),
            ntime: notify.ntime,
            clean: notify.clean_jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, serde_json::json};

    fn notify() -> Notify {
        serde_json::from_value(json!([
            "bf",
            "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
            "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008",
            "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000",
            ["0000000000000000000000000000000000000000000000000000000000000001"],
            "00000002",
            "1c2ac4af",
            "504e86b9",
            true
        ]))
        .unwrap()
    }

    #[test]
    fn from_notify() {
        let job = Job::from(notify());

        assert_eq!(job.job_id, "bf");
        assert_eq!(job.version, 2);
        assert_eq!(job.nbits, 0x1c2a_c4af);
        assert_eq!(u32::from(job.ntime), 0x504e_86b9);
        assert!(job.clean);
        assert_eq!(job.merkle_branches.len(), 1);
        assert_eq!(job.merkle_branches[0][0], 0);
        assert_eq!(job.merkle_branches[0][31], 1);
    }

    #[test]
    fn template_fields() {
        let job = Job::from(notify());

        let extranonce1 = Extranonce::from_counter(0x0800_0002, 4);
        let extranonce2 = Extranonce::from_counter(1, 4);

        let template = job.template(&extranonce1, &extranonce2).unwrap();
        let header = template.with_nonce(0);

        let coinbase = coinbase::build_coinbase(
            &job.coinb1,
            "08000002",
            "00000001",
            &job.coinb2,
        )
        .unwrap();

        assert_eq!(&header[0..4], &2u32.to_le_bytes());
        assert_eq!(&header[4..36], &job.prevhash.to_byte_array());
        assert_eq!(
            &header[36..68],
            &coinbase::build_merkle_root(&coinbase, &job.merkle_branches)
        );
        assert_eq!(template.time(), 0x504e_86b9);
        assert_eq!(template.bits(), 0x1c2a_c4af);
    }

    #[test]
    fn extranonce2_changes_merkle_root() {
        let job = Job::from(notify());
        let extranonce1 = Extranonce::from_counter(0x0800_0002, 4);

        let one = job
            .template(&extranonce1, &Extranonce::from_counter(1, 4))
            .unwrap();
        let two = job
            .template(&extranonce1, &Extranonce::from_counter(2, 4))
            .unwrap();

        assert_eq!(one.prev_hash(), two.prev_hash());
        assert_ne!(one.with_nonce(0), two.with_nonce(0));
    }

    #[test]
    fn target_comes_from_nbits() {
        assert_eq!(
            Job::from(notify()).target(),
            hash::target_from_bits(0x1c2a_c4af)
        );
    }
}
