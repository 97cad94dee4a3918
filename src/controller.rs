use {
    super::*,
    std::future::Future,
    stratum::SubscribeResult,
    tokio::time::interval_at,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum Phase {
    #[display("init")]
    Init,
    #[display("wallet ready")]
    WalletReady,
    #[display("connecting")]
    Connecting,
    #[display("authorized")]
    Authorized,
    #[display("awaiting job")]
    AwaitingJob,
    #[display("searching")]
    Searching,
    #[display("preempted")]
    Preempted,
    #[display("submitting")]
    Submitting,
    #[display("terminated")]
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum Termination {
    #[display("block submitted, accepted={accepted}")]
    BlockSubmitted { accepted: bool },
    #[display("rotation limit reached")]
    RotationLimit,
    #[display("shutdown signal")]
    Signal,
    #[display("pool disconnected")]
    PoolDisconnected,
}

/// A search running on the blocking pool for one job and one extranonce2.
struct Attempt {
    cancel: CancellationToken,
    extranonce2: Extranonce,
    handle: JoinHandle<Outcome>,
    job: Arc<Job>,
}

struct Session {
    attempt: Option<Attempt>,
    client: Client,
    difficulty: Difficulty,
    events: EventReceiver,
}

impl Session {
    async fn close(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            attempt.cancel.cancel();
            if let Err(err) = attempt.handle.await {
                warn!("Search task failed: {err}");
            }
        }

        self.client.disconnect().await;
    }
}

pub(crate) struct Controller {
    phase: Phase,
    plan: Plan,
    settings: Settings,
    shutdown: CancellationToken,
    stats: Arc<Stats>,
}

async fn finished(attempt: &mut Option<Attempt>) -> Result<Outcome, task::JoinError> {
    match attempt {
        Some(attempt) => (&mut attempt.handle).await,
        None => std::future::pending().await,
    }
}

impl Controller {
    pub(crate) fn new(settings: Settings, shutdown: CancellationToken) -> Self {
        Self {
            phase: Phase::Init,
            plan: settings.plan(),
            settings,
            shutdown,
            stats: Arc::new(Stats::new()),
        }
    }

    pub(crate) async fn run(self) -> Result<Termination> {
        self.run_with(|config| async move {
            Client::connect(config)
                .await
                .context("failed to connect to pool")
        })
        .await
    }

    async fn run_with<F, Fut>(mut self, connect: F) -> Result<Termination>
    where
        F: FnOnce(ClientConfig) -> Fut,
        Fut: Future<Output = Result<(Client, EventReceiver)>>,
    {
        let result = self.lifecycle(connect).await;

        self.set_phase(Phase::Terminated);
        self.report();

        result
    }

    async fn lifecycle<F, Fut>(&mut self, connect: F) -> Result<Termination>
    where
        F: FnOnce(ClientConfig) -> Fut,
        Fut: Future<Output = Result<(Client, EventReceiver)>>,
    {
        let (wallet, origin) = Wallet::load_or_create(
            self.settings.wallet_address.as_deref(),
            &self.settings.wallet_path,
        )?;

        info!("Using {origin} wallet address {}", wallet.address);

        if origin == WalletOrigin::Generated {
            info!(
                "Private key for {} is stored in {}",
                wallet.address,
                self.settings.wallet_path.display()
            );
        }

        self.set_phase(Phase::WalletReady);

        let config = self.settings.client_config(&wallet.address);

        info!("Connecting to {} as {}", config.address, config.username);

        self.set_phase(Phase::Connecting);

        let (client, events) = tokio::select! {
            result = connect(config) => result?,
            _ = self.shutdown.cancelled() => return Ok(Termination::Signal),
        };

        let mut session = Session {
            attempt: None,
            client,
            difficulty: Difficulty::default(),
            events,
        };

        let result = self.mine(&mut session).await;

        session.close().await;

        result
    }

    async fn mine(&mut self, session: &mut Session) -> Result<Termination> {
        let subscription = tokio::select! {
            result = Self::handshake(&mut session.client) => result?,
            _ = self.shutdown.cancelled() => return Ok(Termination::Signal),
        };

        self.set_phase(Phase::Authorized);
        self.set_phase(Phase::AwaitingJob);

        let mut jobs = Jobs::new();

        let mut status = interval_at(
            tokio::time::Instant::now() + STATUS_INTERVAL,
            STATUS_INTERVAL,
        );
        status.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!("Shutting down");
                    return Ok(Termination::Signal);
                }

                event = session.events.recv() => match event {
                    Some(Event::Notify(notify)) => {
                        let job = Job::from(notify);

                        info!(
                            "New job {}: clean={} nbits={:08x} ntime={}",
                            job.job_id, job.clean, job.nbits, job.ntime
                        );

                        jobs.push(job);
                        debug!("{} job(s) queued", jobs.len());

                        if let Some(attempt) = session.attempt.take() {
                            self.preempt(attempt).await;
                        }

                        if let Some(job) = jobs.take_latest() {
                            session.attempt = Some(self.start_attempt(job, &subscription)?);
                        }
                    }
                    Some(Event::SetDifficulty(difficulty)) => {
                        info!("Pool difficulty set to {difficulty}");
                        session.difficulty = difficulty;
                    }
                    Some(Event::Disconnected) | None => {
                        warn!("Pool connection lost");
                        return Ok(Termination::PoolDisconnected);
                    }
                },

                outcome = finished(&mut session.attempt) => {
                    let Some(attempt) = session.attempt.take() else {
                        continue;
                    };

                    match outcome.context("search task failed")? {
                        Outcome::Found(solution) => {
                            return Ok(self.submit(&mut session.client, &attempt, solution).await);
                        }
                        Outcome::Exhausted => {
                            info!(
                                "Swept every window for job {} with extranonce2 {}, rolling extranonce2",
                                attempt.job.job_id, attempt.extranonce2
                            );
                            session.attempt = Some(self.start_attempt(attempt.job, &subscription)?);
                        }
                        Outcome::RotationLimit => {
                            info!(
                                "Rotation limit of {} windows reached",
                                self.plan.rotation_limit
                            );
                            return Ok(Termination::RotationLimit);
                        }
                        Outcome::Preempted => self.set_phase(Phase::AwaitingJob),
                    }
                }

                _ = status.tick() => {
                    let job_id = session
                        .attempt
                        .as_ref()
                        .map(|attempt| attempt.job.job_id.as_str())
                        .unwrap_or("-");

                    info!(
                        "{}  job={job_id}  difficulty={}",
                        self.stats.status_line(),
                        session.difficulty
                    );
                }
            }
        }
    }

    async fn handshake(client: &mut Client) -> Result<SubscribeResult> {
        let subscription = client
            .subscribe()
            .await
            .context("mining.subscribe failed")?;

        info!(
            "Subscribed: extranonce1={} extranonce2_size={}",
            subscription.extranonce1, subscription.extranonce2_size
        );

        let authorized = client
            .authorize()
            .await
            .context("mining.authorize failed")?;

        ensure!(
            authorized,
            "pool rejected authorization for {}",
            client.username()
        );

        info!("Authorized as {}", client.username());

        Ok(subscription)
    }

    fn start_attempt(
        &mut self,
        job: Arc<Job>,
        subscription: &SubscribeResult,
    ) -> Result<Attempt> {
        let extranonce2 = Extranonce::from_counter(
            self.stats.next_extranonce2(),
            subscription.extranonce2_size,
        );

        let template = job.template(&subscription.extranonce1, &extranonce2)?;
        let target = job.target();

        debug!(
            "Searching job {} with extranonce2 {extranonce2} from rotation {}",
            job.job_id,
            self.stats.rotation_index()
        );

        let cancel = self.shutdown.child_token();
        let plan = self.plan.clone();
        let stats = self.stats.clone();
        let search_cancel = cancel.clone();

        let handle = task::spawn_blocking(move || {
            Search::new(&template, target, search_cancel).run(&template, &plan, &stats)
        });

        self.set_phase(Phase::Searching);

        Ok(Attempt {
            cancel,
            extranonce2,
            handle,
            job,
        })
    }

    async fn preempt(&mut self, attempt: Attempt) {
        self.set_phase(Phase::Preempted);

        attempt.cancel.cancel();

        match attempt.handle.await {
            Ok(Outcome::Found(solution)) => debug!(
                "Discarding nonce {:08x} for superseded job {}",
                solution.nonce, attempt.job.job_id
            ),
            Ok(_) => {}
            Err(err) => warn!("Search task failed: {err}"),
        }
    }

    async fn submit(
        &mut self,
        client: &mut Client,
        attempt: &Attempt,
        solution: Solution,
    ) -> Termination {
        self.set_phase(Phase::Submitting);
        self.stats.record_block();

        info!(
            "Found block {} for job {}: nonce={:08x} extranonce2={}",
            hash::display_hex(&solution.hash),
            attempt.job.job_id,
            solution.nonce,
            attempt.extranonce2
        );

        let accepted = match client
            .submit(
                &attempt.job.job_id,
                attempt.extranonce2.clone(),
                attempt.job.ntime,
                Nonce::from(solution.nonce),
            )
            .await
        {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("Failed to submit block: {err}");
                false
            }
        };

        self.stats.record_share(accepted);

        if accepted {
            info!("Pool accepted block for job {}", attempt.job.job_id);
        } else {
            warn!("Pool rejected block for job {}", attempt.job.job_id);
        }

        Termination::BlockSubmitted { accepted }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("Phase {} -> {phase}", self.phase);
            self.phase = phase;
        }
    }

    fn report(&self) {
        info!("Final statistics: {}", self.stats.status_line());

        match serde_json::to_string_pretty(&self.stats.summary()) {
            Ok(json) => println!("{json}"),
            Err(err) => warn!("Failed to serialize statistics: {err}"),
        }
    }
}
