use {
    super::*,
    crate::MAX_MESSAGE_SIZE,
    futures::{SinkExt, StreamExt},
    std::collections::BTreeMap,
    tokio::{
        io::{ReadHalf, WriteHalf},
        time::{Instant, MissedTickBehavior},
    },
    tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError},
    tracing::info,
};

const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

type PendingRequest = (&'static str, oneshot::Sender<Result<Message>>, Instant);

pub(super) enum ClientMessage {
    Request {
        method: &'static str,
        params: Value,
        respond_to: oneshot::Sender<Result<Message>>,
    },
    Disconnect {
        respond_to: oneshot::Sender<()>,
    },
}

pub(super) struct ClientActor<S> {
    config: Arc<ClientConfig>,
    events: mpsc::UnboundedSender<Event>,
    id_counter: u64,
    pending: BTreeMap<Id, PendingRequest>,
    reader: FramedRead<ReadHalf<S>, LinesCodec>,
    rx: mpsc::Receiver<ClientMessage>,
    state: SharedState,
    writer: FramedWrite<WriteHalf<S>, LinesCodec>,
}

impl<S> ClientActor<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub(super) fn new(
        config: Arc<ClientConfig>,
        stream: S,
        rx: mpsc::Receiver<ClientMessage>,
        events: mpsc::UnboundedSender<Event>,
        state: SharedState,
    ) -> Self {
        let (reader, writer) = tokio::io::split(stream);

        Self {
            config,
            events,
            id_counter: 0,
            pending: BTreeMap::new(),
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE)),
            rx,
            state,
            writer: FramedWrite::new(writer, LinesCodec::new()),
        }
    }

    pub(super) async fn run(mut self) {
        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                line = self.reader.next() => match line {
                    Some(Ok(line)) => self.handle_line(&line),
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        debug!("Dropping line longer than {MAX_MESSAGE_SIZE} bytes");
                    }
                    Some(Err(LinesCodecError::Io(err))) => {
                        warn!("Read error from {}: {err}", self.config.address);
                        break;
                    }
                    None => {
                        info!("Pool {} closed the connection", self.config.address);
                        break;
                    }
                },
                message = self.rx.recv() => match message {
                    Some(ClientMessage::Request { method, params, respond_to }) => {
                        self.handle_request(method, params, respond_to).await;
                    }
                    Some(ClientMessage::Disconnect { respond_to }) => {
                        self.close().await;
                        if respond_to.send(()).is_err() {
                            debug!("Disconnect response dropped: caller gave up");
                        }
                        return;
                    }
                    None => {
                        self.close().await;
                        return;
                    }
                },
                _ = sweep.tick() => self.evict_expired(),
            }
        }

        self.close().await;

        if self.events.send(Event::Disconnected).is_err() {
            debug!("Disconnected event dropped: no receiver");
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.id_counter;
        self.id_counter += 1;
        id
    }

    async fn handle_request(
        &mut self,
        method: &'static str,
        params: Value,
        respond_to: oneshot::Sender<Result<Message>>,
    ) {
        let id = self.next_id();

        let frame = match serde_json::to_string(&Message::request(id, method, params)) {
            Ok(frame) => frame,
            Err(source) => {
                if respond_to
                    .send(Err(ClientError::Serialization { source }))
                    .is_err()
                {
                    debug!("Serialization error dropped: caller gave up");
                }
                return;
            }
        };

        debug!("-> {frame}");

        if let Err(err) = self.writer.send(frame).await {
            let err = match err {
                LinesCodecError::Io(source) => ClientError::Io { source },
                LinesCodecError::MaxLineLengthExceeded => ClientError::Protocol {
                    message: format!("{method} request too large"),
                },
            };

            if respond_to.send(Err(err)).is_err() {
                debug!("Write error dropped: caller gave up");
            }
            return;
        }

        let deadline = Instant::now() + self.config.timeout;
        self.pending
            .insert(Id::Number(id), (method, respond_to, deadline));
    }

    fn handle_line(&mut self, line: &str) {
        let message = match serde_json::from_str::<Message>(line) {
            Ok(message) => message,
            Err(err) => {
                debug!("Dropping malformed line {line:?}: {err}");
                return;
            }
        };

        match message {
            Message::Response {
                id,
                result,
                error,
                reject_reason,
            } => match self.pending.remove(&id) {
                Some((_, respond_to, _)) => {
                    debug!("<- {line}");
                    let response = Message::Response {
                        id,
                        result,
                        error,
                        reject_reason,
                    };
                    if respond_to.send(Ok(response)).is_err() {
                        debug!("Response dropped: caller gave up");
                    }
                }
                None => debug!("Dropping unmatched response id={id}"),
            },
            Message::Notification { method, params } => self.handle_notification(&method, params),
            Message::Request { method, .. } => debug!("Ignoring pool request {method}"),
        }
    }

    fn handle_notification(&mut self, method: &str, params: Value) {
        match method {
            "mining.notify" => match serde_json::from_value::<Notify>(params) {
                Ok(notify) => {
                    if self
                        .state
                        .advance(SessionState::Authorized, SessionState::Active)
                    {
                        debug!("Session active");
                    }
                    self.emit(Event::Notify(notify));
                }
                Err(err) => debug!("Dropping malformed mining.notify: {err}"),
            },
            "mining.set_difficulty" => match serde_json::from_value::<SetDifficulty>(params)
                .ok()
                .and_then(|set_difficulty| set_difficulty.difficulty())
            {
                Some(difficulty) => self.emit(Event::SetDifficulty(difficulty)),
                None => debug!("Dropping malformed mining.set_difficulty"),
            },
            _ => debug!("Ignoring notification {method}"),
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("Event dropped: no receiver");
        }
    }

    fn evict_expired(&mut self) {
        let now = Instant::now();

        let expired = self
            .pending
            .iter()
            .filter(|(_, (_, _, deadline))| now >= *deadline)
            .map(|(id, _)| id.clone())
            .collect::<Vec<Id>>();

        for id in expired {
            if let Some((method, respond_to, _)) = self.pending.remove(&id)
                && respond_to
                    .send(Err(ClientError::RequestTimeout {
                        method,
                        timeout: self.config.timeout,
                    }))
                    .is_err()
            {
                debug!("Expired {method} id={id} already abandoned");
            }
        }
    }

    async fn close(&mut self) {
        self.state.set(SessionState::Disconnected);

        for (_, (_, respond_to, _)) in std::mem::take(&mut self.pending) {
            if respond_to.send(Err(ClientError::NotConnected)).is_err() {
                debug!("NotConnected response dropped: caller gave up");
            }
        }

        if let Err(err) = SinkExt::<String>::close(&mut self.writer).await {
            debug!("Error closing connection: {err}");
        }
    }
}
