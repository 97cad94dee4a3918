use {
    super::*,
    actor::{ClientActor, ClientMessage},
    error::{ConnectSnafu, ConnectTimeoutSnafu, SerializationSnafu},
    snafu::ResultExt,
    std::{
        future::Future,
        sync::{
            Arc,
            atomic::{AtomicU8, Ordering},
        },
        time::Duration,
    },
    tokio::{
        io::{AsyncRead, AsyncWrite},
        net::TcpStream,
        sync::{mpsc, oneshot},
    },
    tracing::{debug, warn},
};

mod actor;
mod error;

pub use error::ClientError;

pub type Result<T = (), E = ClientError> = std::result::Result<T, E>;

/// Unsolicited pool messages, in arrival order.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

const CHANNEL_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
    Authorized,
    Active,
}

impl SessionState {
    fn from_u8(n: u8) -> Self {
        match n {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Subscribed,
            4 => Self::Authorized,
            5 => Self::Active,
            _ => Self::Disconnected,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn new(state: SessionState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    pub(crate) fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves `from` to `to`, leaving any other state untouched.
    pub(crate) fn advance(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub username: String,
    pub password: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

pub struct Client {
    config: Arc<ClientConfig>,
    state: SharedState,
    tx: mpsc::Sender<ClientMessage>,
}

/// Dials a pool. Its state reads `Connecting` while a dial is in flight and
/// falls back to `Disconnected` when the dial fails.
pub struct Connector {
    config: Arc<ClientConfig>,
    state: SharedState,
}

impl Connector {
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Runs `dial` under the configured timeout and starts a session over the
    /// stream it yields.
    pub async fn connect_with<S, F>(&self, dial: F) -> Result<(Client, EventReceiver)>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
        F: Future<Output = std::io::Result<S>>,
    {
        let address = &self.config.address;

        debug!("Connecting to {address}");

        self.state.set(SessionState::Connecting);

        let stream = match tokio::time::timeout(self.config.timeout, dial)
            .await
            .context(ConnectTimeoutSnafu { address })
            .and_then(|result| result.context(ConnectSnafu { address }))
        {
            Ok(stream) => stream,
            Err(err) => {
                self.state.set(SessionState::Disconnected);
                return Err(err);
            }
        };

        self.state.set(SessionState::Connected);

        Ok(Client::spawn(self.config.clone(), self.state.clone(), stream))
    }
}

impl Client {
    pub fn connector(config: ClientConfig) -> Connector {
        Connector {
            config: Arc::new(config),
            state: SharedState::new(SessionState::Disconnected),
        }
    }

    pub async fn connect(config: ClientConfig) -> Result<(Self, EventReceiver)> {
        let address = config.address.clone();

        Self::connector(config)
            .connect_with(async move {
                let stream = TcpStream::connect(&address).await?;
                stream.set_nodelay(true)?;
                Ok::<_, std::io::Error>(stream)
            })
            .await
    }

    /// Runs a session over an already established transport.
    pub fn from_stream<S>(config: ClientConfig, stream: S) -> (Self, EventReceiver)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::spawn(
            Arc::new(config),
            SharedState::new(SessionState::Connected),
            stream,
        )
    }

    fn spawn<S>(config: Arc<ClientConfig>, state: SharedState, stream: S) -> (Self, EventReceiver)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let actor = ClientActor::new(config.clone(), stream, rx, events_tx, state.clone());
        tokio::spawn(actor.run());

        (Self { config, state, tx }, events_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub async fn subscribe(&mut self) -> Result<SubscribeResult> {
        let params = serde_json::to_value(Subscribe {
            user_agent: self.config.user_agent.clone(),
        })
        .context(SerializationSnafu)?;

        let result = self.call("mining.subscribe", params).await?;

        let subscribe =
            serde_json::from_value::<SubscribeResult>(result).context(SerializationSnafu)?;

        self.state.set(SessionState::Subscribed);

        Ok(subscribe)
    }

    pub async fn authorize(&mut self) -> Result<bool> {
        let params = serde_json::to_value(Authorize {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        })
        .context(SerializationSnafu)?;

        let authorized = self.call_bool("mining.authorize", params).await?;

        if authorized {
            self.state.advance(SessionState::Subscribed, SessionState::Authorized);
        }

        Ok(authorized)
    }

    /// Returns whether the pool accepted the share.
    pub async fn submit(
        &mut self,
        job_id: &str,
        extranonce2: Extranonce,
        ntime: Ntime,
        nonce: Nonce,
    ) -> Result<bool> {
        let params = serde_json::to_value(Submit {
            username: self.config.username.clone(),
            job_id: job_id.into(),
            extranonce2,
            ntime,
            nonce,
        })
        .context(SerializationSnafu)?;

        self.call_bool("mining.submit", params).await
    }

    pub async fn disconnect(&mut self) {
        let (respond_to, rx) = oneshot::channel();

        if self
            .tx
            .send(ClientMessage::Disconnect { respond_to })
            .await
            .is_ok()
            && rx.await.is_err()
        {
            debug!("Disconnect acknowledgement dropped");
        }

        self.state.set(SessionState::Disconnected);
    }

    async fn call_bool(&self, method: &'static str, params: Value) -> Result<bool> {
        match self.call(method, params).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(ClientError::Protocol { message }) => {
                warn!("{message}");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value> {
        match self.request(method, params).await? {
            Message::Response {
                result: Some(result),
                error: None,
                reject_reason: None,
                ..
            } => Ok(result),
            Message::Response {
                error: Some(err), ..
            } => Err(ClientError::Protocol {
                message: format!("{method} error: {err}"),
            }),
            Message::Response {
                reject_reason: Some(reason),
                ..
            } => Err(ClientError::Protocol {
                message: format!("{method} rejected: {reason}"),
            }),
            _ => Err(ClientError::Protocol {
                message: format!("{method} returned no result"),
            }),
        }
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Message> {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(ClientMessage::Request {
                method,
                params,
                respond_to,
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        match tokio::time::timeout(self.config.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ClientError::NotConnected),
            Err(_) => Err(ClientError::RequestTimeout {
                method,
                timeout: self.config.timeout,
            }),
        }
    }
}
