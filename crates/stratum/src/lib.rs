use {
    bitcoin::{BlockHash, hashes::Hash},
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    derive_more::Display,
    hex::FromHex,
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::Snafu,
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

pub use {
    authorize::Authorize,
    difficulty::Difficulty,
    error::{InternalError, JsonRpcError, Result},
    event::Event,
    extranonce::Extranonce,
    merkle_node::MerkleNode,
    message::{Id, Message},
    nbits::Nbits,
    nonce::Nonce,
    notify::Notify,
    ntime::Ntime,
    prevhash::PrevHash,
    set_difficulty::SetDifficulty,
    submit::Submit,
    subscribe::{MAX_EXTRANONCE2_SIZE, Subscribe, SubscribeResult},
    version::Version,
};

#[cfg(feature = "client")]
pub use client::{Client, ClientConfig, ClientError, Connector, EventReceiver, SessionState};

#[cfg(feature = "client")]
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;

mod authorize;
mod difficulty;
mod error;
mod event;
mod extranonce;
mod merkle_node;
mod message;
mod nbits;
mod nonce;
mod notify;
mod ntime;
mod prevhash;
mod set_difficulty;
mod submit;
mod subscribe;
mod version;

#[cfg(feature = "client")]
mod client;
