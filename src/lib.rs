use {
    anyhow::{Context, Error, anyhow, bail, ensure},
    arguments::Arguments,
    bitcoin::{
        Address,
        address::NetworkUnchecked,
        base58,
        hashes::{Hash, HashEngine, hash160, sha256, sha256d},
        secp256k1::{PublicKey, Secp256k1, SecretKey},
    },
    byteorder::{ByteOrder, LittleEndian},
    chrono::{DateTime, Utc},
    clap::Parser,
    controller::{Controller, Termination},
    derive_more::Display,
    hash::{HeaderHasher, HeaderTemplate},
    job::Job,
    jobs::Jobs,
    rand::{TryRngCore, rngs::OsRng},
    search::{Outcome, Plan, Search, Solution, hints::HintStrategy},
    serde::{Deserialize, Serialize},
    settings::Settings,
    stats::Stats,
    std::{
        collections::{HashSet, VecDeque},
        env,
        fmt::{self, Display, Formatter},
        fs,
        io::{self, Write},
        ops::RangeInclusive,
        path::{Path, PathBuf},
        process,
        sync::{
            Arc,
            atomic::{AtomicU32, AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    stratum::{
        Client, ClientConfig, Difficulty, Event, EventReceiver, Extranonce, Nonce, Notify, Ntime,
        PrevHash,
    },
    tokio::{
        runtime::Runtime,
        task::{self, JoinHandle},
        time::MissedTickBehavior,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt},
    wallet::{Wallet, WalletOrigin},
};

mod arguments;
pub mod coinbase;
mod controller;
pub mod hash;
mod job;
mod jobs;
mod logs;
pub mod search;
pub mod settings;
mod signal;
pub mod stats;
pub mod wallet;

pub const USER_AGENT: &str = concat!("pickaxe/", env!("CARGO_PKG_VERSION"));
pub const STATUS_INTERVAL: Duration = Duration::from_secs(10);

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    let guard = logs::init();

    let args = Arguments::parse();

    let result = Runtime::new()
        .context("failed to create tokio runtime")
        .and_then(|runtime| {
            runtime.block_on(async {
                let shutdown = signal::setup_signal_handler();
                args.run(shutdown).await
            })
        });

    drop(guard);

    match result {
        Err(err) => {
            eprintln!("error: {err}");

            for (i, cause) in err.chain().skip(1).enumerate() {
                if i == 0 {
                    eprintln!();
                    eprintln!("because:");
                }
                eprintln!("- {cause}");
            }

            if env::var_os("RUST_BACKTRACE")
                .map(|val| val == "1")
                .unwrap_or_default()
            {
                eprintln!();
                eprintln!("{}", err.backtrace());
            }

            process::exit(1);
        }
        Ok(()) => process::exit(0),
    }
}
