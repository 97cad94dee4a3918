use {
    command_builder::{CommandBuilder, summary},
    executable_path::executable_path,
    fake_pool::{FakePool, Script},
    pickaxe::{coinbase, hash, stats::Summary},
    pretty_assertions::assert_eq as pretty_assert_eq,
    serde_json::{Value, json},
    std::{
        io::{BufRead, BufReader, Write},
        net::{TcpListener, TcpStream},
        path::PathBuf,
        process::{Child, Command, Output, Stdio},
        sync::mpsc,
        thread,
        time::Duration,
    },
    stratum::Notify,
    tempfile::TempDir,
};


const EASY_NBITS: &str = "1f7fffff";
const IMPOSSIBLE_NBITS: &str = "03000000";
