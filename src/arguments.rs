use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
};

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Headless solo miner for Stratum v1 pools",
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[arg(
        long,
        env = "PICKAXE_WALLET_ADDRESS",
        help = "Pay out to <WALLET_ADDRESS> instead of the local wallet."
    )]
    pub(crate) wallet_address: Option<String>,

    #[arg(
        long,
        env = "PICKAXE_WALLET_PATH",
        help = "Load or store the wallet at <WALLET_PATH>. [default: ~/.pickaxe/wallet.json]"
    )]
    pub(crate) wallet_path: Option<PathBuf>,

    #[arg(
        long,
        env = "PICKAXE_POOL_HOST",
        default_value = settings::DEFAULT_POOL_HOST,
        help = "Connect to pool at <POOL_HOST>."
    )]
    pub(crate) pool_host: String,

    #[arg(
        long,
        env = "PICKAXE_POOL_PORT",
        default_value_t = settings::DEFAULT_POOL_PORT,
        help = "Connect to pool on <POOL_PORT>."
    )]
    pub(crate) pool_port: u16,

    #[arg(
        long,
        env = "PICKAXE_WORKER",
        default_value = settings::DEFAULT_WORKER,
        help = "Append <WORKER> to the pool username."
    )]
    pub(crate) worker: String,

    #[arg(
        long,
        env = "PICKAXE_POOL_PASSWORD",
        default_value = "x",
        help = "Authorize with <POOL_PASSWORD>."
    )]
    pub(crate) pool_password: String,

    #[arg(
        long,
        env = "PICKAXE_WINDOW_SIZE",
        default_value_t = search::DEFAULT_WINDOW_SIZE,
        value_parser = clap::value_parser!(u64).range(1..=search::NONCE_SPACE),
        help = "Sweep the nonce space in windows of <WINDOW_SIZE> nonces."
    )]
    pub(crate) window_size: u64,

    #[arg(
        long,
        env = "PICKAXE_HINTS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Scan hinted nonces before sweeping. [possible values: true, false]"
    )]
    pub(crate) hints: bool,

    #[arg(
        long,
        env = "PICKAXE_ROTATION_LIMIT",
        default_value_t = 0,
        help = "Stop after sweeping <ROTATION_LIMIT> windows. 0 never stops."
    )]
    pub(crate) rotation_limit: u64,

    #[arg(
        long,
        env = "PICKAXE_TIMEOUT",
        default_value_t = 30,
        help = "Give up on connects and pool requests after <TIMEOUT> seconds."
    )]
    pub(crate) timeout: u64,
}

impl Arguments {
    pub(crate) async fn run(self, shutdown: CancellationToken) -> Result {
        match Controller::new(Settings::from(self), shutdown).run().await? {
            Termination::PoolDisconnected => bail!("pool closed the connection"),
            termination => {
                info!("Stopped: {termination}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn parse(args: &str) -> Arguments {
        Arguments::try_parse_from(args.split_whitespace()).unwrap()
    }

    #[test]
    fn defaults() {
        let arguments = parse("pickaxe");

        assert_eq!(arguments.wallet_address, None);
        assert_eq!(arguments.wallet_path, None);
        assert_eq!(arguments.pool_host, "solo.ckpool.org");
        assert_eq!(arguments.pool_port, 3333);
        assert_eq!(arguments.worker, "pickaxe");
        assert_eq!(arguments.pool_password, "x");
        assert_eq!(arguments.window_size, 0x1000_0000);
        assert!(arguments.hints);
        assert_eq!(arguments.rotation_limit, 0);
        assert_eq!(arguments.timeout, 30);
    }

    #[test]
    fn overrides() {
        let arguments = parse(
            "pickaxe --wallet-address 1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH --pool-host 127.0.0.1 \
             --pool-port 4444 --worker rig --window-size 1000 --hints false --rotation-limit 3",
        );

        assert_eq!(
            arguments.wallet_address.as_deref(),
            Some("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH")
        );
        assert_eq!(arguments.pool_host, "127.0.0.1");
        assert_eq!(arguments.pool_port, 4444);
        assert_eq!(arguments.worker, "rig");
        assert_eq!(arguments.window_size, 1000);
        assert!(!arguments.hints);
        assert_eq!(arguments.rotation_limit, 3);
    }

    #[test]
    fn window_size_bounds() {
        assert!(Arguments::try_parse_from(["pickaxe", "--window-size", "0"]).is_err());
        assert!(Arguments::try_parse_from(["pickaxe", "--window-size", "4294967297"]).is_err());
        assert_eq!(
            parse("pickaxe --window-size 4294967296").window_size,
            search::NONCE_SPACE
        );
    }
}
