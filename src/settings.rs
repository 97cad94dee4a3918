use super::*;

pub const DEFAULT_POOL_HOST: &str = "solo.ckpool.org";
pub const DEFAULT_POOL_PORT: u16 = 3333;
pub const DEFAULT_WORKER: &str = "pickaxe";

const WALLET_DIR: &str = ".pickaxe";
const WALLET_FILE: &str = "wallet.json";

/// Immutable runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub wallet_address: Option<String>,
    pub wallet_path: PathBuf,
    pub pool_host: String,
    pub pool_port: u16,
    pub worker: String,
    pub pool_password: String,
    pub window_size: u64,
    pub hints: bool,
    pub rotation_limit: u64,
    pub timeout: Duration,
}

impl Settings {
    pub fn pool_address(&self) -> String {
        format!("{}:{}", self.pool_host, self.pool_port)
    }

    /// Pool username for solo mining: payout address, then worker name.
    pub fn username(&self, address: &str) -> String {
        format!("{address}.{}", self.worker)
    }

    pub fn client_config(&self, address: &str) -> ClientConfig {
        ClientConfig {
            address: self.pool_address(),
            username: self.username(address),
            password: Some(self.pool_password.clone()),
            user_agent: USER_AGENT.into(),
            timeout: self.timeout,
        }
    }

    pub fn plan(&self) -> Plan {
        Plan {
            window_size: self.window_size,
            rotation_limit: self.rotation_limit,
            hints: self
                .hints
                .then(|| Arc::new(search::hints::ResidueHints) as Arc<dyn HintStrategy>),
        }
    }

    pub fn default_wallet_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(WALLET_DIR)
            .join(WALLET_FILE)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wallet_address: None,
            wallet_path: Self::default_wallet_path(),
            pool_host: DEFAULT_POOL_HOST.into(),
            pool_port: DEFAULT_POOL_PORT,
            worker: DEFAULT_WORKER.into(),
            pool_password: "x".into(),
            window_size: search::DEFAULT_WINDOW_SIZE,
            hints: true,
            rotation_limit: 0,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<Arguments> for Settings {
    fn from(arguments: Arguments) -> Self {
        Self {
            wallet_address: arguments
                .wallet_address
                .map(|address| address.trim().to_string())
                .filter(|address| !address.is_empty()),
            wallet_path: arguments
                .wallet_path
                .unwrap_or_else(Self::default_wallet_path),
            pool_host: arguments.pool_host,
            pool_port: arguments.pool_port,
            worker: arguments.worker,
            pool_password: arguments.pool_password,
            window_size: arguments.window_size,
            hints: arguments.hints,
            rotation_limit: arguments.rotation_limit,
            timeout: Duration::from_secs(arguments.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn settings(args: &[&str]) -> Settings {
        Settings::from(Arguments::try_parse_from(args).unwrap())
    }

    #[test]
    fn defaults_match_arguments() {
        let from_arguments = settings(&["pickaxe"]);
        let default = Settings::default();

        assert_eq!(from_arguments.pool_address(), default.pool_address());
        assert_eq!(from_arguments.wallet_path, default.wallet_path);
        assert_eq!(from_arguments.worker, default.worker);
        assert_eq!(from_arguments.window_size, default.window_size);
        assert_eq!(from_arguments.timeout, default.timeout);
    }

    #[test]
    fn pool_address() {
        assert_eq!(Settings::default().pool_address(), "solo.ckpool.org:3333");
    }

    #[test]
    fn username_is_address_dot_worker() {
        let settings = settings(&["pickaxe", "--worker", "rig1"]);

        assert_eq!(
            settings.username("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH.rig1"
        );
    }

    #[test]
    fn client_config() {
        let config = settings(&["pickaxe", "--pool-password", "secret", "--timeout", "5"])
            .client_config("1abc");

        assert_eq!(config.address, "solo.ckpool.org:3333");
        assert_eq!(config.username, "1abc.pickaxe");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.user_agent, USER_AGENT);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_override_is_ignored() {
        assert_eq!(
            settings(&["pickaxe", "--wallet-address", "  "]).wallet_address,
            None
        );
        assert_eq!(
            settings(&["pickaxe", "--wallet-address", " 1abc "])
                .wallet_address
                .as_deref(),
            Some("1abc")
        );
    }

    #[test]
    fn default_wallet_path_is_under_home() {
        assert!(Settings::default_wallet_path().ends_with(".pickaxe/wallet.json"));
    }

    #[test]
    fn plan_follows_hint_flag() {
        assert!(settings(&["pickaxe"]).plan().hints.is_some());

        let plan = settings(&[
            "pickaxe",
            "--hints",
            "false",
            "--window-size",
            "1000",
            "--rotation-limit",
            "4",
        ])
        .plan();

        assert!(plan.hints.is_none());
        assert_eq!(plan.window_size, 1000);
        assert_eq!(plan.rotation_limit, 4);
    }
}
