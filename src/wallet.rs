//! Payout address management.
//!
//! The miner needs exactly one legacy P2PKH address to use as its pool
//! username. It comes from an explicit override, from a wallet file written
//! on an earlier run, or from a freshly generated key pair, in that order.

use super::*;

const P2PKH_VERSION: u8 = 0x00;
const WIF_VERSION: u8 = 0x80;
const WIF_COMPRESSED: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wif_private_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WalletOrigin {
    #[display("override")]
    Override,
    #[display("loaded")]
    Loaded,
    #[display("generated")]
    Generated,
}

impl Wallet {
    pub fn load_or_create(
        override_address: Option<&str>,
        path: &Path,
    ) -> Result<(Self, WalletOrigin)> {
        if let Some(address) = override_address {
            if let Err(err) = address.parse::<Address<NetworkUnchecked>>() {
                warn!("Payout address {address} does not parse as a bitcoin address: {err}");
            }

            return Ok((
                Self {
                    address: address.into(),
                    public_key_hex: None,
                    wif_private_key: None,
                    created_at: Utc::now(),
                },
                WalletOrigin::Override,
            ));
        }

        if path.exists() {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            let wallet = serde_json::from_str::<Self>(&json)
                .with_context(|| format!("invalid wallet file {}", path.display()))?;

            return Ok((wallet, WalletOrigin::Loaded));
        }

        let wallet = Self::generate()?;

        if let Err(err) = wallet.save(path) {
            warn!(
                "Failed to save wallet to {}: {err:#}. A different address will be generated next run",
                path.display()
            );
        }

        Ok((wallet, WalletOrigin::Generated))
    }

    pub fn generate() -> Result<Self> {
        let mut secret = [0u8; 32];

        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|err| anyhow!("system entropy source failed: {err}"))?;

        Self::from_secret_bytes(&secret)
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(secret).context("invalid private key")?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::new(), &secret_key);

        let uncompressed = public_key.serialize_uncompressed();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&uncompressed[1..33]);
        y.copy_from_slice(&uncompressed[33..65]);

        let compressed = compress_public_key(&x, &y);

        Ok(Self {
            address: p2pkh_address(&compressed),
            public_key_hex: Some(hex::encode(compressed)),
            wif_private_key: Some(wif(secret)),
            created_at: Utc::now(),
        })
    }

    /// Stages the wallet next to `path`, then renames it into place. A failed
    /// save leaves nothing at `path`.
    pub fn save(&self, path: &Path) -> Result {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let staging = staging_path(path);

        let result = write_private(&staging, json.as_bytes()).and_then(|()| {
            fs::rename(&staging, path)
                .with_context(|| format!("failed to move wallet into {}", path.display()))
        });

        if result.is_err() {
            fs::remove_file(&staging).ok();
        }

        result
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_private(path: &Path, contents: &[u8]) -> Result {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    Ok(())
}

/// SEC1 compressed encoding: `0x02` or `0x03` by the parity of `y`, then `x`.
pub fn compress_public_key(x: &[u8; 32], y: &[u8; 32]) -> [u8; 33] {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02 | (y[31] & 1);
    compressed[1..].copy_from_slice(x);
    compressed
}

pub fn p2pkh_address(public_key: &[u8]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(P2PKH_VERSION);
    payload.extend_from_slice(hash160::Hash::hash(public_key).as_byte_array());
    base58check_encode(&payload)
}

/// Wallet import format for a key whose public key is used compressed.
pub fn wif(secret: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(WIF_VERSION);
    payload.extend_from_slice(secret);
    payload.push(WIF_COMPRESSED);
    base58check_encode(&payload)
}

pub fn base58check_encode(payload: &[u8]) -> String {
    base58::encode_check(payload)
}

pub fn base58check_decode(encoded: &str) -> Result<Vec<u8>> {
    base58::decode_check(encoded).with_context(|| format!("invalid base58check string {encoded:?}"))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        bitcoin::{CompressedPublicKey, Network, PrivateKey},
        pretty_assertions::assert_eq,
        tempfile::TempDir,
    };

    fn secret_one() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        secret
    }

    #[test]
    fn known_key_pair() {
        let wallet = Wallet::from_secret_bytes(&secret_one()).unwrap();

        assert_eq!(wallet.address, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(
            wallet.public_key_hex.as_deref(),
            Some("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
        );
        assert_eq!(
            wallet.wif_private_key.as_deref(),
            Some("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn")
        );
    }

    #[test]
    fn generated_wallet_matches_bitcoin_encodings() {
        let wallet = Wallet::generate().unwrap();

        let wif = wallet.wif_private_key.clone().unwrap();
        let private_key = PrivateKey::from_wif(&wif).unwrap();
        assert!(private_key.compressed);
        assert_eq!(private_key.to_wif(), wif);

        let public_key =
            CompressedPublicKey::from_private_key(&Secp256k1::new(), &private_key).unwrap();
        assert_eq!(
            wallet.public_key_hex,
            Some(hex::encode(public_key.to_bytes()))
        );
        assert_eq!(
            wallet.address,
            Address::p2pkh(public_key, Network::Bitcoin).to_string()
        );
        assert!(wallet.address.starts_with('1'));
    }

    #[test]
    fn compression_prefix_follows_parity() {
        let x = [0x11; 32];
        let mut y = [0x22; 32];

        assert_eq!(compress_public_key(&x, &y)[0], 0x02);

        y[31] = 0x23;
        assert_eq!(compress_public_key(&x, &y)[0], 0x03);
        assert_eq!(&compress_public_key(&x, &y)[1..], &x);
    }

    #[test]
    fn base58check_round_trip() {
        for payload in [vec![], vec![0], vec![0, 0, 1], (0..=255).collect::<Vec<u8>>()] {
            assert_eq!(
                base58check_decode(&base58check_encode(&payload)).unwrap(),
                payload
            );
        }
    }

    #[test]
    fn base58check_rejects_bad_checksum() {
        let mut encoded = base58check_encode(&[0, 1, 2, 3]).into_bytes();
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'1' { b'2' } else { b'1' };

        assert!(base58check_decode(&String::from_utf8(encoded).unwrap()).is_err());
    }

    #[test]
    fn override_wins_and_touches_nothing() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        let (wallet, origin) =
            Wallet::load_or_create(Some("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"), &path).unwrap();

        assert_eq!(origin, WalletOrigin::Override);
        assert_eq!(wallet.address, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(wallet.public_key_hex, None);
        assert_eq!(wallet.wif_private_key, None);
        assert!(!path.exists());
    }

    #[test]
    fn unparseable_override_is_still_used() {
        let tempdir = TempDir::new().unwrap();

        let (wallet, origin) =
            Wallet::load_or_create(Some("not-an-address"), &tempdir.path().join("wallet.json"))
                .unwrap();

        assert_eq!(origin, WalletOrigin::Override);
        assert_eq!(wallet.address, "not-an-address");
    }

    #[test]
    fn generated_wallet_is_persisted_and_reloaded() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("nested").join("wallet.json");

        let (generated, origin) = Wallet::load_or_create(None, &path).unwrap();
        assert_eq!(origin, WalletOrigin::Generated);
        assert!(path.exists());

        let (loaded, origin) = Wallet::load_or_create(None, &path).unwrap();
        assert_eq!(origin, WalletOrigin::Loaded);
        assert_eq!(loaded, generated);
    }

    #[cfg(unix)]
    #[test]
    fn wallet_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        Wallet::load_or_create(None, &path).unwrap();

        assert_eq!(
            fs::metadata(&path).unwrap().permissions().mode() & 0o777,
            0o600
        );
    }

    #[test]
    fn wallet_file_uses_camel_case() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        Wallet::from_secret_bytes(&secret_one())
            .unwrap()
            .save(&path)
            .unwrap();

        let json = serde_json::from_str::<serde_json::Value>(&fs::read_to_string(&path).unwrap())
            .unwrap();

        assert_eq!(json["address"], "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert!(json["publicKeyHex"].is_string());
        assert!(json["wifPrivateKey"].is_string());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        let original = Wallet::from_secret_bytes(&secret_one()).unwrap();
        original.save(&path).unwrap();

        let (loaded, origin) = Wallet::load_or_create(None, &path).unwrap();

        assert_eq!(origin, WalletOrigin::Loaded);
        assert_eq!(loaded, original);
    }

    #[test]
    fn address_only_file_loads() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        fs::write(
            &path,
            r#"{"address":"1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let (wallet, origin) = Wallet::load_or_create(None, &path).unwrap();

        assert_eq!(origin, WalletOrigin::Loaded);
        assert_eq!(wallet.address, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(wallet.wif_private_key, None);
    }

    #[test]
    fn corrupt_file_is_fatal() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        fs::write(&path, "{ not json").unwrap();

        assert!(Wallet::load_or_create(None, &path).is_err());
    }

    #[test]
    fn persistence_failure_is_not_fatal() {
        let tempdir = TempDir::new().unwrap();
        let blocker = tempdir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let path = blocker.join("wallet.json");

        let (wallet, origin) = Wallet::load_or_create(None, &path).unwrap();

        assert_eq!(origin, WalletOrigin::Generated);
        assert!(wallet.address.starts_with('1'));
        assert!(!path.exists());
    }

    #[test]
    fn failed_write_leaves_nothing_at_path() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        fs::create_dir(tempdir.path().join("wallet.json.tmp")).unwrap();

        let wallet = Wallet::from_secret_bytes(&secret_one()).unwrap();

        assert!(wallet.save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_staged_file() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "").unwrap();

        let wallet = Wallet::from_secret_bytes(&secret_one()).unwrap();

        assert!(wallet.save(&path).is_err());
        assert!(!tempdir.path().join("wallet.json.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn failed_save_regenerates_next_run() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("wallet.json");

        fs::create_dir(tempdir.path().join("wallet.json.tmp")).unwrap();

        let (_, origin) = Wallet::load_or_create(None, &path).unwrap();
        assert_eq!(origin, WalletOrigin::Generated);
        assert!(!path.exists());

        let (_, origin) = Wallet::load_or_create(None, &path).unwrap();
        assert_eq!(origin, WalletOrigin::Generated);
    }
}
