use goldportal::auth::credential::OwnerCredential;
use goldportal::routing::guard::GuardPolicy;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

const DEFAULT_PORT: u16 = 3080;
const DEFAULT_HOSTNAME: &str = "localhost";
const DEFAULT_DB_DIR: &str = "db";
const DEFAULT_CONFIG_PATH: &str = "portal-server.json";
const CONFIG_PATH_ENV_VAR: &str = "PORTAL_CONFIG";

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Could not read config file {}: {source}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Config file {} is not valid: {source}", path.display()))]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortalServerConfig {
    port: Option<u16>,
    /// The hostname under which the server can be reached
    hostname: Option<String>,
    /// Directory the sqlite databases are kept in
    db_dir: Option<String>,
    /// Without it nobody can sign in as owner
    owner: Option<OwnerCredential>,
    require_handshake: Option<bool>,
    /// Secret the client cookies are signed with
    cookie_secret: Option<String>,
}

impl PortalServerConfig {
    /// Loads the config file named by `PORTAL_CONFIG`, or `portal-server.json`.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<PortalServerConfig, ConfigError> {
        let path = env::var_os(CONFIG_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<PortalServerConfig, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(PortalServerConfig::default())
            }
            Err(e) => return Err(e).context(ReadSnafu { path }),
        };

        serde_json::from_str(&content).context(ParseSnafu { path })
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or(DEFAULT_HOSTNAME)
    }

    pub fn db_dir(&self) -> &Path {
        Path::new(self.db_dir.as_deref().unwrap_or(DEFAULT_DB_DIR))
    }

    pub fn owner(&self) -> Option<&OwnerCredential> {
        self.owner.as_ref()
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            require_handshake: self.require_handshake.unwrap_or(false),
        }
    }

    pub fn cookie_secret(&self) -> Option<&str> {
        self.cookie_secret.as_deref()
    }
}
