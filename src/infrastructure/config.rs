use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub service: ServiceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Hard cap on the `limit` a nearby query may request.
    #[serde(default = "default_max_limit")]
    pub max_query_limit: usize,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsersConfig {
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserEntry {
    pub token: String,
    pub username: String,
    pub fullname: String,
    pub profile_img: Option<String>,
    pub profession: Option<String>,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub share_exact_position: bool,
}

fn default_true() -> bool {
    true
}

/// Optional embedded demo client: walks a scripted path and reports it into
/// the service, exercising the whole pipeline against the local endpoints.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProbeConfig {
    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Search radius used for the nearby render after the walk.
    #[serde(default = "default_radius_km")]
    pub radius_km: u32,
    /// Waypoints as [latitude, longitude] pairs.
    #[serde(default)]
    pub path: Vec<[f64; 2]>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            base_url: default_base_url(),
            step_interval_ms: default_step_interval_ms(),
            radius_km: default_radius_km(),
            path: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_step_interval_ms() -> u64 {
    1_000
}

fn default_radius_km() -> u32 {
    10
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_users_config() -> anyhow::Result<UsersConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/users"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_probe_config() -> anyhow::Result<ProbeConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/probe").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}
