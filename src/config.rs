use once_cell::sync::OnceCell;

const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";
const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "redis" => Some(StoreBackend::Redis),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Redis => "redis",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_max_files: String,
    pub cors_origins: Vec<String>,
    pub max_content_length: usize,
    pub store_backend: StoreBackend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub redis_password: Option<String>,
    pub redis_socket_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub rate_limit_max_requests: i64,
    pub rate_limit_window_secs: u64,
    pub summarizer_model: String,
    pub summarizer_endpoint: String,
    pub summarizer_api_key: Option<String>,
    pub summarizer_device: i32,
    pub summarizer_timeout_secs: u64,
    pub summarizer_warmup: bool,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_max_files: "7d".to_string(),
            cors_origins: vec!["*".to_string()],
            max_content_length: 16 * 1024 * 1024,
            store_backend: StoreBackend::Redis,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_db: 0,
            redis_password: None,
            redis_socket_timeout_secs: 5,
            cache_ttl_secs: 86_400,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 60,
            summarizer_model: DEFAULT_MODEL.to_string(),
            summarizer_endpoint: format!("{HF_INFERENCE_BASE}/{DEFAULT_MODEL}"),
            summarizer_api_key: None,
            summarizer_device: -1,
            summarizer_timeout_secs: 120,
            summarizer_warmup: false,
        }
    }
}

impl Config {
    pub fn init_global() -> Result<&'static Config, String> {
        let cfg = Config::from_env()?;
        CONFIG.set(cfg).map_err(|_| "Config already initialized".to_string())?;
        CONFIG.get().ok_or_else(|| "Config not initialized".to_string())
    }

    fn from_env() -> Result<Config, String> {
        let defaults = Config::default();

        let read_string = |key: &str, def: &str| -> String {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| def.to_string())
        };
        let read_optional = |key: &str| -> Option<String> {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let read_bool = |key: &str, def: bool| -> bool {
            match std::env::var(key) {
                Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
                Err(_) => def,
            }
        };

        let store_backend = match read_optional("STORE_BACKEND") {
            Some(raw) => StoreBackend::parse(&raw)
                .ok_or_else(|| format!("Unsupported STORE_BACKEND: {raw}"))?,
            None => defaults.store_backend,
        };

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins.clone(),
        };

        let summarizer_model = read_string("SUMMARIZER_MODEL", &defaults.summarizer_model);
        let summarizer_endpoint = read_optional("SUMMARIZER_ENDPOINT")
            .unwrap_or_else(|| format!("{HF_INFERENCE_BASE}/{summarizer_model}"));

        Ok(Config {
            port: read_parsed("PORT", defaults.port),
            host: read_string("HOST", &defaults.host),
            log_level: read_string("LOG_LEVEL", &defaults.log_level),
            log_dir: read_string("LOG_DIR", &defaults.log_dir),
            log_max_files: read_string("LOG_MAX_FILES", &defaults.log_max_files),
            cors_origins,
            max_content_length: read_parsed("MAX_CONTENT_LENGTH", defaults.max_content_length),
            store_backend,
            redis_host: read_string("REDIS_HOST", &defaults.redis_host),
            redis_port: read_parsed("REDIS_PORT", defaults.redis_port),
            redis_db: read_parsed("REDIS_DB", defaults.redis_db),
            redis_password: read_optional("REDIS_PASSWORD"),
            redis_socket_timeout_secs: read_parsed(
                "REDIS_SOCKET_TIMEOUT_SECS",
                defaults.redis_socket_timeout_secs,
            ),
            cache_ttl_secs: read_parsed("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            rate_limit_max_requests: read_parsed(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window_secs: read_parsed(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            )
            .max(1),
            summarizer_model,
            summarizer_endpoint,
            summarizer_api_key: read_optional("SUMMARIZER_API_KEY"),
            summarizer_device: read_parsed("SUMMARIZER_DEVICE", defaults.summarizer_device),
            summarizer_timeout_secs: read_parsed(
                "SUMMARIZER_TIMEOUT_SECS",
                defaults.summarizer_timeout_secs,
            ),
            summarizer_warmup: read_bool("SUMMARIZER_WARMUP", defaults.summarizer_warmup),
        })
    }

    pub fn redis_url(&self) -> String {
        let auth = match &self.redis_password {
            Some(password) => format!(":{password}@"),
            None => String::new(),
        };
        format!(
            "redis://{}{}:{}/{}",
            auth, self.redis_host, self.redis_port, self.redis_db
        )
    }

    pub fn print(&self) {
        println!("Current configuration:");
        println!("  - HOST: {}", self.host);
        println!("  - PORT: {}", self.port);
        println!("  - LOG_LEVEL: {}", self.log_level);
        println!("  - MAX_CONTENT_LENGTH: {}", self.max_content_length);
        println!("  - Store:");
        println!("    • STORE_BACKEND: {}", self.store_backend.as_str());
        println!("    • REDIS: {}:{}/{}", self.redis_host, self.redis_port, self.redis_db);
        println!("    • REDIS_PASSWORD: {}", if self.redis_password.is_some() { "set" } else { "unset" });
        println!("    • CACHE_TTL_SECS: {}", self.cache_ttl_secs);
        println!(
            "    • RATE_LIMIT: {} requests / {}s",
            self.rate_limit_max_requests, self.rate_limit_window_secs
        );
        println!("  - Summarizer:");
        println!("    • SUMMARIZER_MODEL: {}", self.summarizer_model);
        println!("    • SUMMARIZER_ENDPOINT: {}", self.summarizer_endpoint);
        println!("    • SUMMARIZER_API_KEY: {}", if self.summarizer_api_key.is_some() { "set" } else { "unset" });
        println!("    • SUMMARIZER_DEVICE: {}", device_label(self.summarizer_device));
        println!("    • SUMMARIZER_WARMUP: {}", self.summarizer_warmup);
    }
}

fn read_parsed<T: std::str::FromStr>(key: &str, def: T) -> T {
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().unwrap_or(def),
        Err(_) => def,
    }
}

pub fn device_label(device: i32) -> String {
    if device < 0 {
        "cpu".to_string()
    } else {
        format!("cuda:{device}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.max_content_length, 16 * 1024 * 1024);
        assert_eq!(cfg.rate_limit_max_requests, 10);
        assert_eq!(cfg.rate_limit_window_secs, 60);
        assert_eq!(cfg.cache_ttl_secs, 86_400);
        assert_eq!(cfg.redis_socket_timeout_secs, 5);
        assert!(cfg.summarizer_endpoint.ends_with("/facebook/bart-large-cnn"));
    }

    #[test]
    fn builds_redis_url_with_optional_password() {
        let mut cfg = Config::default();
        assert_eq!(cfg.redis_url(), "redis://localhost:6379/0");

        cfg.redis_password = Some("secret".to_string());
        cfg.redis_db = 2;
        assert_eq!(cfg.redis_url(), "redis://:secret@localhost:6379/2");
    }

    #[test]
    fn parses_store_backend_case_insensitively() {
        assert_eq!(StoreBackend::parse(" Redis "), Some(StoreBackend::Redis));
        assert_eq!(StoreBackend::parse("memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("memcached"), None);
    }

    #[test]
    fn labels_devices() {
        assert_eq!(device_label(-1), "cpu");
        assert_eq!(device_label(0), "cuda:0");
    }
}
