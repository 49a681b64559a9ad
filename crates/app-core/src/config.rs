//! Thread-safe configuration loaded from a YAML file, overridable from the
//! environment and optionally reloaded when the file changes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, mpsc};
use std::thread;
use std::time::Duration;

use config::{Config as RawConfig, Environment, File};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration")]
    Load(#[from] config::ConfigError),

    #[error("Failed to initialize file watcher")]
    Watch(#[from] notify::Error),

    #[error("Configuration lock was poisoned, indicating a panic in another thread")]
    LockPoisoned,
}

#[derive(Debug)]
pub struct Config {
    inner: Arc<RwLock<RawConfig>>,
    // Dropping the watcher stops the reload thread.
    _watcher: Option<RecommendedWatcher>,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn builder_test() -> test_utils::TestConfigBuilder {
        test_utils::TestConfigBuilder::new()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::LockPoisoned)?;
        guard.get(key).map_err(ConfigError::from)
    }

    /// Like [`Config::get`], but yields `default` when the key is absent.
    /// A present key with a malformed value is still an error.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Err(ConfigError::Load(config::ConfigError::NotFound(_))) => Ok(default),
            other => other,
        }
    }
}

pub struct ConfigBuilder {
    path: PathBuf,
    env_prefix: Option<String>,
    watch: bool,
    watch_interval: Duration,
}

impl ConfigBuilder {
    fn new(path: PathBuf) -> Self {
        Self { path, env_prefix: None, watch: false, watch_interval: Duration::from_secs(2) }
    }

    /// Lets `PREFIX__SECTION__KEY` environment variables override file values,
    /// e.g. `ZONEHUB__SUPABASE__JWT_SECRET` for `supabase.jwt_secret`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let raw_config = load(&self.path, self.env_prefix.as_deref())?;
        let shared = Arc::new(RwLock::new(raw_config));

        let watcher = if self.watch { Some(self.spawn_watcher(Arc::clone(&shared))?) } else { None };

        Ok(Config { inner: shared, _watcher: watcher })
    }

    fn spawn_watcher(&self, shared: Arc<RwLock<RawConfig>>) -> Result<RecommendedWatcher, ConfigError> {
        let (tx, rx) = mpsc::channel();
        let mut watcher =
            RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(self.watch_interval))?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        let path = self.path.clone();
        let env_prefix = self.env_prefix.clone();

        thread::spawn(move || {
            tracing::info!("Watching configuration file for changes: {}", path.to_string_lossy());
            while let Ok(event_result) = rx.recv() {
                match event_result {
                    Ok(Event { kind: notify::EventKind::Modify(_), .. }) => {
                        reload(&shared, &path, env_prefix.as_deref());
                    },
                    Err(e) => tracing::error!("File watcher error: {:?}", e),
                    _ => {},
                }
            }
        });

        Ok(watcher)
    }
}

fn load(path: &Path, env_prefix: Option<&str>) -> Result<RawConfig, config::ConfigError> {
    let mut builder = RawConfig::builder().add_source(File::from(path).required(true));

    if let Some(prefix) = env_prefix {
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    }

    builder.build()
}

fn reload(shared: &RwLock<RawConfig>, path: &Path, env_prefix: Option<&str>) {
    tracing::info!("Configuration file changed. Reloading...");
    match load(path, env_prefix) {
        Ok(new_config) => match shared.write() {
            Ok(mut guard) => {
                *guard = new_config;
                tracing::info!("Configuration reloaded successfully.");
            },
            Err(_) => tracing::error!("Failed to acquire write lock for reloading config."),
        },
        // Keep serving the last good configuration.
        Err(e) => tracing::error!("Failed to reload configuration file: {}", e),
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).unwrap();
            }

            let raw_config = builder.build().expect("Failed to create config from test values");

            Config { inner: Arc::new(RwLock::new(raw_config)), _watcher: None }
        }
    }
}
