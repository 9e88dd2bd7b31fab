mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, DatasetSettings, LogFormat, LoggingSettings, RunnerSettings,
};
