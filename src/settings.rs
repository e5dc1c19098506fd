use std::env;

use serde::Deserialize;
use tracing::{info, Level};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: Option<String>, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,
    pub jwt_refresh_exp: u16,
    pub redis_url: String,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::DEBUG)
    }

    pub fn log_dir(&self) -> String {
        self.log_dir.clone().unwrap_or("./logs".to_string())
    }
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("ENV")
        .or_else(|_| env::var("env"))
        .unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environment as environment variable");
    }
    Ok(envy::from_env::<Config>()?)
}
