//! Server settings read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use burnout_engine::Config;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub bind_addr: IpAddr,
  pub port: u16,
  pub engine: Config,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
      port: 5005,
      engine: Config::default(),
    }
  }
}

impl ServerConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; unset keys keep their defaults.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();

    if let Some(v) = lookup("BIND_ADDR") {
      config.bind_addr = v.trim().parse().map_err(|_| ConfigError::invalid("BIND_ADDR", &v))?;
    }
    if let Some(v) = lookup("PORT") {
      config.port = v.trim().parse().map_err(|_| ConfigError::invalid("PORT", &v))?;
    }
    if let Some(v) = lookup("RUNNING_AVERAGE_WINDOW") {
      let window: usize = v
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("RUNNING_AVERAGE_WINDOW", &v))?;
      if window == 0 {
        return Err(ConfigError::invalid("RUNNING_AVERAGE_WINDOW", &v));
      }
      config.engine.running_average_window = window;
    }

    Ok(config)
  }

  pub fn socket_addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind_addr, self.port)
  }
}
