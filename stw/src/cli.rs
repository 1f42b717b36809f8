use std::fmt;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::resolver::View;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// stw web server URL
    #[arg(long, env = "STW_SERVER")]
    pub server: Option<String>,

    /// Identifier of the acting user
    #[arg(short, long, env = "STW_USER")]
    pub user: Option<String>,

    /// Feed shown first (Home, MyTimeline or Discover)
    #[arg(long)]
    pub view: Option<View>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Log verbosity
    #[arg(short, long, value_name = "LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the feed of the selected view
    Feed,
    /// Publish a post, contents may contain markup
    Post { contents: String },
    /// Delete a post by key (`alice:post_17b3c`) or control id (`alice:post_17b3c.c`)
    Delete { post_key: String },
    /// Subscribe to a user by name
    Subscribe { target: String },
    /// Unsubscribe from a user by name
    Unsubscribe { target: String },
    /// Create the acting user on the server
    Register,
    /// Interactive session (default)
    Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}
