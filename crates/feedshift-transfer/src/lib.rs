//! Delivery of the rendered feed to a remote file store over FTP.

mod ftp;
pub mod memory;
mod publish;

use std::fmt;

use thiserror::Error;

pub use ftp::{FtpConnector, FtpSession};
pub use memory::{MemoryConnector, MemoryServer};
pub use publish::{publish, try_publish, DirectoryOutcome, PublishReport, PublishTarget};

#[derive(Debug, Clone)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Connect timeout in seconds; `None` waits for as long as the OS allows.
    pub timeout_secs: Option<u64>,
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: "anonymous".to_string(),
            password: String::new(),
            timeout_secs: None,
        }
    }
}

impl FtpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to connect to {address}: {message}")]
    Connect { address: String, message: String },
    #[error("login rejected for user {user}: {message}")]
    Login { user: String, message: String },
    #[error("{operation} failed: {message}")]
    Command {
        operation: &'static str,
        message: String,
    },
}

impl TransferError {
    pub fn command(operation: &'static str, err: impl fmt::Display) -> Self {
        Self::Command {
            operation,
            message: err.to_string(),
        }
    }
}

/// One logged-in session against a remote file store, used strictly in sequence.
pub trait TransferSession {
    fn current_dir(&mut self) -> Result<String, TransferError>;
    fn change_dir(&mut self, path: &str) -> Result<(), TransferError>;
    fn make_dir(&mut self, path: &str) -> Result<(), TransferError>;
    /// Names in the current directory.
    fn list_names(&mut self) -> Result<Vec<String>, TransferError>;
    /// Writes `payload` as `filename` in the current directory, replacing any existing file.
    fn store(&mut self, filename: &str, payload: &[u8]) -> Result<u64, TransferError>;
    fn quit(&mut self) -> Result<(), TransferError>;
}

pub trait SessionConnector {
    fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError>;
}
