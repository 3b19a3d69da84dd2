use std::io::Cursor;
use std::net::ToSocketAddrs;
use std::time::Duration;

use suppaftp::types::FileType;
use suppaftp::FtpStream;
use tracing::{info, warn};

use crate::{FtpConfig, SessionConnector, TransferError, TransferSession};

#[derive(Debug, Clone)]
pub struct FtpConnector {
    config: FtpConfig,
}

impl FtpConnector {
    pub fn new(config: FtpConfig) -> Result<Self, TransferError> {
        if config.host.is_empty() {
            return Err(TransferError::Configuration(
                "FTP host cannot be empty".into(),
            ));
        }
        Ok(Self { config })
    }

    fn open_stream(&self) -> Result<FtpStream, TransferError> {
        let address = self.config.address();
        let connect_err = |err: &dyn std::fmt::Display| TransferError::Connect {
            address: address.clone(),
            message: err.to_string(),
        };

        match self.config.timeout_secs {
            Some(secs) => {
                let socket = address
                    .to_socket_addrs()
                    .map_err(|err| connect_err(&err))?
                    .next()
                    .ok_or_else(|| connect_err(&"host did not resolve"))?;
                FtpStream::connect_timeout(socket, Duration::from_secs(secs))
                    .map_err(|err| connect_err(&err))
            }
            None => FtpStream::connect(&address).map_err(|err| connect_err(&err)),
        }
    }
}

impl SessionConnector for FtpConnector {
    fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError> {
        info!(host = %self.config.host, port = self.config.port, "connecting to FTP server");
        let mut stream = self.open_stream()?;

        if let Err(err) = stream.login(self.config.username.as_str(), self.config.password.as_str())
        {
            if let Err(quit_err) = stream.quit() {
                warn!(error = %quit_err, "QUIT after rejected login failed");
            }
            return Err(TransferError::Login {
                user: self.config.username.clone(),
                message: err.to_string(),
            });
        }
        info!(user = %self.config.username, "FTP login succeeded");

        stream
            .transfer_type(FileType::Binary)
            .map_err(|err| TransferError::command("TYPE I", err))?;

        Ok(Box::new(FtpSession { stream }))
    }
}

pub struct FtpSession {
    stream: FtpStream,
}

impl TransferSession for FtpSession {
    fn current_dir(&mut self) -> Result<String, TransferError> {
        self.stream
            .pwd()
            .map_err(|err| TransferError::command("PWD", err))
    }

    fn change_dir(&mut self, path: &str) -> Result<(), TransferError> {
        self.stream
            .cwd(path)
            .map_err(|err| TransferError::command("CWD", err))
    }

    fn make_dir(&mut self, path: &str) -> Result<(), TransferError> {
        self.stream
            .mkdir(path)
            .map_err(|err| TransferError::command("MKD", err))
    }

    fn list_names(&mut self) -> Result<Vec<String>, TransferError> {
        self.stream
            .nlst(None)
            .map_err(|err| TransferError::command("NLST", err))
    }

    fn store(&mut self, filename: &str, payload: &[u8]) -> Result<u64, TransferError> {
        let mut reader = Cursor::new(payload);
        self.stream
            .put_file(filename, &mut reader)
            .map_err(|err| TransferError::command("STOR", err))
    }

    fn quit(&mut self) -> Result<(), TransferError> {
        self.stream
            .quit()
            .map_err(|err| TransferError::command("QUIT", err))
    }
}
