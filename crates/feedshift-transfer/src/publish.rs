use tracing::{error, info, warn};

use crate::{SessionConnector, TransferError, TransferSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Remote directory to write into; empty or `/` keeps the login directory.
    pub directory: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// No target directory was configured.
    Unchanged,
    Entered,
    Created,
    /// Neither entering nor creating the directory worked; the write went to
    /// whatever directory the session was already in.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub directory: DirectoryOutcome,
    pub remote_dir: String,
    pub files_before: Vec<String>,
    pub files_after: Vec<String>,
    pub bytes_written: u64,
}

fn enter_directory(session: &mut dyn TransferSession, directory: &str) -> DirectoryOutcome {
    if directory.is_empty() || directory == "/" {
        return DirectoryOutcome::Unchanged;
    }

    match session.change_dir(directory) {
        Ok(()) => {
            info!(directory, "changed remote directory");
            DirectoryOutcome::Entered
        }
        Err(err) => {
            warn!(directory, error = %err, "could not change remote directory, trying to create it");
            match session
                .make_dir(directory)
                .and_then(|()| session.change_dir(directory))
            {
                Ok(()) => {
                    info!(directory, "created and entered remote directory");
                    DirectoryOutcome::Created
                }
                Err(err) => {
                    warn!(
                        directory,
                        error = %err,
                        "could not create remote directory, continuing in the current one"
                    );
                    DirectoryOutcome::Fallback
                }
            }
        }
    }
}

fn upload(
    session: &mut dyn TransferSession,
    target: &PublishTarget,
    payload: &[u8],
) -> Result<PublishReport, TransferError> {
    let login_dir = session.current_dir()?;
    info!(directory = %login_dir, "current remote directory");

    let directory = enter_directory(session, &target.directory);
    let remote_dir = match directory {
        DirectoryOutcome::Unchanged => login_dir,
        _ => session.current_dir()?,
    };

    let files_before = session.list_names()?;
    info!(files = ?files_before, "remote files before upload");

    info!(filename = %target.filename, bytes = payload.len(), "uploading file");
    let bytes_written = session.store(&target.filename, payload)?;

    let files_after = session.list_names()?;
    info!(files = ?files_after, "remote files after upload");

    Ok(PublishReport {
        directory,
        remote_dir,
        files_before,
        files_after,
        bytes_written,
    })
}

/// Opens a session, writes `payload` as `target.filename` and closes the
/// session again whether or not the write succeeded.
///
/// A failing QUIT after a completed write is logged and does not turn the
/// upload into a failure.
pub fn try_publish(
    connector: &dyn SessionConnector,
    target: &PublishTarget,
    payload: &[u8],
) -> Result<PublishReport, TransferError> {
    let mut session = connector.connect()?;
    let outcome = upload(session.as_mut(), target, payload);

    match session.quit() {
        Ok(()) => info!("FTP session closed"),
        Err(err) => warn!(error = %err, "failed to close FTP session cleanly"),
    }

    outcome
}

/// [`try_publish`] reduced to a success flag; every failure is logged here.
pub fn publish(connector: &dyn SessionConnector, target: &PublishTarget, payload: &[u8]) -> bool {
    match try_publish(connector, target, payload) {
        Ok(report) => {
            info!(
                filename = %target.filename,
                remote_dir = %report.remote_dir,
                bytes = report.bytes_written,
                "upload complete"
            );
            true
        }
        Err(err) => {
            error!(filename = %target.filename, error = %err, "FTP upload failed");
            false
        }
    }
}
