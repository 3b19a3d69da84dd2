//! In-process file store that speaks the [`TransferSession`] contract.
//!
//! Directories must exist before they can be entered, and `make_dir` only
//! creates a directory whose parent already exists, which is how a plain FTP
//! server behaves. Used for dry runs in tooling and as the publisher test bed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{SessionConnector, TransferError, TransferSession};

#[derive(Debug, Default)]
struct ServerState {
    directories: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    refuse_connections: bool,
    deny_make_dir: bool,
    fail_store: bool,
    sessions_opened: usize,
    sessions_closed: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    format!("/{}", segments.join("/"))
}

fn resolve(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize(path)
    } else {
        normalize(&format!("{cwd}/{path}"))
    }
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        let mut state = ServerState::default();
        state.directories.insert("/".to_string());
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates `path` and any missing parents.
    pub fn with_directory(self, path: &str) -> Self {
        {
            let mut state = self.lock();
            let mut current = String::new();
            for segment in normalize(path).split('/').filter(|s| !s.is_empty()) {
                current.push('/');
                current.push_str(segment);
                state.directories.insert(current.clone());
            }
        }
        self
    }

    pub fn refusing_connections(self) -> Self {
        self.lock().refuse_connections = true;
        self
    }

    pub fn denying_make_dir(self) -> Self {
        self.lock().deny_make_dir = true;
        self
    }

    pub fn failing_store(self) -> Self {
        self.lock().fail_store = true;
        self
    }

    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            server: self.clone(),
        }
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.lock().directories.contains(&normalize(path))
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(&normalize(path)).cloned()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }
}

#[derive(Debug, Clone)]
pub struct MemoryConnector {
    server: MemoryServer,
}

impl SessionConnector for MemoryConnector {
    fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError> {
        let mut state = self.server.lock();
        if state.refuse_connections {
            return Err(TransferError::Connect {
                address: "memory".to_string(),
                message: "connection refused".to_string(),
            });
        }
        state.sessions_opened += 1;
        Ok(Box::new(MemorySession {
            server: self.server.clone(),
            cwd: "/".to_string(),
            open: true,
        }))
    }
}

struct MemorySession {
    server: MemoryServer,
    cwd: String,
    open: bool,
}

impl MemorySession {
    fn ensure_open(&self, operation: &'static str) -> Result<(), TransferError> {
        if self.open {
            Ok(())
        } else {
            Err(TransferError::command(operation, "session already closed"))
        }
    }
}

impl TransferSession for MemorySession {
    fn current_dir(&mut self) -> Result<String, TransferError> {
        self.ensure_open("PWD")?;
        Ok(self.cwd.clone())
    }

    fn change_dir(&mut self, path: &str) -> Result<(), TransferError> {
        self.ensure_open("CWD")?;
        let target = resolve(&self.cwd, path);
        if !self.server.lock().directories.contains(&target) {
            return Err(TransferError::command(
                "CWD",
                format!("550 {target}: no such directory"),
            ));
        }
        self.cwd = target;
        Ok(())
    }

    fn make_dir(&mut self, path: &str) -> Result<(), TransferError> {
        self.ensure_open("MKD")?;
        let target = resolve(&self.cwd, path);
        let mut state = self.server.lock();
        if state.deny_make_dir {
            return Err(TransferError::command("MKD", format!("550 {target}: permission denied")));
        }
        if state.directories.contains(&target) {
            return Err(TransferError::command("MKD", format!("550 {target}: already exists")));
        }
        if !state.directories.contains(&parent_of(&target)) {
            return Err(TransferError::command("MKD", format!("550 {target}: no such parent")));
        }
        state.directories.insert(target);
        Ok(())
    }

    fn list_names(&mut self) -> Result<Vec<String>, TransferError> {
        self.ensure_open("NLST")?;
        let state = self.server.lock();
        let names = state
            .files
            .keys()
            .chain(state.directories.iter())
            .filter(|path| path.as_str() != self.cwd && parent_of(path) == self.cwd)
            .filter_map(|path| path.rsplit('/').next().map(str::to_string))
            .collect();
        Ok(names)
    }

    fn store(&mut self, filename: &str, payload: &[u8]) -> Result<u64, TransferError> {
        self.ensure_open("STOR")?;
        let mut state = self.server.lock();
        if state.fail_store {
            return Err(TransferError::command("STOR", "451 local error in processing"));
        }
        let path = resolve(&self.cwd, filename);
        state.files.insert(path, payload.to_vec());
        Ok(payload.len() as u64)
    }

    fn quit(&mut self) -> Result<(), TransferError> {
        self.ensure_open("QUIT")?;
        self.open = false;
        self.server.lock().sessions_closed += 1;
        Ok(())
    }
}
