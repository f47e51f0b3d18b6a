use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use invscan_common::directory::{DirectoryAuth, DirectoryError, DirectoryQuery, DirectoryService};
use invscan_common::inventory::{Credential, HostTarget, InstalledProduct};
use invscan_common::registry::{LookupError, LookupRequest, LookupResult, RemoteRegistry};

pub fn host(name: &str) -> HostTarget {
    name.parse().unwrap()
}

pub fn hosts(names: &[&str]) -> Vec<HostTarget> {
    names.iter().map(|n| host(n)).collect()
}

/// A directory that answers with a fixed list, or fails.
pub struct FakeDirectory {
    answer: Result<Vec<String>, String>,
    calls: AtomicUsize,
    last_auth: Mutex<Option<DirectoryAuth>>,
}

impl FakeDirectory {
    pub fn with_computers(names: &[&str]) -> Self {
        Self::new(Ok(names.iter().map(|n| n.to_string()).collect()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Err(message.to_string()))
    }

    fn new(answer: Result<Vec<String>, String>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_auth: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_auth(&self) -> Option<DirectoryAuth> {
        self.last_auth.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn computers(&self, query: &DirectoryQuery) -> Result<Vec<HostTarget>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_auth.lock().unwrap() = Some(query.auth.clone());
        match &self.answer {
            Ok(names) => Ok(names.iter().map(|n| host(n)).collect()),
            Err(message) => Err(DirectoryError::new(message.clone())),
        }
    }
}

/// A registry with a canned answer per host. Unknown hosts have nothing installed.
#[derive(Default)]
pub struct FakeRegistry {
    answers: HashMap<String, LookupResult>,
    contacted: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeRegistry {
    pub fn installed(mut self, name: &str, versions: &[&str]) -> Self {
        let entries = versions
            .iter()
            .map(|v| InstalledProduct::new(format!("Mozilla Thunderbird ({v})"), *v, name))
            .collect();
        self.answers.insert(name.to_string(), Ok(entries));
        self
    }

    pub fn unreachable(mut self, name: &str) -> Self {
        let error = LookupError::new(
            "CannotConnect,PSSessionStateBroken",
            name,
            format!("Connecting to remote server {name} failed: WinRM cannot complete the operation."),
        );
        self.answers.insert(name.to_string(), Err(error.into()));
        self
    }

    /// Hosts contacted, in call order, with the user name the call ran as.
    pub fn contacted(&self) -> Vec<(String, Option<String>)> {
        self.contacted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteRegistry for FakeRegistry {
    async fn lookup(
        &self,
        host: &HostTarget,
        _request: &LookupRequest,
        credential: Option<&Credential>,
    ) -> LookupResult {
        self.contacted
            .lock()
            .unwrap()
            .push((host.to_string(), credential.map(|c| c.username().to_string())));
        self.answers.get(host.as_str()).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}
