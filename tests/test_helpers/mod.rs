//! Shared backends and log capture for integration tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use credential_liaison::config::LiaisonConfig;
use credential_liaison::manager::{
    adapters::memory::InMemoryCredentialBackend,
    ports::{BackendResult, CredentialBackend, ManagerRequests},
    services::{Liaison, RegisterManagerRequest},
};
use credential_liaison::request::domain::{
    ManagerMethod, RequestContext, RequestMethod, SessionContext,
};
use serde_json::json;
use tokio::sync::{Notify, Semaphore};

/// Origin seeded into the built-in backend.
pub const ORIGIN: &str = "https://shop.example";

/// Signing key seeded for [`ORIGIN`].
pub const SIGNING_KEY: &str = "key-1";

/// The `manager.getSigningKey` method.
pub const GET_SIGNING_KEY: RequestMethod = RequestMethod::Manager(ManagerMethod::GetSigningKey);

/// The `manager.getCredentialsMetadata` method.
pub const GET_CREDENTIALS_METADATA: RequestMethod =
    RequestMethod::Manager(ManagerMethod::GetCredentialsMetadata);

/// Returns a session context for test requests.
pub fn session() -> SessionContext {
    SessionContext::new("session-1").with_document_url("https://shop.example/login")
}

/// Builds the in-memory built-in backend seeded with [`SIGNING_KEY`].
pub fn seeded_builtin() -> InMemoryCredentialBackend {
    InMemoryCredentialBackend::new().with_signing_key(ORIGIN, SIGNING_KEY)
}

/// Builds a registry around [`seeded_builtin`].
pub fn seeded_liaison() -> Liaison {
    Liaison::new(Arc::new(seeded_builtin()), LiaisonConfig::default())
        .expect("default configuration should be valid")
}

/// Registers `backend` as an external manager under `id`.
pub fn register(liaison: &Liaison, id: &str, backend: Arc<dyn CredentialBackend>) {
    liaison
        .register_manager(RegisterManagerRequest::external(id, id), backend)
        .expect("test registration should succeed");
}

// ── Gated backend ──────────────────────────────────────────────────

/// Credential count reported by [`GatedBackend`] for every origin.
pub const GATED_CREDENTIAL_COUNT: u64 = 7;

/// Manager-only backend that holds every request until released.
pub struct GatedBackend {
    entered: Notify,
    completed: Notify,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedBackend {
    /// Creates a backend with a closed gate.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            completed: Notify::new(),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    /// Waits until a request has entered the backend.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets one held request resolve.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Waits until a released request has been resolved.
    pub async fn completed(&self) {
        self.completed.notified().await;
    }

    /// Returns how many requests reached the backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn hold(&self) -> BackendResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.gate.acquire().await?.forget();
        Ok(())
    }
}

impl CredentialBackend for GatedBackend {
    fn manager(&self) -> Option<&dyn ManagerRequests> {
        Some(self)
    }
}

#[async_trait]
impl ManagerRequests for GatedBackend {
    async fn get_signing_key(&self, context: RequestContext, origin: String) -> BackendResult {
        self.hold().await?;
        context.response().resolve(json!(format!("gated:{origin}")))?;
        self.completed.notify_one();
        Ok(())
    }

    async fn get_credentials_metadata(
        &self,
        context: RequestContext,
        _origin: String,
    ) -> BackendResult {
        self.hold().await?;
        context.response().resolve(json!(GATED_CREDENTIAL_COUNT))?;
        self.completed.notify_one();
        Ok(())
    }
}

// ── Failing backends ───────────────────────────────────────────────

/// How a [`FaultyBackend`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Returns an error without completing the request.
    Error,
    /// Panics without completing the request.
    Panic,
    /// Resolves, then returns an error.
    ErrorAfterResolve,
    /// Rejects with an error that has no transport representation.
    OpaqueRejection,
}

/// Manager-only backend that fails in a configurable way.
pub struct FaultyBackend {
    fault: Fault,
}

impl FaultyBackend {
    /// Creates a backend failing with `fault`.
    pub fn new(fault: Fault) -> Arc<Self> {
        Arc::new(Self { fault })
    }
}

impl CredentialBackend for FaultyBackend {
    fn manager(&self) -> Option<&dyn ManagerRequests> {
        Some(self)
    }
}

#[async_trait]
impl ManagerRequests for FaultyBackend {
    async fn get_signing_key(&self, context: RequestContext, _origin: String) -> BackendResult {
        match self.fault {
            Fault::Error => Err("boom".into()),
            Fault::Panic => panic!("boom"),
            Fault::ErrorAfterResolve => {
                context.response().resolve(json!("k1"))?;
                Err("boom".into())
            }
            Fault::OpaqueRejection => {
                context
                    .response()
                    .reject_with(io::Error::other("vault sealed"))?;
                Ok(())
            }
        }
    }

    async fn get_credentials_metadata(
        &self,
        context: RequestContext,
        _origin: String,
    ) -> BackendResult {
        context.response().resolve(json!(0))?;
        Ok(())
    }
}

// ── Log capture ────────────────────────────────────────────────────

/// In-memory sink for formatted log output.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Returns everything logged so far.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a capturing subscriber as the thread's default.
///
/// Logs are captured until the returned guard is dropped.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
