use cname_finalizer_domain::DomainError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-request state shared by every port call made while serving one client query.
#[derive(Debug, Clone)]
pub struct RequestContext {
    server: Arc<str>,
    client_addr: Option<SocketAddr>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(server: impl Into<Arc<str>>) -> Self {
        Self {
            server: server.into(),
            client_addr: None,
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_client(mut self, client_addr: SocketAddr) -> Self {
        self.client_addr = Some(client_addr);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tie this request to a parent token, e.g. server shutdown.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Identity used as the `server` metric label.
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn client_addr(&self) -> Option<SocketAddr> {
        self.client_addr
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline, `None` when the request has no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Run `fut` bounded by this request's cancellation and deadline.
    ///
    /// Work started after the request was cancelled or expired is never polled.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        if self.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        if self.is_expired() {
            return Err(DomainError::QueryTimeout);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| DomainError::QueryTimeout)?,
                None => fut.await,
            }
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(DomainError::Cancelled),
            result = bounded => result,
        }
    }
}
