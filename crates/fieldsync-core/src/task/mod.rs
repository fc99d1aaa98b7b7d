//! Single-use units of work with blocking and dispatched entry points.

use std::slice;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::auth::{Authentication, Credentials, UserService};
use crate::db::{SharedDatabase, Stores};
use crate::error::{Error, Result};
use crate::handler::{upsert, EntityHandler, EntityKind, ReconcileReport, UserHandler};
use crate::models::AuthenticatedUserRow;
use crate::payload::{Syncable, User};

/// A unit of work that runs at most once.
pub trait Task: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Run on the calling thread.
    fn execute(&self) -> Result<Self::Output>;

    fn is_executed(&self) -> bool;

    /// Run on the runtime's blocking pool; the outcome arrives through the handle.
    fn execute_async(self: Arc<Self>, runtime: &Handle) -> TaskHandle<Self::Output>
    where
        Self: Sized,
    {
        TaskHandle {
            inner: runtime.spawn_blocking(move || self.execute()),
        }
    }

    fn cancel(&self) -> Result<()> {
        Err(Error::UnsupportedOperation("cancel"))
    }

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Outcome of a dispatched task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<Result<T>>,
}

impl<T> TaskHandle<T> {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub async fn join(self) -> Result<T> {
        self.inner
            .await
            .map_err(|error| Error::TaskFailed(error.to_string()))?
    }
}

/// Flag flipped by the first execution attempt.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    executed: Mutex<bool>,
}

impl ExecutionGuard {
    pub fn claim(&self) -> Result<()> {
        let mut executed = self.executed.lock();
        if *executed {
            return Err(Error::AlreadyExecuted);
        }
        *executed = true;
        Ok(())
    }

    pub fn is_executed(&self) -> bool {
        *self.executed.lock()
    }
}

/// Signs a user in and stores the profile returned by the server.
///
/// On [`Authentication::Authenticated`] the user, its credentials, its
/// organisation unit links and the authenticated user record are written in
/// one transaction. A rejected attempt writes nothing.
pub struct UserAuthenticateTask {
    database: SharedDatabase,
    service: Arc<dyn UserService>,
    credentials: Credentials,
    guard: ExecutionGuard,
}

impl UserAuthenticateTask {
    pub fn new(
        database: SharedDatabase,
        service: Arc<dyn UserService>,
        credentials: Credentials,
    ) -> Self {
        Self {
            database,
            service,
            credentials,
            guard: ExecutionGuard::default(),
        }
    }

    fn save_user(&self, user: &User) -> Result<()> {
        let mut database = self.database.lock();
        let tx = database.connection_mut().transaction()?;
        {
            let stores = Stores::new(&tx);
            let mut report = ReconcileReport::new();
            UserHandler::new(&stores).handle(None, slice::from_ref(user), &mut report)?;

            // Unit links may point at units not synced yet; the user itself must land.
            let failures: Vec<_> = report
                .into_failures()
                .into_iter()
                .filter(|failure| {
                    if matches!(failure.kind, EntityKind::User | EntityKind::UserCredentials) {
                        true
                    } else {
                        tracing::warn!("Skipped while saving user: {failure}");
                        false
                    }
                })
                .collect();
            if !failures.is_empty() {
                return Err(Error::RolledBack { failures });
            }

            let record = AuthenticatedUserRow {
                user: user.uid().to_string(),
                credentials: self.credentials.encoded(),
            };
            upsert(&stores.authenticated_users, &record, user.uid())?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for UserAuthenticateTask {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("UserAuthenticateTask")
            .field("credentials", &self.credentials)
            .field("executed", &self.guard.is_executed())
            .finish_non_exhaustive()
    }
}

impl Task for UserAuthenticateTask {
    type Output = Authentication;

    fn execute(&self) -> Result<Authentication> {
        self.guard.claim()?;

        let outcome = self.service.authenticate(&self.credentials)?;
        match &outcome {
            Authentication::Authenticated(user) => {
                self.save_user(user)?;
                tracing::info!("Authenticated {} as user {}", self.credentials.username(), user.uid());
            }
            Authentication::Rejected { status, message } => {
                tracing::warn!(
                    "Authentication rejected for {} ({status}): {message}",
                    self.credentials.username()
                );
            }
        }
        Ok(outcome)
    }

    fn is_executed(&self) -> bool {
        self.guard.is_executed()
    }
}
