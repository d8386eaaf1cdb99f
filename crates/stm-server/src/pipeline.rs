//! Request pipeline: authenticate, open one transaction, run, commit or roll back.
//!
//! ```text
//! NoTransaction ──token ok──▶ TransactionOpen ──Ok──▶ Committed
//!       │                           │
//!       └─401 (nothing opened)      └─Err / panic──▶ RolledBack
//! ```
//!
//! Exactly one of commit and rollback happens for every opened transaction,
//! and the response status always matches it: a failed commit turns a
//! success into a 500.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use libsql::{Connection, Transaction};
use stm_auth::AuthError;
use stm_core::identity::AuthIdentity;
use stm_db::StmDb;
use stm_db::services::{PermissionService, ProjectService, TaskService};

use crate::api::{self, ApiRequest, Method};
use crate::error::ApiError;
use crate::reply::{HttpReply, Reply};

/// The services of one request, all bound to the same transaction.
pub struct Services<'tx> {
    pub permissions: &'tx PermissionService<'tx>,
    pub tasks: &'tx TaskService<'tx>,
    pub projects: &'tx ProjectService<'tx>,
}

/// Something the pipeline can run inside a request transaction.
#[allow(async_fn_in_trait)]
pub trait Operation {
    /// Short name for the log.
    fn name(&self) -> &'static str;

    /// Run against `services` on behalf of the authenticated `user`.
    async fn run(self, services: &Services<'_>, user: &str) -> Result<Reply, ApiError>;
}

pub struct Pipeline {
    db: Arc<StmDb>,
    secret: String,
}

impl Pipeline {
    #[must_use]
    pub fn new(db: Arc<StmDb>, secret: impl Into<String>) -> Self {
        Self {
            db,
            secret: secret.into(),
        }
    }

    /// Route and execute one request.
    ///
    /// Preflight requests and unknown routes are answered without
    /// authentication and without a transaction.
    pub async fn handle(&self, request: &ApiRequest) -> HttpReply {
        if request.method == Method::Options {
            return HttpReply::preflight();
        }
        let Some(call) = api::route(request) else {
            tracing::debug!(method = ?request.method, path = %request.path, "no route");
            return HttpReply::status(404);
        };
        self.execute(request.token().as_deref(), call).await
    }

    /// Authenticate `token`, then run `operation` in its own transaction.
    ///
    /// An `operation` that failed to decode still opens the transaction and is
    /// rolled back like any other failure.
    pub async fn execute<O: Operation>(
        &self,
        token: Option<&str>,
        operation: Result<O, ApiError>,
    ) -> HttpReply {
        let identity = match self.authenticate(token) {
            Ok(identity) => identity,
            Err(error) => {
                // No detail to the caller, which may be an attacker.
                tracing::error!(%error, "token verification failed");
                return HttpReply::error(&error);
            }
        };

        let name = operation.as_ref().map_or("undecodable", |op| op.name());
        tracing::info!(user = %identity.user, uid = %identity.uid, operation = name, "call");

        match self.in_transaction(operation, &identity.user).await {
            Ok(reply) => HttpReply::ok(reply),
            Err(error) => {
                let reply = HttpReply::error(&error);
                if reply.status >= 500 {
                    tracing::error!(%error, operation = name, status = reply.status, "request failed");
                } else {
                    tracing::warn!(%error, operation = name, status = reply.status, "request rejected");
                }
                reply
            }
        }
    }

    fn authenticate(&self, token: Option<&str>) -> Result<AuthIdentity, ApiError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        Ok(stm_auth::verify(token, &self.secret, Utc::now())?)
    }

    async fn in_transaction<O: Operation>(
        &self,
        operation: Result<O, ApiError>,
        user: &str,
    ) -> Result<Reply, ApiError> {
        let tx = self.db.begin().await?;

        let outcome = AssertUnwindSafe(run(&tx, operation, user))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ApiError::Panic(panic_message(payload.as_ref()))));

        settle(tx, outcome).await
    }
}

/// Commit on success, roll back otherwise. A refused commit becomes the error.
async fn settle(tx: Transaction, outcome: Result<Reply, ApiError>) -> Result<Reply, ApiError> {
    match outcome {
        Ok(reply) => {
            let conn = Connection::clone(&tx);
            if let Err(error) = tx.commit().await {
                // SQLite keeps the transaction open when COMMIT is refused.
                if let Err(rollback) = conn.execute("ROLLBACK", ()).await {
                    tracing::debug!(error = %rollback, "nothing left to roll back");
                }
                return Err(error.into());
            }
            Ok(reply)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, "rollback failed");
            }
            Err(error)
        }
    }
}

async fn run<O: Operation>(
    tx: &Transaction,
    operation: Result<O, ApiError>,
    user: &str,
) -> Result<Reply, ApiError> {
    let operation = operation?;
    let permissions = PermissionService::new(tx);
    let tasks = TaskService::new(tx, &permissions);
    let projects = ProjectService::new(tx, &tasks, &permissions);
    let services = Services {
        permissions: &permissions,
        tasks: &tasks,
        projects: &projects,
    };
    operation.run(&services, user).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn count_members(db: &StmDb) -> i64 {
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM project_users", ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    }

    #[tokio::test]
    async fn refused_commit_fails_the_request_and_applies_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stm.db");
        let db = StmDb::open_local(path.to_str().unwrap(), Duration::from_millis(200))
            .await
            .unwrap();

        // A dangling member row passes now and trips the foreign key at COMMIT.
        let tx = db.begin().await.unwrap();
        tx.execute("PRAGMA defer_foreign_keys = ON", ()).await.unwrap();
        tx.execute(
            "INSERT INTO project_users (project_id, user_id, position) VALUES ('ghost', 'Peter', 0)",
            (),
        )
        .await
        .unwrap();

        let error = settle(tx, Ok(Reply::Empty)).await.unwrap_err();
        assert_eq!(HttpReply::error(&error).status, 500);
        assert_eq!(count_members(&db).await, 0);

        // The database takes writes again afterwards.
        let tx = db.begin().await.unwrap();
        assert_eq!(settle(tx, Ok(Reply::Empty)).await.unwrap(), Reply::Empty);
    }

    #[test]
    fn panic_messages() {
        let text: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(text.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
