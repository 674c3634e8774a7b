//! MySQL sink: a single logical connection plus schema bootstrap.
//!
//! Holds one `MySqlConnection` (not a pool — the service maintains exactly
//! one logical connection whose lifecycle the supervisor owns). Session
//! initialization creates the target database and the four application
//! tables with create-if-absent semantics on every successful raw connect.

use std::fmt;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Executor};

use super::Sink;
use crate::config::TargetDescriptor;
use crate::error::SinkError;

/// One SQL statement awaiting execution on the live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement(String);

impl SqlStatement {
    /// Wraps a raw SQL string.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// Returns the underlying SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interval between liveness pings while the queue is idle.
const PING_INTERVAL: Duration = Duration::from_secs(5);

/// MySQL-backed [`Sink`] executing one statement per unit.
pub struct MySqlSink {
    target: TargetDescriptor,
    conn: Option<MySqlConnection>,
}

impl fmt::Debug for MySqlSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlSink")
            .field("target", &self.target.addr())
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

impl MySqlSink {
    /// Creates a disconnected sink for the given target.
    #[must_use]
    pub fn new(target: TargetDescriptor) -> Self {
        Self { target, conn: None }
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        // Deliberately no `.database(..)`: the raw connect must succeed
        // before the target database exists, since the initializer is the
        // one that creates it.
        let mut opts = MySqlConnectOptions::new()
            .host(&self.target.host)
            .port(self.target.port);
        if let Some(user) = &self.target.user {
            opts = opts.username(user);
        }
        if let Some(password) = &self.target.password {
            opts = opts.password(password);
        }
        opts
    }

    fn live(&mut self) -> Result<&mut MySqlConnection, SinkError> {
        self.conn
            .as_mut()
            .ok_or_else(|| SinkError::ConnectionLost("no live connection".to_string()))
    }
}

/// Classifies a `sqlx` error once, at the sink boundary.
///
/// Socket-level failures are retryable; everything the server itself
/// rejects (authentication, protocol, malformed statements during connect)
/// is fatal — retrying those would mask configuration mistakes.
fn classify(err: &sqlx::Error) -> SinkError {
    match err {
        sqlx::Error::Io(io) => SinkError::from_io(io),
        sqlx::Error::Tls(e) => SinkError::ConnectionLost(e.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
            SinkError::ConnectionLost(err.to_string())
        }
        other => SinkError::Fatal(other.to_string()),
    }
}

/// DDL for the application schema, in dependency order.
///
/// Every statement is idempotent (`IF NOT EXISTS`); `pending_calls` and
/// `prescription` reference both user tables with cascading delete/update.
fn schema_statements(db: &str) -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS `{db}`.`user_doctor` (
              id INT NOT NULL AUTO_INCREMENT,
              firstname VARCHAR(45) NOT NULL,
              lastname VARCHAR(45),
              email VARCHAR(45) NOT NULL,
              password VARCHAR(100) NOT NULL,
              namespace_id VARCHAR(45) NOT NULL,
              specialization ENUM (
                'Cardiologist', 'Dermatologist', 'General Medicine (MD)', 'Dentist',
                'Gynecologist', 'Neurologist', 'Physiotherapist', 'Orthopedic'
              ) NOT NULL,
              PRIMARY KEY (id),
              UNIQUE INDEX namespace_id_UNIQUE (namespace_id),
              UNIQUE INDEX id_UNIQUE (id),
              UNIQUE INDEX email_UNIQUE (email)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS `{db}`.`user_patient` (
              id INT NOT NULL AUTO_INCREMENT,
              firstname VARCHAR(45) NOT NULL,
              lastname VARCHAR(45),
              email VARCHAR(45) NOT NULL,
              password VARCHAR(100) NOT NULL,
              PRIMARY KEY (id),
              UNIQUE INDEX id_UNIQUE (id),
              UNIQUE INDEX email_UNIQUE (email)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS `{db}`.`pending_calls` (
              id INT NOT NULL AUTO_INCREMENT,
              roomid VARCHAR(45) NOT NULL,
              doctor_id INT NOT NULL,
              patient_id INT NOT NULL,
              PRIMARY KEY (id),
              FOREIGN KEY (doctor_id) REFERENCES `{db}`.user_doctor(id)
                ON DELETE CASCADE ON UPDATE CASCADE,
              FOREIGN KEY (patient_id) REFERENCES `{db}`.user_patient(id)
                ON DELETE CASCADE ON UPDATE CASCADE
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS `{db}`.`prescription` (
              id INT NOT NULL AUTO_INCREMENT,
              details TEXT(1000),
              doctor_id INT NOT NULL,
              patient_id INT NOT NULL,
              PRIMARY KEY (id),
              FOREIGN KEY (doctor_id) REFERENCES `{db}`.user_doctor(id)
                ON DELETE CASCADE ON UPDATE CASCADE,
              FOREIGN KEY (patient_id) REFERENCES `{db}`.user_patient(id)
                ON DELETE CASCADE ON UPDATE CASCADE
            )"
        ),
    ]
}

impl Sink for MySqlSink {
    type Unit = SqlStatement;

    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn connect(&mut self) -> Result<(), SinkError> {
        self.conn = None;
        let conn = self.connect_options().connect().await.map_err(|e| classify(&e))?;
        self.conn = Some(conn);
        Ok(())
    }

    /// Creates the database, selects it, and creates the application
    /// tables.
    ///
    /// Table-creation failures are logged and tolerated (each statement is
    /// independent); a failed database selection aborts the sequence with a
    /// retryable error, since every dependent statement requires it.
    async fn initialize(&mut self) -> Result<(), SinkError> {
        let Some(db) = self.target.database.clone() else {
            return Err(SinkError::Fatal("no target database configured".to_string()));
        };

        let conn = self.live()?;

        if let Err(e) = conn
            .execute(format!("CREATE DATABASE IF NOT EXISTS `{db}`").as_str())
            .await
        {
            tracing::warn!(error = %e, "db init: create database failed");
        }

        if let Err(e) = conn.execute(format!("USE `{db}`").as_str()).await {
            // Without the target database selected, the table statements
            // are meaningless; abort and let the supervisor reconnect.
            return Err(SinkError::ConnectionLost(format!(
                "database selection failed: {e}"
            )));
        }

        for stmt in schema_statements(&db) {
            if let Err(e) = conn.execute(stmt.as_str()).await {
                tracing::warn!(error = %e, "db init: statement failed");
            }
        }

        tracing::info!(database = %db, "database session initialized");
        Ok(())
    }

    async fn send(&mut self, unit: &Self::Unit) -> Result<(), SinkError> {
        let conn = self.live()?;
        conn.execute(unit.as_str()).await.map_err(|e| classify(&e))?;
        Ok(())
    }

    /// Pings the server while idle; a failed ping means the link dropped.
    async fn watch_link(&mut self) -> SinkError {
        let Some(conn) = self.conn.as_mut() else {
            return SinkError::ConnectionLost("no live connection".to_string());
        };
        loop {
            tokio::time::sleep(PING_INTERVAL).await;
            if let Err(e) = conn.ping().await {
                return classify(&e);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn schema_covers_all_four_tables() {
        let stmts = schema_statements("medlink");
        assert_eq!(stmts.len(), 4);
        for (stmt, table) in stmts
            .iter()
            .zip(["user_doctor", "user_patient", "pending_calls", "prescription"])
        {
            assert!(stmt.starts_with("CREATE TABLE IF NOT EXISTS"));
            assert!(stmt.contains(table), "missing table {table}");
        }
    }

    #[test]
    fn schema_tables_cascade_to_user_tables() {
        let stmts = schema_statements("medlink");
        for stmt in stmts.iter().skip(2) {
            assert!(stmt.contains("REFERENCES `medlink`.user_doctor(id)"));
            assert!(stmt.contains("REFERENCES `medlink`.user_patient(id)"));
            assert!(stmt.contains("ON DELETE CASCADE ON UPDATE CASCADE"));
        }
    }

    #[test]
    fn io_failures_are_retryable() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(!classify(&err).is_fatal());
    }

    #[test]
    fn non_connectivity_failures_are_fatal() {
        let err = sqlx::Error::Configuration("bad credentials".into());
        assert!(classify(&err).is_fatal());
    }

    #[tokio::test]
    async fn watch_link_without_connection_is_retryable() {
        let mut sink = MySqlSink::new(TargetDescriptor {
            host: "localhost".to_string(),
            port: 3306,
            user: None,
            password: None,
            database: Some("medlink".to_string()),
        });
        let err = sink.watch_link().await;
        assert!(!err.is_fatal());
    }

    #[test]
    fn sql_statement_roundtrip() {
        let stmt = SqlStatement::new("SELECT 1");
        assert_eq!(stmt.as_str(), "SELECT 1");
        assert_eq!(stmt.to_string(), "SELECT 1");
    }
}
