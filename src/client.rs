//! Client handles over a storage driver.
//!
//! A [`Client`] is a cheaply clonable handle bound to one project and
//! instance of a store. It performs no I/O after [`Client::connect`]; the
//! [`Table`] handles it hands out build lazy scan streams that only touch
//! the store when polled.

use std::{fmt, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{
    logging::scan_log,
    read::{parallel_scan, single_scan, ReadOptions},
    row::ColumnId,
    row_set::RowSet,
    source::StoreDriver,
    stream::RowStream,
};

/// Error raised while establishing a client connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The store could not be reached.
    #[error("connection to {project_id}/{instance_id} failed: {reason}")]
    Connection {
        /// Project the client addressed.
        project_id: String,
        /// Instance the client addressed.
        instance_id: String,
        /// Driver-reported cause.
        reason: String,
    },
    /// The store rejected the supplied credentials.
    #[error("authentication rejected for {project_id}/{instance_id}")]
    Authentication {
        /// Project the client addressed.
        project_id: String,
        /// Instance the client addressed.
        instance_id: String,
    },
    /// A credential file could not be loaded.
    #[error("credential file {path:?} could not be read")]
    Credentials {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

/// Supplies the credential payload a driver presents to the store.
pub trait CredentialProvider: Send + Sync {
    /// Raw credential payload, handed to the driver during connect.
    fn credentials(&self) -> &str;
}

/// Service account credentials held as a JSON payload.
///
/// The payload is never printed: `Debug` elides it.
pub struct ServiceAccountKey {
    json: String,
}

impl ServiceAccountKey {
    /// Wrap an in-memory JSON payload.
    pub fn new(json: impl Into<String>) -> Self {
        ServiceAccountKey { json: json.into() }
    }

    /// Load the JSON payload from a file on disk.
    pub fn read_from_file(path: impl Into<PathBuf>) -> Result<Self, ConnectError> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(ServiceAccountKey { json }),
            Err(source) => Err(ConnectError::Credentials { path, source }),
        }
    }
}

impl CredentialProvider for ServiceAccountKey {
    fn credentials(&self) -> &str {
        &self.json
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey").finish_non_exhaustive()
    }
}

/// Where and how a [`Client`] connects.
#[derive(Clone)]
pub struct ClientConfig {
    project_id: String,
    instance_id: String,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl ClientConfig {
    /// Configuration for one project and instance, with no credentials.
    pub fn new(project_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        ClientConfig {
            project_id: project_id.into(),
            instance_id: instance_id.into(),
            credentials: None,
        }
    }

    /// Attach a credential provider.
    pub fn credentials(self, provider: Arc<dyn CredentialProvider>) -> Self {
        ClientConfig {
            credentials: Some(provider),
            ..self
        }
    }

    /// The project this configuration addresses.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The instance within the project.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The attached credential provider, if any.
    pub fn credential_provider(&self) -> Option<&Arc<dyn CredentialProvider>> {
        self.credentials.as_ref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("project_id", &self.project_id)
            .field("instance_id", &self.instance_id)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Handle to one store instance.
#[derive(Clone)]
pub struct Client {
    driver: Arc<dyn StoreDriver>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Connect `driver` to the store described by `config`.
    ///
    /// The driver validates reachability and credentials up front, so scans
    /// made through the returned handle never fail for connection reasons
    /// that were knowable here.
    pub async fn connect(
        driver: Arc<dyn StoreDriver>,
        config: ClientConfig,
    ) -> Result<Self, ConnectError> {
        driver.connect(&config).await?;
        scan_log!(
            log::Level::Info,
            "client_connect",
            "project={} instance={}",
            config.project_id,
            config.instance_id,
        );
        Ok(Client {
            driver,
            config: Arc::new(config),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind a table name. No I/O happens; an unknown table surfaces as a
    /// scan error when a read stream is first polled.
    pub fn table(&self, table_id: impl Into<String>) -> Table {
        Table {
            driver: Arc::clone(&self.driver),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish()
    }
}

/// Handle to one table of a connected client.
#[derive(Clone)]
pub struct Table {
    driver: Arc<dyn StoreDriver>,
    table_id: String,
}

impl Table {
    /// Name of the table this handle addresses.
    pub fn id(&self) -> &str {
        &self.table_id
    }

    /// Read the rows of `row_set` with one scan, in key order.
    ///
    /// Each row carries one cell per entry of `columns`, in request order;
    /// an empty `columns` list yields key-only rows with no cells. The
    /// stream is lazy; nothing is read until it is polled.
    pub fn read_rows(&self, columns: Vec<ColumnId>, row_set: RowSet) -> RowStream {
        single_scan(
            Arc::clone(&self.driver),
            self.table_id.clone(),
            columns.into(),
            row_set,
        )
    }

    /// Read the rows of `row_set` with up to `options.concurrency` scans
    /// running at once, one per store shard.
    ///
    /// Rows arrive interleaved across shards: the full set of rows matches
    /// [`Table::read_rows`] exactly, but no order holds between rows of
    /// different shards unless `options.ordered` is set. An empty `columns`
    /// list yields key-only rows here as well.
    pub fn parallel_read_rows(
        &self,
        columns: Vec<ColumnId>,
        row_set: RowSet,
        options: ReadOptions,
    ) -> RowStream {
        parallel_scan(
            Arc::clone(&self.driver),
            self.table_id.clone(),
            columns.into(),
            row_set,
            options,
        )
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table_id", &self.table_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::mem::MemStore;

    #[test]
    fn config_debug_redacts_credentials() {
        let config = ClientConfig::new("proj", "inst")
            .credentials(Arc::new(ServiceAccountKey::new("{\"private_key\":\"secret\"}")));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("proj"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
        assert!(!format!("{:?}", ServiceAccountKey::new("secret")).contains("secret"));
    }

    #[test]
    fn service_account_key_reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(b"{\"type\":\"service_account\"}")
            .expect("write payload");

        let key = ServiceAccountKey::read_from_file(file.path()).expect("readable file");
        assert_eq!(key.credentials(), "{\"type\":\"service_account\"}");

        let err = ServiceAccountKey::read_from_file("/nonexistent/credentials.json")
            .expect_err("missing file");
        assert!(matches!(err, ConnectError::Credentials { .. }));
    }

    #[tokio::test]
    async fn connect_refusal_surfaces_as_connection_error() {
        let store = Arc::new(MemStore::new());
        store.refuse_connections();

        let err = Client::connect(
            store as Arc<dyn StoreDriver>,
            ClientConfig::new("proj", "inst"),
        )
        .await
        .expect_err("store refuses");
        assert!(matches!(err, ConnectError::Connection { .. }));
    }

    #[tokio::test]
    async fn empty_credentials_fail_authentication() {
        let store = Arc::new(MemStore::new());

        let config = ClientConfig::new("proj", "inst")
            .credentials(Arc::new(ServiceAccountKey::new("")));
        let err = Client::connect(store as Arc<dyn StoreDriver>, config)
            .await
            .expect_err("empty payload rejected");
        assert!(matches!(err, ConnectError::Authentication { .. }));
    }

    #[tokio::test]
    async fn table_binding_does_no_io() {
        let store = Arc::new(MemStore::new());
        let client = Client::connect(
            Arc::clone(&store) as Arc<dyn StoreDriver>,
            ClientConfig::new("proj", "inst"),
        )
        .await
        .expect("connect succeeds");

        let table = client.table("never-created");
        assert_eq!(table.id(), "never-created");
        assert_eq!(store.scans_started(), 0);
    }
}
