//! Common fixtures for integration tests.

use std::sync::Arc;

use shardscan::{mem::MemStore, source::StoreDriver, Client, ClientConfig, ColumnId};

/// Table every test reads from.
pub const TABLE: &str = "parallel-read";

/// Number of rows the fixture writes.
pub const ROWS: usize = 20;

/// Columns every test requests, in request order.
pub fn columns() -> Vec<ColumnId> {
    vec![
        "fam1:col1".parse().expect("valid column"),
        "fam2:col2".parse().expect("valid column"),
    ]
}

/// Key of fixture row `row`.
pub fn key_of(row: usize) -> String {
    format!("row{row:03}")
}

/// Value of the fixture cell at `(row, column)`.
pub fn cell_of(row: usize, column: usize) -> String {
    format!("[{row},{column}]")
}

/// A store holding one twenty-row table split into four tablets.
pub fn seeded_store() -> Arc<MemStore> {
    let store = Arc::new(MemStore::new());
    store.create_table(TABLE, &["fam1", "fam2"], &["row005", "row010", "row015"]);
    for row in 0..ROWS {
        for (index, column) in columns().iter().enumerate() {
            store
                .write(TABLE, key_of(row), column, cell_of(row, index).into_bytes())
                .expect("write fixture cell");
        }
    }
    store
}

/// Connect a client to `store`.
pub async fn connect(store: &Arc<MemStore>) -> Client {
    Client::connect(
        Arc::clone(store) as Arc<dyn StoreDriver>,
        ClientConfig::new("fixture-project", "fixture-instance"),
    )
    .await
    .expect("connect to mem store")
}
