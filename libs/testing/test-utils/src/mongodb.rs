//! MongoDB test infrastructure backed by testcontainers.

use mongodb::{Client, Database};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::mongo::Mongo;
use uuid::Uuid;

/// A MongoDB container with a fresh, uniquely-named database.
///
/// The container lives as long as this value; dropping it tears the
/// container down, so no cleanup between tests is needed.
pub struct TestMongo {
    _container: ContainerAsync<Mongo>,
    client: Client,
    database: Database,
}

impl TestMongo {
    /// Start a MongoDB container and connect a client to it.
    ///
    /// # Panics
    ///
    /// Panics if the container cannot be started or the client cannot
    /// connect; test infrastructure failures should fail loudly.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("failed to start MongoDB container");

        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("failed to resolve MongoDB container port");
        let url = format!("mongodb://127.0.0.1:{}", port);

        let client = Client::with_uri_str(&url)
            .await
            .expect("failed to connect to MongoDB container");

        // Unique database name keeps tests sharing a container isolated
        let database = client.database(&format!("test-{}", Uuid::new_v4().simple()));

        tracing::debug!(url = %url, db = %database.name(), "test MongoDB ready");

        Self {
            _container: container,
            client,
            database,
        }
    }

    /// The connected MongoDB client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// A handle to this test's database
    pub fn database(&self) -> Database {
        self.database.clone()
    }
}
