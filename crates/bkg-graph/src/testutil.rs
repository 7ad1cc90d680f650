//! Test utilities for spinning up a real Neo4j instance via testcontainers.

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use crate::{GraphClient, GraphConfig};

const TEST_PASSWORD: &str = "testpassword";

/// Start a Neo4j community container and connect to it.
///
/// The container stops when the returned handle is dropped, so keep it
/// alive for the whole test.
pub async fn neo4j_container() -> (ContainerAsync<GenericImage>, GraphClient) {
    let image = GenericImage::new("neo4j", "5.25.1-community")
        .with_exposed_port(ContainerPort::Tcp(7687))
        .with_wait_for(WaitFor::message_on_stdout("Started."))
        .with_env_var("NEO4J_AUTH", format!("neo4j/{TEST_PASSWORD}"));

    let container: ContainerAsync<GenericImage> = image
        .start()
        .await
        .expect("Failed to start Neo4j container");

    let host_port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("Failed to get Neo4j host port");

    let config = GraphConfig {
        uri: format!("bolt://127.0.0.1:{host_port}"),
        password: TEST_PASSWORD.to_string(),
        ..GraphConfig::default()
    };
    let client = GraphClient::connect(&config)
        .await
        .expect("Failed to connect to Neo4j");

    (container, client)
}
