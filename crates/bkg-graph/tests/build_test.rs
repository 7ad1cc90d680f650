#![cfg(feature = "test-utils")]

// Knowledge graph build against a real Neo4j.
//
// Requirements: Docker (for Neo4j via testcontainers)
//
// Run with: cargo test -p bkg-graph --features test-utils --test build_test

use std::fs;
use std::path::Path;

use bkg_core::{BoroughFilter, DataPaths};
use bkg_graph::client::graph_counts;
use bkg_graph::import::{import_businesses, import_population, import_survival};
use bkg_graph::queries::{
    all_boroughs, bubble_chart_data, business_count_for_all_boroughs, business_count_for_boroughs,
    population_for_boroughs, survival_rates_for_boroughs,
};
use bkg_graph::{run_build, BuildOptions, CypherExecutor, GraphClient, RecordExt, Statement};

async fn setup() -> (impl std::any::Any, GraphClient) {
    bkg_graph::testutil::neo4j_container().await
}

fn write_fixture(dir: &Path) -> DataPaths {
    let paths = DataPaths::default().rebase(dir);
    fs::create_dir_all(paths.businesses.parent().unwrap()).unwrap();
    fs::write(
        &paths.businesses,
        "osm_id,name_business,fclass,area
1,Pub A,pub,Merton
2,Cafe B,cafe,Sutton
3,,pub,Sutton
4,Pub D,pub,
",
    )
    .unwrap();
    fs::write(
        &paths.population,
        "Name,Year,Source,Population,Population_per_square_kilometre
Merton,2020,GLA,100000,2660.5
Merton,2021,GLA,101000,2700.0
Sutton,2020,GLA,200000,4500
Inner London,2020,GLA,3000000,
Outer London,2020,GLA,5000000,
Greater London,2020,GLA,8000000,
",
    )
    .unwrap();
    fs::write(
        &paths.survival,
        "area,year,births,1_year_survival_rate,2_year_survival_rate,3_year_survival_rate,4_year_survival_rate,5_year_survival_rate
Merton,2016,1200,95.1,80.2,,55.0,44.4
Sutton,2016,900,92.0,75.0,60.0,50.0,40.0
",
    )
    .unwrap();
    fs::write(
        &paths.adjacency,
        "borough,neighbour
Merton,Sutton
Merton,Wandsworth
",
    )
    .unwrap();
    fs::write(
        &paths.hierarchy,
        "borough,parent
Merton,Outer London
Sutton,Outer London
",
    )
    .unwrap();
    paths
}

async fn count(client: &GraphClient, cypher: &str) -> i64 {
    let outcome = client.query(Statement::new(cypher)).await.unwrap();
    outcome.records[0].int("count").unwrap()
}

#[tokio::test]
async fn end_to_end_ratio() {
    let (_container, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    };

    let report = run_build(&client, &options, None).await.unwrap();
    assert_eq!(report.stages.len(), 8);

    let merton = vec!["Merton".to_string()];
    let counts = business_count_for_boroughs(&client, &merton, "pub").await.unwrap();
    assert_eq!(counts.get("Merton"), Some(&1));
    let pops = population_for_boroughs(&client, &merton, 2020).await.unwrap();
    assert_eq!(pops.get("Merton"), Some(&100000));

    let rows = bubble_chart_data(&client, "Merton", 2020, "pub").await.unwrap();
    assert_eq!(rows[0].borough, "Merton");
    assert!((rows[0].business_to_population_ratio - 0.1).abs() < 1e-9);

    let all = business_count_for_all_boroughs(&client, "cafe").await.unwrap();
    assert_eq!(all.get("Merton"), Some(&0));
    assert_eq!(all.get("Sutton"), Some(&1));
}

#[tokio::test]
async fn population_is_one_node_per_borough_year() {
    let (_container, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    };
    run_build(&client, &options, None).await.unwrap();

    assert_eq!(count(&client, "MATCH (p:Population) RETURN count(p) AS count").await, 6);
    assert_eq!(
        count(
            &client,
            "MATCH (:Borough {name: 'Merton'})-[:HAS_POPULATION]->(p:Population) RETURN count(p) AS count"
        )
        .await,
        2
    );
}

#[tokio::test]
async fn node_import_is_idempotent() {
    let (_container, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    };
    run_build(&client, &options, None).await.unwrap();
    let before = graph_counts(&client).await.unwrap();

    let filter = BoroughFilter::all();
    import_businesses(&client, &options.paths.businesses, &filter).await.unwrap();
    import_population(&client, &options.paths.population, &filter).await.unwrap();
    import_survival(&client, &options.paths.survival, &filter, options.survival_key)
        .await
        .unwrap();

    let after = graph_counts(&client).await.unwrap();
    for label in ["Borough", "BusinessType", "Business", "Population"] {
        assert_eq!(before.labels.get(label), after.labels.get(label), "{label} count changed");
    }
    assert_eq!(before.relationships, after.relationships);
}

#[tokio::test]
async fn relationships_are_complete_and_symmetric() {
    let (_container, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    };
    run_build(&client, &options, None).await.unwrap();

    // Businesses 1-3 have an area; 4 does not.
    assert_eq!(
        count(&client, "MATCH (:Business)-[r:LOCATED_IN]->(:Borough) RETURN count(r) AS count").await,
        3
    );
    assert_eq!(
        count(&client, "MATCH (:Business)-[r:LOCATED_IN]->(t) WHERE NOT t:Borough RETURN count(r) AS count").await,
        0
    );

    assert_eq!(
        count(
            &client,
            "MATCH (a:Borough)-[:NEIGHBOURS]->(b:Borough) WHERE NOT (b)-[:NEIGHBOURS]->(a) RETURN count(*) AS count"
        )
        .await,
        0
    );
    // Wandsworth was never imported, so only Merton<->Sutton exists.
    assert_eq!(
        count(&client, "MATCH ()-[r:NEIGHBOURS]->() RETURN count(r) AS count").await,
        2
    );

    assert_eq!(
        count(
            &client,
            "MATCH (:Borough {name: 'Merton'})-[:PART_OF]->(:Borough {name: 'Outer London'})-[:PART_OF]->(:Borough {name: 'Greater London'}) RETURN count(*) AS count"
        )
        .await,
        1
    );
    assert!(!all_boroughs(&client).await.unwrap().contains(&"Wandsworth".to_string()));
}

#[tokio::test]
async fn filtered_build_and_null_omission() {
    let (_container, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    }
    .with_boroughs(["Merton"]);
    run_build(&client, &options, None).await.unwrap();

    assert_eq!(all_boroughs(&client).await.unwrap(), vec!["Merton"]);
    assert_eq!(
        count(
            &client,
            "MATCH (b:Business)-[:LOCATED_IN]->(r:Borough) WHERE r.name <> 'Merton' RETURN count(b) AS count"
        )
        .await,
        0
    );
    assert_eq!(count(&client, "MATCH (b:Business) RETURN count(b) AS count").await, 1);

    let outcome = client
        .query(Statement::new("MATCH (s:BusinessSurvival) RETURN keys(s) AS keys"))
        .await
        .unwrap();
    let keys = outcome.records[0].text_list("keys").unwrap();
    assert!(keys.contains(&"one_year_rate".to_string()));
    assert!(!keys.contains(&"three_year_rate".to_string()));

    let rates = survival_rates_for_boroughs(&client, &["Merton".to_string()], 2016)
        .await
        .unwrap();
    assert_eq!(rates[0].three_year_rate, None);
    assert_eq!(rates[0].businesses_started, Some(1200));
}

#[tokio::test]
async fn rebuild_drops_custom_constraints() {
    let (_container, client) = setup().await;
    client
        .run(Statement::new(
            "CREATE CONSTRAINT `legacy id` IF NOT EXISTS FOR (n:Legacy) REQUIRE n.id IS UNIQUE",
        ))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        paths: write_fixture(dir.path()),
        ..Default::default()
    };
    run_build(&client, &options, None).await.unwrap();

    let outcome = client
        .query(Statement::new("SHOW CONSTRAINTS YIELD name RETURN name"))
        .await
        .unwrap();
    let names: Vec<String> = outcome
        .records
        .iter()
        .map(|r| r.text("name").unwrap())
        .collect();
    assert!(!names.contains(&"legacy id".to_string()));
    assert!(names.contains(&"borough_name".to_string()));
    assert!(names.contains(&"business_identity".to_string()));
}
