use server_cluster_analyzer::cluster::detection::ConnectedComponents;
use server_cluster_analyzer::cluster::Louvain;
use server_cluster_analyzer::{
    analyze, data, run, storage, CommunityId, Config, EdgeStrategy, OracleKind, ServerRecord,
};
use std::collections::HashSet;
use tempfile::TempDir;

fn fleet() -> Vec<ServerRecord> {
    vec![
        ServerRecord::new("web01", ["nginx", "php", "memcached"]),
        ServerRecord::new("web02", ["nginx", "php", "memcached"]),
        ServerRecord::new("web03", ["nginx", "php"]),
        ServerRecord::new("db01", ["postgres", "pgbouncer", "backup-agent"]),
        ServerRecord::new("db02", ["postgres", "pgbouncer", "backup-agent"]),
        ServerRecord::new("mail01", ["postfix"]),
        ServerRecord::new("bare01", Vec::<String>::new()),
    ]
}

#[test]
fn louvain_run_labels_every_server_once() {
    let records = fleet();
    let outcome = run(&records, &Config::default()).unwrap();

    let servers: HashSet<&str> = records.iter().map(|r| r.server.as_str()).collect();
    let labeled: HashSet<&str> = outcome
        .labels
        .cluster_labels()
        .keys()
        .map(String::as_str)
        .chain(outcome.labels.isolated_servers())
        .collect();

    assert_eq!(labeled, servers);
    assert_eq!(outcome.labels.len(), records.len());
    assert_eq!(outcome.clusters.server_count(), records.len());

    assert_eq!(outcome.labels.label_for("mail01"), Some("APP_postfix"));
    assert!(outcome.labels.is_isolated("mail01"));
    assert!(!outcome.labels.is_isolated("bare01"));

    let web = outcome.labels.label_for("web01").unwrap();
    assert!(web.starts_with("CLUSTER_"));
    assert!(web.ends_with("_nginx_php"));
    assert_eq!(outcome.labels.label_for("web03"), Some(web));

    let db = outcome.labels.label_for("db01").unwrap();
    assert!(db.ends_with("_backup-agent_pgbouncer_postgres"));
}

#[test]
fn statistics_are_sorted_and_exact() {
    let records = fleet();
    let outcome = run(&records, &Config::default()).unwrap();

    let sizes: Vec<usize> = outcome.statistics.iter().map(|s| s.num_servers).collect();
    let mut sorted = sizes.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(sizes, sorted);

    for stat in &outcome.statistics {
        let members = outcome.clusters.members(stat.cluster_id).unwrap();
        let total: usize = members
            .iter()
            .map(|server| outcome.graph.apps(server).unwrap().len())
            .sum();
        let expected = total as f64 / members.len() as f64;
        approx::assert_relative_eq!(stat.avg_apps_per_server, expected);
    }
}

#[test]
fn oracles_agree_on_disconnected_groups() {
    let records = fleet();
    let config = Config::default();
    let louvain = analyze(&records, &Louvain::new(), &config).unwrap();
    let components = analyze(&records, &ConnectedComponents, &config).unwrap();

    assert_eq!(louvain.clusters.len(), components.clusters.len());
    assert_eq!(louvain.labels.all_labels(), components.labels.all_labels());
}

#[test]
fn scenario_from_two_shared_servers_and_a_loner() {
    let records = vec![
        ServerRecord::new("A", ["web", "db"]),
        ServerRecord::new("B", ["web", "db"]),
        ServerRecord::new("C", ["cache"]),
    ];
    let config = Config::new(OracleKind::Louvain, 1.0, EdgeStrategy::Bucketed);
    let outcome = run(&records, &config).unwrap();

    assert_eq!(outcome.graph.edge_count(), 1);
    assert_eq!(outcome.graph.edge_weight("A", "B"), Some(2));
    assert_eq!(outcome.partition.community_of("A"), Some(CommunityId(0)));
    assert_eq!(outcome.partition.community_of("C"), Some(CommunityId(1)));
    assert_eq!(outcome.labels.cluster_labels().len(), 2);
    assert_eq!(outcome.labels.label_for("B"), Some("CLUSTER_0_db_web"));
    assert_eq!(outcome.labels.isolated_servers(), vec!["C"]);
    assert_eq!(outcome.labels.label_for("C"), Some("APP_cache"));
}

#[test]
fn empty_input_produces_empty_outputs() {
    let outcome = run(&[], &Config::default()).unwrap();

    assert!(outcome.is_empty());
    assert!(outcome.partition.is_empty());
    assert!(outcome.labels.is_empty());
    assert!(outcome.statistics.is_empty());
}

#[test]
fn json_file_round_trip_through_storage() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("servers.json");
    std::fs::write(
        &input,
        r#"[
            {"server": "app1", "apps": ["tomcat", "java"]},
            {"server": "app2", "apps": ["tomcat", "java", "java"]},
            {"server": "dns1", "apps": ["bind"]}
        ]"#,
    )
    .unwrap();

    let records = data::load_records(input.to_str().unwrap()).unwrap();
    assert_eq!(records[1].apps.len(), 2);

    let outcome = run(&records, &Config::default()).unwrap();
    let output = dir.path().join("out");
    storage::save_results(&outcome, output.to_str().unwrap()).unwrap();

    let text = std::fs::read_to_string(output.join(storage::RESULTS_FILE)).unwrap();
    let results: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(results["labels"]["app1"], "CLUSTER_0_java_tomcat");
    assert_eq!(results["labels"]["dns1"], "APP_bind");
    assert_eq!(results["isolated_servers"], serde_json::json!(["dns1"]));
}

#[test]
fn duplicate_servers_in_file_fail() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dupes.json");
    std::fs::write(
        &input,
        r#"[{"server": "x", "apps": ["a"]}, {"server": "x", "apps": ["b"]}]"#,
    )
    .unwrap();

    let records = data::load_records(input.to_str().unwrap()).unwrap();
    let err = run(&records, &Config::default()).unwrap_err();
    assert!(err.is_data_error());
}
