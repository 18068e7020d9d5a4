mod common;

use assert2::{check, let_assert};
use common::{TempWorkspace, sample_table};
use std::sync::Arc;
use std::time::Duration;
use symsearch::snapshot::Snapshot;
use symsearch::{Config, SearchError, SearchService, SymbolRecord, spawn_reload_worker};
use tokio_util::sync::CancellationToken;

fn write_table(workspace: &TempWorkspace, table: &symsearch::IndexTable) -> std::path::PathBuf {
    workspace.create_file("index.json", &serde_json::to_string(table).unwrap())
}

fn config_for(workspace: &TempWorkspace, snapshot: bool) -> Config {
    Config {
        sources: vec![workspace.path().join("index.json")],
        snapshot: snapshot.then(|| workspace.path().join("cache/index.snap")),
        ..Config::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unavailable_until_loaded() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());
    let service = SearchService::new(config_for(&workspace, false));

    let_assert!(Err(SearchError::IndexUnavailable) = service.search("pack").await);

    let report = service.load().await.unwrap();
    check!(report.tokens == 5);
    check!(report.records == 12);
    check!(!report.from_snapshot);

    let outcome = service.search("permute").await.unwrap();
    check!(outcome.records.len() == 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_sources_publish_nothing() {
    let workspace = TempWorkspace::new();
    let mut table = sample_table();
    table.push("PERMUTE", vec![SymbolRecord::new("permute", "", "x.html")]);
    write_table(&workspace, &table);

    let service = SearchService::new(config_for(&workspace, false));
    let_assert!(Err(error) = service.load().await);
    check!(format!("{:#}", error).contains("'permute' appears more than once"));
    check!(!service.is_loaded().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_reused_while_sources_unchanged() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());

    let first = SearchService::new(config_for(&workspace, true));
    check!(!first.load().await.unwrap().from_snapshot);
    check!(workspace.path().join("cache/index.snap").exists());

    let second = SearchService::new(config_for(&workspace, true));
    let report = second.load().await.unwrap();
    check!(report.from_snapshot);
    check!(second.search("pack").await.unwrap() == first.search("pack").await.unwrap());
}

/// Test: a snapshot with the current digest but an invalid table is replaced.
#[tokio::test(flavor = "multi_thread")]
async fn malformed_snapshot_rebuilt_from_sources() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());
    let snapshot_path = workspace.path().join("cache/index.snap");

    let first = SearchService::new(config_for(&workspace, true));
    let digest = first.load().await.unwrap().source_digest;

    let mut corrupt = symsearch::IndexTable::default();
    corrupt.push("pack", vec![SymbolRecord::new("pack", "", "a.html")]);
    corrupt.push("PACK", vec![SymbolRecord::new("pack", "", "b.html")]);
    Snapshot::new(digest, corrupt).write(&snapshot_path).unwrap();

    let second = SearchService::new(config_for(&workspace, true));
    let report = second.load().await.unwrap();
    check!(!report.from_snapshot);
    check!(report.tokens == 5);
    check!(second.search("pack").await.unwrap() == first.search("pack").await.unwrap());

    let third = SearchService::new(config_for(&workspace, true));
    check!(third.load().await.unwrap().from_snapshot);
}

#[tokio::test(flavor = "multi_thread")]
async fn reload_picks_up_regenerated_sources() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());
    let service = SearchService::new(config_for(&workspace, true));
    service.load().await.unwrap();

    check!(service.reload_if_changed().await.unwrap().is_none());

    let mut table = sample_table();
    table.push(
        "particlegridmigrate",
        vec![SymbolRecord::new("particleGridMigrate", "Cajita", "cajita.html#pgm")],
    );
    write_table(&workspace, &table);

    let_assert!(Some(report) = service.reload_if_changed().await.unwrap());
    check!(report.tokens == 6);
    check!(!report.from_snapshot);
    check!(service.lookup("particleGridMigrate").await.unwrap().len() == 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_reload_keeps_previous_index() {
    let workspace = TempWorkspace::new();
    let path = write_table(&workspace, &sample_table());
    let service = SearchService::new(config_for(&workspace, false));
    service.load().await.unwrap();

    std::fs::write(&path, "{ not json").unwrap();
    let_assert!(Err(_) = service.reload_if_changed().await);
    check!(service.search("halo").await.unwrap().records.len() == 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reload_worker_publishes_changes() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());
    let service = Arc::new(SearchService::new(config_for(&workspace, false)));
    service.load().await.unwrap();

    let cancel = CancellationToken::new();
    let worker = spawn_reload_worker(
        Arc::clone(&service),
        Duration::from_millis(20),
        cancel.clone(),
    );

    let mut table = sample_table();
    table.push("p2g", vec![SymbolRecord::new("p2g", "Cajita", "cajita.html#p2g")]);
    write_table(&workspace, &table);

    let mut found = false;
    for _ in 0..100 {
        if !service.lookup("p2g").await.unwrap().is_empty() {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check!(found);

    cancel.cancel();
    worker.await.unwrap();
}

/// Test: searches in flight while a reload publishes still see a complete index.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_searches_during_publish() {
    let workspace = TempWorkspace::new();
    write_table(&workspace, &sample_table());
    let service = Arc::new(SearchService::new(config_for(&workspace, false)));
    service.load().await.unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for _ in 0..50 {
                    let outcome = service.search("pack").await.unwrap();
                    assert_eq!(outcome.records.len(), 7);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for _ in 0..5 {
        service.load().await.unwrap();
    }

    for reader in readers {
        reader.await.unwrap();
    }
}
