mod common;

use common::{GeneratedPdf, TestResult, init_logging, printer};
use mapsheet::{DocumentTicketStore, PrintError};
use mapsheet_resource::{ARTIFACT_PREFIX, ARTIFACT_SUFFIX, TempFileStorage};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

const SPEC: &str = r#"{
    "title": "Ticketed",
    "dpi": 72,
    "center": [5, 10],
    "scale": 1000,
    "layers": [{ "name": "base" }]
}"#;

fn store(dir: &Path) -> DocumentTicketStore {
    DocumentTicketStore::new(Arc::new(printer()), Arc::new(TempFileStorage::new(dir)))
}

fn files_in(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_create_sync_leaves_no_temporary_file() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());

    let mut out = Vec::new();
    let written = store.create_sync(SPEC, &mut out)?;

    assert_eq!(written as usize, out.len());
    let pdf = GeneratedPdf::from_bytes(out)?;
    assert_pdf_page_count!(pdf, 1);
    assert_eq!(files_in(dir.path()), 0);
    Ok(())
}

#[test]
fn test_create_sync_failure_leaves_no_temporary_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());

    let mut out = Vec::new();
    let err = store
        .create_sync(r#"{"dpi": 96, "center": [5, 10], "scale": 1000}"#, &mut out)
        .unwrap_err();

    assert!(matches!(err, PrintError::InvalidConfiguration { ref field, .. } if field == "dpi"));
    assert!(out.is_empty());
    assert_eq!(files_in(dir.path()), 0);
    Ok(())
}

#[test]
fn test_ticket_is_named_after_its_file_and_redeemed_once() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());

    let id = store.create_async(SPEC)?;
    let file = dir.path().join(format!("{}{}{}", ARTIFACT_PREFIX, id, ARTIFACT_SUFFIX));
    assert!(file.is_file(), "expected {} to exist", file.display());
    assert_eq!(store.pending(), 1);

    let mut out = Vec::new();
    store.fetch(&id, &mut out)?;
    let pdf = GeneratedPdf::from_bytes(out)?;
    assert_pdf_page_count!(pdf, 1);
    assert!(!file.exists());

    let err = store.fetch(&id, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, PrintError::NotFound(ref missing) if *missing == id));
    assert!(!err.is_caller_error());
    Ok(())
}

#[test]
fn test_unknown_ticket_is_not_found() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());
    let err = store.fetch("abc123", &mut Vec::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "File with id=abc123 unknown or already requested once"
    );
    Ok(())
}

#[test]
fn test_racing_fetches_deliver_exactly_once() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(store(dir.path()));

    for _ in 0..5 {
        let id = store.create_async(SPEC)?;
        let racers = 4;
        let barrier = Arc::new(Barrier::new(racers));

        let handles: Vec<_> = (0..racers)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let id = id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut out = Vec::new();
                    store.fetch(&id, &mut out).map(|_| out)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("fetch thread panicked"))
            .collect();
        let delivered: Vec<&Vec<u8>> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].starts_with(b"%PDF-"));
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, PrintError::NotFound(_)))
        );
    }
    assert_eq!(files_in(dir.path()), 0);
    Ok(())
}

#[test]
fn test_concurrent_creates_get_distinct_tickets() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(store(dir.path()));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create_async(SPEC))
        })
        .collect();
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.join().expect("create thread panicked")?);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert_eq!(store.pending(), 6);
    assert_eq!(files_in(dir.path()), 6);
    Ok(())
}

#[test]
fn test_shutdown_without_fetch_removes_every_artifact() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());

    for _ in 0..3 {
        store.create_async(SPEC)?;
    }
    assert_eq!(files_in(dir.path()), 3);

    store.shutdown();
    assert_eq!(store.pending(), 0);
    assert_eq!(files_in(dir.path()), 0);
    Ok(())
}

#[test]
fn test_shutdown_tolerates_artifacts_removed_behind_its_back() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());
    store.create_async(SPEC)?;

    for entry in fs::read_dir(dir.path())? {
        fs::remove_file(entry?.path())?;
    }
    // Logged, not returned
    store.shutdown();
    assert_eq!(store.pending(), 0);
    Ok(())
}

#[test]
fn test_dropping_the_store_cleans_up() -> TestResult {
    let dir = tempfile::tempdir()?;
    {
        let store = store(dir.path());
        store.create_async(SPEC)?;
        store.create_async(SPEC)?;
    }
    assert_eq!(files_in(dir.path()), 0);
    Ok(())
}

#[test]
fn test_purge_expired_removes_old_tickets() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = store(dir.path());
    let id = store.create_async(SPEC)?;

    assert_eq!(store.purge_expired(chrono::Duration::minutes(10)), 0);
    assert_eq!(store.purge_expired(chrono::Duration::zero()), 1);
    assert_eq!(files_in(dir.path()), 0);
    assert!(matches!(store.fetch(&id, &mut Vec::new()), Err(PrintError::NotFound(_))));
    Ok(())
}
