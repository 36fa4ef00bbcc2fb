//! # Concurrent Mutations
//!
//! Racing writers against one shared engine and store. Exactly one of a set
//! of concurrent Updates on the same latest version may land; every loser
//! must get a specific rejection and leave no trace in the store.

use std::sync::{Arc, Barrier};
use std::thread;

use rmap_core::{DiscoContent, ErrorKind, Iri, RequestAgent, Status};
use rmap_state::{LifecycleEngine, MemorySink, MemoryStore, ObjectStore, RandomStringIdService};

const WRITERS: usize = 8;

fn iri(s: &str) -> Iri {
    Iri::new(s).unwrap()
}

fn shared() -> (Arc<LifecycleEngine>, Arc<MemoryStore>, Arc<MemorySink>) {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(MemorySink::new());
    let engine = LifecycleEngine::new(store.clone(), Arc::new(RandomStringIdService::default()))
        .with_sink(sink.clone());
    (Arc::new(engine), store, sink)
}

#[test]
fn concurrent_updates_on_one_version_have_a_single_winner() {
    for _round in 0..20 {
        let (engine, store, sink) = shared();
        let who = RequestAgent::new(iri("rmap:jane"));
        let v1 = engine
            .create_disco(DiscoContent::aggregating([iri("http://example.org/0")]), &who)
            .unwrap()
            .disco
            .id;

        let barrier = Arc::new(Barrier::new(WRITERS));
        let handles: Vec<_> = (0..WRITERS)
            .map(|n| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                let target = v1.clone();
                let who = who.clone();
                thread::spawn(move || {
                    let content =
                        DiscoContent::aggregating([iri(&format!("http://example.org/{}", n + 1))]);
                    barrier.wait();
                    engine.update_disco(&target, content, &who)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1, "exactly one concurrent update must land");
        for result in &results {
            if let Err(err) = result {
                assert_eq!(err.kind(), ErrorKind::NotLatestVersion, "loser got {err}");
            }
        }

        let winner = winners[0];
        assert_eq!(store.get_disco(&v1).unwrap().unwrap().status, Status::Inactive);
        let lineage = engine.lineage().resolve_lineage(&v1).unwrap();
        assert_eq!(lineage.len(), 2);
        assert_eq!(lineage.latest(), Some(&winner.disco.id));
        // one CREATION plus the winning UPDATE
        assert_eq!(store.event_count(), 2);
        assert_eq!(sink.len(), 2);
    }
}

#[test]
fn concurrent_terminal_transitions_apply_once() {
    let (engine, store, _) = shared();
    let who = RequestAgent::new(iri("rmap:jane"));
    let target = engine
        .create_disco(DiscoContent::aggregating([iri("http://example.org/0")]), &who)
        .unwrap()
        .disco
        .id;

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let target = target.clone();
            let who = who.clone();
            thread::spawn(move || {
                barrier.wait();
                if n % 2 == 0 {
                    engine.tombstone_disco(&target, &who)
                } else {
                    engine.delete_disco(&target, &who)
                }
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), ErrorKind::AlreadyTerminal);
    }
    let status = store.get_disco(&target).unwrap().unwrap().status;
    assert!(status.is_terminal());
    assert_eq!(store.event_count(), 2);
}

#[test]
fn independent_lineages_progress_in_parallel() {
    let (engine, store, _) = shared();
    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let who = RequestAgent::new(iri(&format!("rmap:agent{n}")));
                let mut latest = engine
                    .create_disco(DiscoContent::aggregating([iri("http://example.org/a")]), &who)
                    .unwrap()
                    .disco
                    .id;
                for step in 0..5 {
                    let content =
                        DiscoContent::aggregating([iri(&format!("http://example.org/{n}/{step}"))]);
                    latest = engine.update_disco(&latest, content, &who).unwrap().disco.id;
                }
                latest
            })
        })
        .collect();

    for handle in handles {
        let latest = handle.join().unwrap();
        let lineage = engine.lineage().resolve_lineage(&latest).unwrap();
        assert_eq!(lineage.len(), 6);
        assert_eq!(lineage.latest(), Some(&latest));
    }
    assert_eq!(store.event_count(), WRITERS * 6);
}
