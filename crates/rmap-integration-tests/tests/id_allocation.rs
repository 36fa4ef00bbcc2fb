//! # Identifier Allocation Failures
//!
//! Drives the engine with an identifier service that replays a fixed list
//! of ids, so collisions with already-stored objects and events happen on
//! demand. Any collision on an allocated id must surface as
//! `IdAllocationFailed` and leave the store untouched.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rmap_core::{AgentContent, DiscoContent, ErrorKind, Iri, RequestAgent, RmapError, Status};
use rmap_state::{IdService, LifecycleEngine, MemoryStore, ObjectStore};

/// Hands out the scripted ids in order, then fails.
#[derive(Debug)]
struct ScriptedIds {
    queue: Mutex<VecDeque<Iri>>,
}

impl ScriptedIds {
    fn new(ids: &[&str]) -> Self {
        Self {
            queue: Mutex::new(ids.iter().map(|s| iri(s)).collect()),
        }
    }
}

impl IdService for ScriptedIds {
    fn create_id(&self) -> Result<Iri, RmapError> {
        self.queue
            .lock()
            .pop_front()
            .ok_or_else(|| RmapError::IdAllocationFailed("script exhausted".to_string()))
    }

    fn is_valid_id(&self, id: &Iri) -> bool {
        id.as_str().starts_with("rmap:")
    }
}

fn iri(s: &str) -> Iri {
    Iri::new(s).unwrap()
}

fn engine(ids: &[&str]) -> (LifecycleEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = LifecycleEngine::new(store.clone(), Arc::new(ScriptedIds::new(ids)));
    (engine, store)
}

fn content(n: usize) -> DiscoContent {
    DiscoContent::aggregating([iri(&format!("http://example.org/resource/{n}"))])
}

fn agent_content(name: &str) -> AgentContent {
    AgentContent::new(name, iri("https://orcid.org"), iri("https://orcid.org/0000-0002"))
}

fn jane() -> RequestAgent {
    RequestAgent::new(iri("rmap:jane"))
}

fn assert_id_collision(err: RmapError, id: &str) {
    assert_eq!(err.kind(), ErrorKind::IdAllocationFailed, "{err}");
    assert!(err.to_string().contains(&format!("{id} is already in use")), "{err}");
}

// =========================================================================
// Create
// =========================================================================

#[test]
fn create_with_reused_object_id() {
    // create: disco a, event b; create: disco a
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:a", "rmap:c"]);
    engine.create_disco(content(1), &jane()).unwrap();
    let err = engine.create_disco(content(2), &jane()).unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert_eq!(store.event_count(), 1);
    assert!(store.get_event(&iri("rmap:c")).unwrap().is_none());
}

#[test]
fn create_with_reused_event_id() {
    // create: disco a, event b; create: disco c, event b
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:c", "rmap:b"]);
    engine.create_disco(content(1), &jane()).unwrap();
    let err = engine.create_disco(content(2), &jane()).unwrap_err();
    assert_id_collision(err, "rmap:b");
    assert_eq!(store.event_count(), 1);
    assert!(store.get_disco(&iri("rmap:c")).unwrap().is_none());
}

#[test]
fn create_agent_with_reused_ids() {
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:b", "rmap:c", "rmap:d", "rmap:a"]);
    engine.create_agent(agent_content("Jane"), &jane()).unwrap();
    let err = engine.create_agent(agent_content("Bob"), &jane()).unwrap_err();
    assert_id_collision(err, "rmap:b");
    let err = engine.create_agent(agent_content("Eve"), &jane()).unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert_eq!(store.event_count(), 1);
}

#[test]
fn fixed_agent_id_clash_is_invalid_argument_but_event_clash_is_not() {
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:b"]);
    engine.create_disco(content(1), &jane()).unwrap();

    let err = engine
        .create_agent_with_id(iri("rmap:a"), agent_content("Jane"), &jane())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = engine
        .create_agent_with_id(iri("rmap:jane"), agent_content("Jane"), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:b");
    assert!(store.get_agent(&iri("rmap:jane")).unwrap().is_none());
}

// =========================================================================
// Update
// =========================================================================

#[test]
fn update_with_reused_new_version_id() {
    // create: disco a, event b; update: new version a
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:a", "rmap:c"]);
    let v1 = engine.create_disco(content(1), &jane()).unwrap();
    let err = engine
        .update_disco(&v1.disco.id, content(2), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert_eq!(
        store.get_disco(&v1.disco.id).unwrap().unwrap().status,
        Status::Active
    );
    assert_eq!(store.event_count(), 1);
}

#[test]
fn update_with_reused_event_id() {
    // create: disco a, event b; update: new version c, event a
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:c", "rmap:a"]);
    let v1 = engine.create_disco(content(1), &jane()).unwrap();
    let err = engine
        .update_disco(&v1.disco.id, content(2), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert!(store.get_disco(&iri("rmap:c")).unwrap().is_none());
    assert_eq!(
        store.get_disco(&v1.disco.id).unwrap().unwrap().status,
        Status::Active
    );
}

// =========================================================================
// Derive
// =========================================================================

#[test]
fn derive_with_reused_ids() {
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:b", "rmap:c", "rmap:d", "rmap:a"]);
    let source = engine.create_disco(content(1), &jane()).unwrap();
    let err = engine
        .derive_disco(&source.disco.id, content(2), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:b");
    let err = engine
        .derive_disco(&source.disco.id, content(3), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert_eq!(store.event_count(), 1);
    assert!(store.get_disco(&iri("rmap:d")).unwrap().is_none());
}

// =========================================================================
// Status transitions and Replace
// =========================================================================

#[test]
fn transitions_with_reused_event_id() {
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:a", "rmap:b", "rmap:a"]);
    let d = engine.create_disco(content(1), &jane()).unwrap();
    assert_id_collision(engine.inactivate_disco(&d.disco.id, &jane()).unwrap_err(), "rmap:a");
    assert_id_collision(engine.tombstone_disco(&d.disco.id, &jane()).unwrap_err(), "rmap:b");
    assert_id_collision(engine.delete_disco(&d.disco.id, &jane()).unwrap_err(), "rmap:a");
    let stored = store.get_disco(&d.disco.id).unwrap().unwrap();
    assert_eq!(stored.status, Status::Active);
    assert!(!stored.is_purged());
    assert_eq!(store.event_count(), 1);
}

#[test]
fn replace_with_reused_event_id() {
    let (engine, store) = engine(&["rmap:a", "rmap:b", "rmap:a"]);
    let agent = engine.create_agent(agent_content("Jane"), &jane()).unwrap();
    let err = engine
        .replace_agent(&agent.agent.id, agent_content("Janet"), &jane())
        .unwrap_err();
    assert_id_collision(err, "rmap:a");
    assert_eq!(store.get_agent(&agent.agent.id).unwrap().unwrap().name, "Jane");
}

#[test]
fn exhausted_service_fails_before_anything_is_written() {
    let (engine, store) = engine(&["rmap:a"]);
    let err = engine.create_disco(content(1), &jane()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdAllocationFailed);
    assert_eq!(store.event_count(), 0);
}
