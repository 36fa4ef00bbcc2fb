//! # Status Transition Matrix
//!
//! Exhaustive 4x4 table of the DiSCO status machine, then the same table
//! driven through the lifecycle engine: every mutation is attempted from
//! every reachable status and must succeed exactly when the table allows it.

use std::sync::Arc;

use rmap_core::{DiscoContent, ErrorKind, Iri, RequestAgent, RmapError, Status};
use rmap_state::{LifecycleEngine, MemoryStore, ObjectStore, RandomStringIdService};

#[test]
fn status_transition_matrix_exhaustive() {
    let expected_valid = [
        (Status::Active, Status::Inactive),
        (Status::Active, Status::Tombstoned),
        (Status::Active, Status::Deleted),
        (Status::Inactive, Status::Tombstoned),
        (Status::Inactive, Status::Deleted),
    ];
    for from in Status::ALL {
        for to in Status::ALL {
            let expected = expected_valid.contains(&(from, to));
            assert_eq!(
                from.can_transition_to(to),
                expected,
                "Status transition {from:?} -> {to:?}: expected valid={expected}"
            );
        }
    }
}

#[test]
fn terminal_states_have_no_exits() {
    for status in Status::ALL {
        assert_eq!(status.is_terminal(), status.valid_transitions().is_empty());
    }
    assert!(Status::Tombstoned.is_terminal());
    assert!(Status::Deleted.is_terminal());
}

#[test]
fn status_round_trip_via_name_and_term() {
    for status in Status::ALL {
        assert_eq!(Status::from_name(status.as_str()), Some(status));
        assert_eq!(Status::from_term(status.term()), Some(status));
    }
}

// =========================================================================
// Engine-driven matrix
// =========================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Inactivate,
    Tombstone,
    Delete,
}

impl Op {
    const ALL: [Op; 3] = [Op::Inactivate, Op::Tombstone, Op::Delete];

    fn target(self) -> Status {
        match self {
            Op::Inactivate => Status::Inactive,
            Op::Tombstone => Status::Tombstoned,
            Op::Delete => Status::Deleted,
        }
    }

    fn apply(self, engine: &LifecycleEngine, id: &Iri, who: &RequestAgent) -> Result<(), RmapError> {
        match self {
            Op::Inactivate => engine.inactivate_disco(id, who),
            Op::Tombstone => engine.tombstone_disco(id, who),
            Op::Delete => engine.delete_disco(id, who),
        }
        .map(|_| ())
    }
}

fn engine() -> (LifecycleEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = LifecycleEngine::new(store.clone(), Arc::new(RandomStringIdService::default()));
    (engine, store)
}

fn iri(s: &str) -> Iri {
    Iri::new(s).unwrap()
}

/// A fresh DiSCO driven into `status`.
fn disco_in(engine: &LifecycleEngine, status: Status, who: &RequestAgent) -> Iri {
    let id = engine
        .create_disco(DiscoContent::aggregating([iri("http://example.org/r")]), who)
        .unwrap()
        .disco
        .id;
    match status {
        Status::Active => {}
        Status::Inactive => {
            engine.inactivate_disco(&id, who).unwrap();
        }
        Status::Tombstoned => {
            engine.tombstone_disco(&id, who).unwrap();
        }
        Status::Deleted => {
            engine.delete_disco(&id, who).unwrap();
        }
    }
    id
}

#[test]
fn engine_operations_follow_the_matrix() {
    let (engine, store) = engine();
    let who = RequestAgent::new(iri("rmap:tester"));

    for from in Status::ALL {
        for op in Op::ALL {
            let id = disco_in(&engine, from, &who);
            let events_before = store.event_count();
            let result = op.apply(&engine, &id, &who);
            let status_after = store.get_disco(&id).unwrap().unwrap().status;

            if from.can_transition_to(op.target()) {
                assert!(result.is_ok(), "{op:?} from {from:?} should succeed: {result:?}");
                assert_eq!(status_after, op.target());
                assert_eq!(store.event_count(), events_before + 1);
            } else {
                let err = result.unwrap_err();
                let expected_kind = if from.is_terminal() {
                    ErrorKind::AlreadyTerminal
                } else {
                    ErrorKind::InactiveVersion
                };
                assert_eq!(err.kind(), expected_kind, "{op:?} from {from:?}");
                assert_eq!(status_after, from);
                assert_eq!(store.event_count(), events_before);
            }
        }
    }
}

#[test]
fn update_is_only_valid_from_active_latest() {
    let (engine, store) = engine();
    let who = RequestAgent::new(iri("rmap:tester"));
    let content = DiscoContent::aggregating([iri("http://example.org/next")]);

    for from in Status::ALL {
        let id = disco_in(&engine, from, &who);
        let result = engine.update_disco(&id, content.clone(), &who);
        if from == Status::Active {
            assert!(result.is_ok());
            assert_eq!(store.get_disco(&id).unwrap().unwrap().status, Status::Inactive);
        } else {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InactiveVersion, "{from:?}");
        }
    }
}
