//! Lock protocol tests against the in-memory save store.
//!
//! These exercise the full store contract (acquire/release/edit atomicity,
//! owner override, contention) without a database. The PostgreSQL
//! implementation is covered separately in `save_store_pg.rs`.

use std::sync::Arc;

use assert_matches::assert_matches;
use toolbox_core::locking::FieldEdit;
use toolbox_core::types::DbId;
use toolbox_db::models::save::CreateSave;
use toolbox_db::store::{EditOutcome, LockOutcome, MemorySaveStore, SaveStore};

const OWNER: DbId = 1;
const USER_B: DbId = 2;
const USER_C: DbId = 3;

fn new_save(name: &str) -> CreateSave {
    CreateSave {
        name: name.to_string(),
        description: None,
        data: None,
        tool_id: 1,
    }
}

async fn store_with_save() -> (Arc<MemorySaveStore>, DbId) {
    let store = Arc::new(MemorySaveStore::new());
    let save = store.create(OWNER, &new_save("workspace")).await.unwrap();
    assert_eq!(save.locked_by_id, None);
    (store, save.id)
}

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

/// Two non-owners race for an unlocked save: exactly one wins, the loser
/// observes the post-update state and conflicts.
#[tokio::test]
async fn test_concurrent_acquisitions_exactly_one_wins() {
    for _ in 0..50 {
        let (store, id) = store_with_save().await;

        let s1 = Arc::clone(&store);
        let s2 = Arc::clone(&store);
        let t1 = tokio::spawn(async move { s1.set_lock(id, USER_B, true).await.unwrap() });
        let t2 = tokio::spawn(async move { s2.set_lock(id, USER_C, true).await.unwrap() });
        let (r1, r2) = (t1.await.unwrap(), t2.await.unwrap());

        let wins = [&r1, &r2]
            .iter()
            .filter(|r| matches!(r, LockOutcome::Applied(_)))
            .count();
        let conflicts = [&r1, &r2]
            .iter()
            .filter(|r| matches!(r, LockOutcome::Conflict { .. }))
            .count();
        assert_eq!((wins, conflicts), (1, 1));

        let save = store.find_by_id(id).await.unwrap().unwrap();
        assert!(save.locked_by_id == Some(USER_B) || save.locked_by_id == Some(USER_C));
    }
}

/// A wider race: many users, still exactly one holder.
#[tokio::test]
async fn test_acquisition_storm_has_single_winner() {
    let (store, id) = store_with_save().await;

    let mut tasks = Vec::new();
    for user in 10..30 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store.set_lock(id, user, true).await.unwrap()
        }));
    }

    let mut wins = 0;
    for task in tasks {
        if matches!(task.await.unwrap(), LockOutcome::Applied(_)) {
            wins += 1;
        }
    }
    assert_eq!(wins, 1);
}

// ---------------------------------------------------------------------------
// Acquisition rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_owner_override_transfers_lock() {
    let (store, id) = store_with_save().await;

    assert_matches!(
        store.set_lock(id, USER_B, true).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id == Some(USER_B)
    );
    assert_matches!(
        store.set_lock(id, OWNER, true).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id == Some(OWNER)
    );
}

#[tokio::test]
async fn test_reacquire_is_idempotent_and_refreshes_last_locked() {
    let (store, id) = store_with_save().await;

    let first = match store.set_lock(id, USER_B, true).await.unwrap() {
        LockOutcome::Applied(s) => s,
        other => panic!("expected Applied, got {other:?}"),
    };
    let second = match store.set_lock(id, USER_B, true).await.unwrap() {
        LockOutcome::Applied(s) => s,
        other => panic!("expected Applied, got {other:?}"),
    };

    assert_eq!(second.locked_by_id, Some(USER_B));
    assert!(second.last_locked >= first.last_locked);
}

#[tokio::test]
async fn test_acquire_held_lock_conflicts_with_holder_id() {
    let (store, id) = store_with_save().await;

    store.set_lock(id, USER_B, true).await.unwrap();
    assert_matches!(
        store.set_lock(id, USER_C, true).await.unwrap(),
        LockOutcome::Conflict { holder: USER_B }
    );
}

#[tokio::test]
async fn test_missing_save_reports_not_found() {
    let store = MemorySaveStore::new();
    assert_matches!(
        store.set_lock(404, USER_B, true).await.unwrap(),
        LockOutcome::NotFound
    );
}

// ---------------------------------------------------------------------------
// Release rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_holder_release_unlocks() {
    let (store, id) = store_with_save().await;

    store.set_lock(id, USER_B, true).await.unwrap();
    assert_matches!(
        store.set_lock(id, USER_B, false).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id.is_none()
    );
}

#[tokio::test]
async fn test_release_of_foreign_lock_rejected() {
    let (store, id) = store_with_save().await;

    store.set_lock(id, USER_B, true).await.unwrap();
    assert_matches!(
        store.set_lock(id, USER_C, false).await.unwrap(),
        LockOutcome::NotHolder
    );
    // The override covers acquisition only, not release.
    assert_matches!(
        store.set_lock(id, OWNER, false).await.unwrap(),
        LockOutcome::NotHolder
    );

    let save = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(save.locked_by_id, Some(USER_B));
}

#[tokio::test]
async fn test_release_unlocked_is_noop_success() {
    let (store, id) = store_with_save().await;
    assert_matches!(
        store.set_lock(id, USER_B, false).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id.is_none()
    );
}

// ---------------------------------------------------------------------------
// Edit gating
// ---------------------------------------------------------------------------

fn rename(name: &str) -> FieldEdit {
    FieldEdit {
        name: Some(name.to_string()),
        ..FieldEdit::default()
    }
}

#[tokio::test]
async fn test_edit_unlocked_save_rejected_for_everyone() {
    let (store, id) = store_with_save().await;

    assert_matches!(
        store.apply_edit(id, OWNER, &rename("x")).await.unwrap(),
        EditOutcome::NotHolder
    );
    assert_matches!(
        store.apply_edit(id, USER_B, &rename("x")).await.unwrap(),
        EditOutcome::NotHolder
    );
}

#[tokio::test]
async fn test_holder_edit_applies_only_named_fields() {
    let store = MemorySaveStore::new();
    let created = store
        .create(
            OWNER,
            &CreateSave {
                name: "analysis".to_string(),
                description: Some("quarterly".to_string()),
                data: Some(serde_json::json!({"cells": [1, 2]})),
                tool_id: 1,
            },
        )
        .await
        .unwrap();

    store.set_lock(created.id, USER_B, true).await.unwrap();
    let updated = match store
        .apply_edit(created.id, USER_B, &rename("renamed"))
        .await
        .unwrap()
    {
        EditOutcome::Applied(s) => s,
        other => panic!("expected Applied, got {other:?}"),
    };

    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.description.as_deref(), Some("quarterly"));
    assert_eq!(updated.data, Some(serde_json::json!({"cells": [1, 2]})));
}

#[tokio::test]
async fn test_non_holder_edit_rejected_while_locked() {
    let (store, id) = store_with_save().await;

    store.set_lock(id, USER_B, true).await.unwrap();
    assert_matches!(
        store.apply_edit(id, USER_C, &rename("x")).await.unwrap(),
        EditOutcome::NotHolder
    );

    let save = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(save.name, "workspace");
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

/// Owner A creates a save; B locks it; A seizes the lock back; B's edit is
/// rejected; A's edit lands.
#[tokio::test]
async fn test_lock_seizure_scenario() {
    let (store, id) = store_with_save().await;

    assert_matches!(
        store.set_lock(id, USER_B, true).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id == Some(USER_B)
    );
    assert_matches!(
        store.set_lock(id, OWNER, true).await.unwrap(),
        LockOutcome::Applied(s) if s.locked_by_id == Some(OWNER)
    );
    assert_matches!(
        store.apply_edit(id, USER_B, &rename("stolen")).await.unwrap(),
        EditOutcome::NotHolder
    );
    assert_matches!(
        store.apply_edit(id, OWNER, &rename("reclaimed")).await.unwrap(),
        EditOutcome::Applied(s) if s.name == "reclaimed"
    );
}
