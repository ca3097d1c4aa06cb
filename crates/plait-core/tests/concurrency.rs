use std::sync::Arc;

use chrono::{TimeZone, Utc};

use plait_core::domain::{ErrorKind, NewPriority, NewTask, OwnerId, TaskId};
use plait_core::graph::InMemoryTaskStore;
use plait_core::ports::{SequentialIdGenerator, TaskStore};

async fn store_with_tasks(owner: OwnerId, n: usize) -> (Arc<InMemoryTaskStore>, Vec<TaskId>) {
    let store = Arc::new(InMemoryTaskStore::new(Arc::new(SequentialIdGenerator::new())));
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let priority = store
        .create_priority(NewPriority::new("p", 1))
        .await
        .unwrap();

    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let task = store
            .add_task(owner, NewTask::new(format!("t{i}"), priority.id), now)
            .await
            .unwrap();
        ids.push(task.id);
    }
    (store, ids)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_edges_never_close_a_cycle() {
    let owner = OwnerId::new(1);
    let (store, ids) = store_with_tasks(owner, 16).await;

    // Every ordered pair at once, both directions: each pair can win at most
    // one direction and no ring may survive.
    let mut handles = Vec::new();
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_dependency(a, b, owner).await
            }));
        }
    }

    let mut added = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => added += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
        }
    }

    assert!(store.is_acyclic().await);
    assert_eq!(store.counts().await.edges, added);
    // A DAG over n nodes has at most n(n-1)/2 edges.
    assert!(added <= ids.len() * (ids.len() - 1) / 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ring_closing_race_admits_at_most_all_but_one() {
    let owner = OwnerId::new(1);
    let (store, ids) = store_with_tasks(owner, 32).await;

    // Edges i -> i+1 (mod n) form a ring; at least one must lose.
    let handles: Vec<_> = (0..ids.len())
        .map(|i| {
            let store = Arc::clone(&store);
            let (a, b) = (ids[i], ids[(i + 1) % ids.len()]);
            tokio::spawn(async move { store.add_dependency(a, b, owner).await })
        })
        .collect();

    let mut rejected = 0;
    for handle in handles {
        if handle.await.unwrap().is_err() {
            rejected += 1;
        }
    }
    assert_eq!(rejected, 1);
    assert!(store.is_acyclic().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn removal_races_with_inserts_without_dangling_edges() {
    let owner = OwnerId::new(1);
    let (store, ids) = store_with_tasks(owner, 12).await;
    let hub = ids[0];

    let mut handles = Vec::new();
    for &other in &ids[1..] {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let _ = store.add_dependency(other, hub, owner).await;
        }));
    }
    {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.remove_task(hub, owner).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for &other in &ids[1..] {
        assert!(store.dependencies(other).await.unwrap().is_empty());
    }
    assert_eq!(store.counts().await.edges, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn owners_do_not_block_each_other() {
    let store = Arc::new(InMemoryTaskStore::new(Arc::new(SequentialIdGenerator::new())));
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let priority = store
        .create_priority(NewPriority::new("p", 1))
        .await
        .unwrap()
        .id;

    let handles: Vec<_> = (1..=8u64)
        .map(|owner| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let owner = OwnerId::new(owner);
                let mut previous = None;
                for i in 0..20 {
                    let task = store
                        .add_task(owner, NewTask::new(format!("t{i}"), priority), now)
                        .await
                        .unwrap();
                    if let Some(prev) = previous {
                        store.add_dependency(task.id, prev, owner).await.unwrap();
                    }
                    previous = Some(task.id);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let counts = store.counts().await;
    assert_eq!(counts.owners, 8);
    assert_eq!(counts.tasks, 160);
    assert_eq!(counts.edges, 152);
}
