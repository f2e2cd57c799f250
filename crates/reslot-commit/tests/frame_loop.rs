//! Multi-threaded frame loop over a single commit point.
//!
//! Worker threads submit spawns and despawns concurrently; the owning
//! thread commits once per frame and then fans disjoint `&mut` borrows of
//! the live entities out to scoped threads. Verifies that no request is
//! lost, every committed handle is unique and live, and despawns issued by
//! several workers for the same entity are reported as stale exactly once
//! per duplicate.

use std::collections::HashSet;
use std::thread;

use reslot_commit::CommitQueue;
use reslot_table::{Handle, SlotTable};
use reslot_test_utils::{DropCounter, Entity, TrackedPayload};

const WORKERS: usize = 4;
const SPAWNS_PER_WORKER: usize = 250;

#[test]
fn concurrent_spawns_all_commit_with_unique_handles() {
    let mut table = SlotTable::new();
    let mut queue = CommitQueue::new(WORKERS * SPAWNS_PER_WORKER);

    let tickets: Vec<_> = thread::scope(|s| {
        let workers: Vec<_> = (0..WORKERS)
            .map(|w| {
                let spawner = queue.spawner();
                s.spawn(move || {
                    (0..SPAWNS_PER_WORKER)
                        .map(|i| {
                            let name = format!("w{w}-{i}");
                            spawner.spawn(Entity::new(name)).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });

    let report = queue.commit(&mut table);
    assert_eq!(report.spawned.len(), WORKERS * SPAWNS_PER_WORKER);
    assert_eq!(table.len(), WORKERS * SPAWNS_PER_WORKER);

    let handles: HashSet<Handle<Entity>> =
        tickets.iter().map(|&t| report.handle_for(t).unwrap()).collect();
    assert_eq!(handles.len(), tickets.len());
    assert!(handles.iter().all(|&h| table.is_live(h)));

    // Applied in ticket order.
    let applied: Vec<_> = report.spawned.keys().copied().collect();
    let mut sorted = applied.clone();
    sorted.sort();
    assert_eq!(applied, sorted);
}

#[test]
fn disjoint_mutation_between_commits() {
    let mut table = SlotTable::new();
    for i in 0..64 {
        let _ = table.allocate(Entity::new(format!("e{i}")));
    }

    let mut entities: Vec<_> = table.iter_mut().map(|(_, e)| e).collect();
    thread::scope(|s| {
        for chunk in entities.chunks_mut(16) {
            s.spawn(move || {
                for e in chunk.iter_mut() {
                    e.position[0] += 1.0;
                    e.health -= 5;
                }
            });
        }
    });

    assert!(table
        .iter()
        .all(|(_, e)| e.position[0] == 1.0 && e.health == Entity::FULL_HEALTH - 5));
}

#[test]
fn racing_despawns_release_each_entity_once() {
    let drops = DropCounter::new();
    let mut table: SlotTable<TrackedPayload> = SlotTable::new();
    let targets: Vec<_> = (0..32).map(|i| table.allocate(drops.payload(i))).collect();
    let mut queue = CommitQueue::new(WORKERS * targets.len());

    thread::scope(|s| {
        for _ in 0..WORKERS {
            let spawner = queue.spawner();
            let targets = &targets;
            s.spawn(move || {
                for &h in targets {
                    spawner.despawn(h).unwrap();
                }
            });
        }
    });

    let report = queue.commit(&mut table);
    assert_eq!(report.despawned, targets.len());
    assert_eq!(report.stale.len(), (WORKERS - 1) * targets.len());
    assert_eq!(drops.count(), targets.len());
    assert!(table.is_empty());
    assert_eq!(table.free_count(), targets.len());
}

#[test]
fn frames_interleave_spawn_and_despawn() {
    let mut table = SlotTable::new();
    let mut queue = CommitQueue::new(64);
    let spawner = queue.spawner();
    let mut live: Vec<Handle<u32>> = Vec::new();

    for frame in 0..10u32 {
        // Destroy last frame's oldest entity, create two new ones.
        if let Some(&oldest) = live.first() {
            spawner.despawn(oldest).unwrap();
        }
        let a = spawner.spawn(frame * 2).unwrap();
        let b = spawner.spawn(frame * 2 + 1).unwrap();

        let report = queue.commit(&mut table);
        if !live.is_empty() {
            let gone = live.remove(0);
            assert!(!table.is_live(gone));
            assert_eq!(report.despawned, 1);
        }
        live.push(report.handle_for(a).unwrap());
        live.push(report.handle_for(b).unwrap());
        assert_eq!(table.len(), live.len());
    }

    // Slots freed early were reused instead of growing the table.
    assert!(table.slot_count() < 20);
    assert!(live.iter().all(|&h| table.is_live(h)));
}

#[test]
fn requests_never_apply_out_of_issue_order_across_frames() {
    let mut table = SlotTable::new();
    let mut queue = CommitQueue::new(WORKERS * SPAWNS_PER_WORKER);
    let total = WORKERS * SPAWNS_PER_WORKER;
    let mut applied = Vec::with_capacity(total);

    thread::scope(|s| {
        for w in 0..WORKERS {
            let spawner = queue.spawner();
            s.spawn(move || {
                for i in 0..SPAWNS_PER_WORKER {
                    spawner.spawn(w * SPAWNS_PER_WORKER + i).unwrap();
                }
            });
        }
        // Commit as fast as possible while the workers are still submitting.
        while applied.len() < total {
            let report = queue.commit(&mut table);
            applied.extend(report.spawned.keys().copied());
        }
    });

    assert_eq!(applied.len(), total);
    assert!(applied.windows(2).all(|pair| pair[0] < pair[1]));
}
