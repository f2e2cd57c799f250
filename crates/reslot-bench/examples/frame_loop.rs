//! End-to-end frame loop example.
//!
//! Demonstrates: worker threads request spawns/despawns → owner commits once
//! per frame → systems read and mutate entities through handles → stale
//! handles read as dead after their entity is destroyed.

use std::thread;

use reslot_commit::CommitQueue;
use reslot_table::{Handle, SlotTable};
use reslot_test_utils::Entity;

fn main() {
    println!("=== Reslot Frame Loop Example ===\n");

    let mut table: SlotTable<Entity> = SlotTable::with_capacity(64);
    let mut queue = CommitQueue::new(256);
    let mut bullets: Vec<Handle<Entity>> = Vec::new();
    let mut first_bullet = None;

    for frame in 0..8u32 {
        // A "spawner system" on another thread fires two bullets per frame.
        let spawner = queue.spawner();
        let tickets = thread::spawn(move || {
            (0..2)
                .map(|i| {
                    let bullet = Entity::new(format!("bullet-{frame}-{i}")).at(0.0, i as f32);
                    spawner.spawn(bullet).unwrap()
                })
                .collect::<Vec<_>>()
        })
        .join()
        .unwrap();

        // A "collision system" destroys bullets that travelled too far.
        let despawner = queue.spawner();
        for &h in &bullets {
            if table.get(h).is_some_and(|b| b.position[0] >= 3.0) {
                despawner.despawn(h).unwrap();
            }
        }

        // Single commit point.
        let report = queue.commit(&mut table);
        bullets.retain(|&h| table.is_live(h));
        bullets.extend(tickets.iter().filter_map(|&t| report.handle_for(t)));
        if first_bullet.is_none() {
            first_bullet = bullets.first().copied();
        }

        // Movement system.
        for (_, bullet) in table.iter_mut() {
            bullet.position[0] += 1.0;
        }

        println!(
            "  frame {frame}: +{} -{} | {}",
            report.spawned.len(),
            report.despawned,
            table.stats()
        );
    }

    if let Some(h) = first_bullet {
        println!(
            "\nfirst bullet {h}: live = {} (slot now holds {:?})",
            table.is_live(h),
            table.handle_at(h.index())
        );
    }
}
