//! Domain services for broadcast.

use rand::seq::SliceRandom;
use shared_types::ConnectionId;
use std::collections::HashSet;

/// Pick up to `fanout` connections at random, skipping `excluded`.
///
/// Random selection spreads load across the overlay; repeated gossip from
/// other peers covers the connections left out of any single fan-out.
pub fn select_targets(
    connected: &[ConnectionId],
    excluded: &HashSet<ConnectionId>,
    fanout: usize,
) -> Vec<ConnectionId> {
    let candidates: Vec<ConnectionId> = connected
        .iter()
        .copied()
        .filter(|conn| !excluded.contains(conn))
        .collect();

    let mut rng = rand::thread_rng();
    let mut targets: Vec<ConnectionId> = candidates
        .choose_multiple(&mut rng, fanout)
        .copied()
        .collect();
    targets.sort();
    targets
}
