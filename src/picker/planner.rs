use super::catalog::Catalog;
use super::error::PickerError;
use super::score::balance_score;
use super::types::{
    no_valid_placement, to_signed, validate_request, DatastorePlacement, DiskRequest, Placement,
    PickerSettings, WorkingDatastore,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Shared, read-only inputs of every trial.
struct TrialContext<'a, D> {
    disks: &'a [D],
    patterns: &'a [Regex],
    /// Disks that did not stay on their current datastore.
    pending: &'a [usize],
}

/// Place a batch of disks onto the catalog.
///
/// Disks that can stay where they are do so, without consuming space: their
/// bytes are already counted in the datastore's free space. The rest are
/// spread with a capacity-weighted draw, repeated `settings.trials` times, and
/// the feasible trial with the highest balance score is returned. Nothing is
/// returned unless every disk found a home.
pub(super) fn best_disk_placement<'d, D, R>(
    catalog: &Catalog,
    settings: &PickerSettings,
    disks: &'d [D],
    rng: &mut R,
) -> Result<Placement<'d, D>, PickerError>
where
    D: DiskRequest,
    R: Rng + ?Sized,
{
    settings.validate()?;
    let patterns = disks.iter().map(validate_request).collect::<Result<Vec<_>, _>>()?;

    let mut base: Vec<WorkingDatastore<'_>> =
        catalog.iter().map(|ds| WorkingDatastore::new(ds, settings.headroom)).collect();

    let mut pending = Vec::new();
    for (idx, disk) in disks.iter().enumerate() {
        match sticky_target(&base, disk, &patterns[idx]) {
            Some(ds_idx) => base[ds_idx].keep(idx),
            None => pending.push(idx),
        }
    }

    let ctx = TrialContext { disks, patterns: &patterns, pending: &pending };

    let mut best: Option<(i64, Vec<WorkingDatastore<'_>>)> = None;

    for trial in 0..settings.trials {
        let mut working = base.clone();
        match run_trial(&ctx, &mut working, rng) {
            Ok(()) => {
                let score = balance_score(&remaining(&working));
                debug!(trial, score, "Placement trial feasible");
                if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                    best = Some((score, working));
                }
            }
            Err(disk_idx) => {
                debug!(trial, disk = disk_idx, "Placement trial infeasible");
            }
        }

        // Without disks to draw for, every trial is identical.
        if pending.is_empty() {
            break;
        }
    }

    let (balance_score, working) = match best {
        Some(best) => best,
        None => match search_placement(&ctx, &base) {
            Ok(working) => {
                debug!("Random trials were infeasible; using backtracking search result");
                (balance_score(&remaining(&working)), working)
            }
            Err(disk_idx) => {
                let err = no_valid_placement(&disks[disk_idx]);
                warn!("{err}");
                return Err(err);
            }
        },
    };

    let placement = build_placement(disks, working, balance_score);

    info!(
        "Placed {} disk(s) across {} datastore(s): migration_size={}, balance_score={}",
        disks.len(),
        placement.datastores.len(),
        placement.migration_size,
        placement.balance_score,
    );

    Ok(placement)
}

/// The disk's current datastore, if it is known, allowed and still has room.
fn sticky_target<D: DiskRequest>(
    working: &[WorkingDatastore<'_>],
    disk: &D,
    pattern: &Regex,
) -> Option<usize> {
    let existing = disk.existing_datastore_name()?;
    let size = to_signed(disk.size());
    working.iter().position(|ds| ds.name == existing && ds.accepts(size, pattern))
}

/// Draw a datastore for every pending disk. On failure returns the index of
/// the first disk that had no candidate.
fn run_trial<D, R>(
    ctx: &TrialContext<'_, D>,
    working: &mut [WorkingDatastore<'_>],
    rng: &mut R,
) -> Result<(), usize>
where
    D: DiskRequest,
    R: Rng + ?Sized,
{
    for &disk_idx in ctx.pending {
        let size = to_signed(ctx.disks[disk_idx].size());
        let pattern = &ctx.patterns[disk_idx];

        let candidates: Vec<usize> = working
            .iter()
            .enumerate()
            .filter(|(_, ds)| ds.accepts(size, pattern))
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            return Err(disk_idx);
        }

        // Candidates hold at least `size` (> 0) bytes, so every weight is positive.
        // Float weights keep the running total from overflowing on huge datastores.
        let weights = candidates.iter().map(|&i| working[i].remaining as f64);
        let Ok(dist) = WeightedIndex::new(weights) else {
            return Err(disk_idx);
        };
        let chosen = candidates[dist.sample(rng)];

        working[chosen].assign(disk_idx, size);
    }
    Ok(())
}

/// Upper bound on datastore choices tried by [`search_placement`].
const SEARCH_STEP_LIMIT: usize = 100_000;

/// One level of the backtracking search: a disk and the datastores it may take.
struct SearchFrame {
    disk_idx: usize,
    size: i64,
    candidates: Vec<usize>,
    next: usize,
}

/// Indices of datastores that accept the disk, roomiest first, catalog order on ties.
fn roomiest_candidates<D: DiskRequest>(
    ctx: &TrialContext<'_, D>,
    working: &[WorkingDatastore<'_>],
    disk_idx: usize,
) -> Vec<usize> {
    let size = to_signed(ctx.disks[disk_idx].size());
    let pattern = &ctx.patterns[disk_idx];
    let mut candidates: Vec<usize> =
        (0..working.len()).filter(|&i| working[i].accepts(size, pattern)).collect();
    candidates.sort_by_key(|&i| std::cmp::Reverse(working[i].remaining));
    candidates
}

/// Deterministic search for any feasible assignment of the pending disks.
///
/// Disks are placed largest first, each on the roomiest datastore that still
/// accepts it, backtracking when a later disk is left without a candidate.
/// On failure returns the disk that could not be placed: one with no
/// candidate even on the untouched catalog if there is one, otherwise the
/// disk at which the deepest branch of the search got stuck.
fn search_placement<'c, D: DiskRequest>(
    ctx: &TrialContext<'_, D>,
    base: &[WorkingDatastore<'c>],
) -> Result<Vec<WorkingDatastore<'c>>, usize> {
    if let Some(&alone) =
        ctx.pending.iter().find(|&&idx| roomiest_candidates(ctx, base, idx).is_empty())
    {
        return Err(alone);
    }

    let mut order = ctx.pending.to_vec();
    order.sort_by_key(|&idx| std::cmp::Reverse(ctx.disks[idx].size()));

    let mut working = base.to_vec();
    let mut stack: Vec<SearchFrame> = Vec::with_capacity(order.len());
    let mut stuck: Option<(usize, usize)> = None;
    let mut steps = 0;

    'descend: while let Some(&disk_idx) = order.get(stack.len()) {
        let depth = stack.len();
        let candidates = roomiest_candidates(ctx, &working, disk_idx);
        if candidates.is_empty() && stuck.is_none_or(|(deepest, _)| depth >= deepest) {
            stuck = Some((depth, disk_idx));
        }
        let size = to_signed(ctx.disks[disk_idx].size());
        stack.push(SearchFrame { disk_idx, size, candidates, next: 0 });

        while let Some(frame) = stack.last_mut() {
            if frame.next > 0 {
                working[frame.candidates[frame.next - 1]].unassign(frame.size);
            }
            if frame.next < frame.candidates.len() && steps < SEARCH_STEP_LIMIT {
                steps += 1;
                working[frame.candidates[frame.next]].assign(frame.disk_idx, frame.size);
                frame.next += 1;
                continue 'descend;
            }
            stack.pop();
        }

        if steps >= SEARCH_STEP_LIMIT {
            warn!("Placement search gave up after {SEARCH_STEP_LIMIT} steps");
        }
        return Err(stuck.map_or(order[0], |(_, idx)| idx));
    }

    Ok(working)
}

fn remaining(working: &[WorkingDatastore<'_>]) -> Vec<i64> {
    working.iter().map(|ds| ds.remaining).collect()
}

fn build_placement<'d, D: DiskRequest>(
    disks: &'d [D],
    working: Vec<WorkingDatastore<'_>>,
    balance_score: i64,
) -> Placement<'d, D> {
    let mut final_location: Vec<&str> = vec![""; disks.len()];
    for ds in &working {
        for &disk_idx in &ds.disks {
            final_location[disk_idx] = ds.name;
        }
    }

    let migration_size = disks
        .iter()
        .zip(&final_location)
        .filter(|(disk, location)| {
            disk.existing_datastore_name().is_some_and(|existing| existing != **location)
        })
        .map(|(disk, _)| disk.size())
        .fold(0, u64::saturating_add);

    let datastores = working
        .into_iter()
        .map(|mut ds| {
            // Sticky disks were recorded first; restore request order.
            ds.disks.sort_unstable();
            let assigned = ds.disks.iter().map(|&i| &disks[i]).collect();
            (ds.name.to_string(), DatastorePlacement { free_space: ds.remaining, disks: assigned })
        })
        .collect::<BTreeMap<_, _>>();

    Placement { datastores, migration_size, balance_score }
}
