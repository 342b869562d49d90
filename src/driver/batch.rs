// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Batch conversion.
//!
//! Files are converted on a worker pool. A process-wide registry of
//! destinations in progress makes sure a destination has at most one
//! producer: a batch that finds its destination already claimed waits for
//! the other producer, holding none of its own claims, and then skips it.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};

use once_cell::sync::Lazy;
use rayon::prelude::*;

use super::{pythonize, TranspileOptions};

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionItem {
    /// XML input.
    pub src: PathBuf,
    /// Python output.
    pub dst: PathBuf,
}

impl ConversionItem {
    /// Create an item.
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Destinations currently being produced.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    paths: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PendingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path`. Returns `false` if someone else holds it.
    pub fn try_claim(&self, path: &Path) -> bool {
        match self.paths.lock() {
            Ok(mut paths) => paths.insert(path.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().insert(path.to_path_buf()),
        }
    }

    /// Whether `path` is claimed.
    pub fn is_pending(&self, path: &Path) -> bool {
        match self.paths.lock() {
            Ok(paths) => paths.contains(path),
            Err(poisoned) => poisoned.into_inner().contains(path),
        }
    }

    /// Block until `path` is released.
    pub fn wait_until_released(&self, path: &Path) {
        let mut paths = match self.paths.lock() {
            Ok(paths) => paths,
            Err(poisoned) => poisoned.into_inner(),
        };
        while paths.contains(path) {
            paths = match self.released.wait(paths) {
                Ok(paths) => paths,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Claim every path in `wanted` in one step.
    ///
    /// Nothing is held while waiting: as long as one of the paths belongs to
    /// someone else, the call blocks without claiming any of them. A path
    /// that was busy is dropped once its producer releases it. Returns the
    /// claimed paths and the dropped ones, in that order.
    pub fn claim_all<'a>(&self, wanted: &[&'a Path]) -> (Vec<&'a Path>, Vec<&'a Path>) {
        let mut paths = match self.paths.lock() {
            Ok(paths) => paths,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut remaining: Vec<&'a Path> = wanted.to_vec();
        let mut blocked: HashSet<&'a Path> = HashSet::new();
        let mut waited: Vec<&'a Path> = Vec::new();

        loop {
            let busy: Vec<&'a Path> = remaining
                .iter()
                .copied()
                .filter(|path| paths.contains(*path))
                .collect();
            if busy.is_empty() {
                for path in &remaining {
                    paths.insert(path.to_path_buf());
                }
                return (remaining, waited);
            }
            for path in busy {
                if blocked.insert(path) {
                    tracing::warn!("The file {} is already being converted. Waiting", path.display());
                }
            }

            paths = match self.released.wait(paths) {
                Ok(paths) => paths,
                Err(poisoned) => poisoned.into_inner(),
            };
            remaining.retain(|path| {
                if blocked.contains(path) && !paths.contains(*path) {
                    waited.push(*path);
                    false
                } else {
                    true
                }
            });
        }
    }

    /// Release a claimed path and wake waiters.
    pub fn release(&self, path: &Path) {
        match self.paths.lock() {
            Ok(mut paths) => paths.remove(path),
            Err(poisoned) => poisoned.into_inner().remove(path),
        };
        self.released.notify_all();
    }
}

static PENDING: Lazy<PendingRegistry> = Lazy::new(PendingRegistry::new);

/// The process-wide registry used by [`convert_batch`].
pub fn pending() -> &'static PendingRegistry {
    &PENDING
}

/// Outcome of a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Converted destinations and whether each succeeded.
    pub converted: Vec<(PathBuf, bool)>,
    /// Destinations produced by another batch while this one waited.
    pub waited: Vec<PathBuf>,
    /// Destinations listed more than once in this batch.
    pub duplicates: Vec<PathBuf>,
}

impl BatchSummary {
    /// Whether every conversion of this batch succeeded.
    pub fn all_ok(&self) -> bool {
        self.converted.iter().all(|(_, ok)| *ok)
    }

    /// Number of failed conversions.
    pub fn failures(&self) -> usize {
        self.converted.iter().filter(|(_, ok)| !ok).count()
    }
}

fn convert_item(item: &ConversionItem, options: &TranspileOptions) -> bool {
    tracing::info!("Converting {} to Python", item.src.display());
    let result = panic::catch_unwind(AssertUnwindSafe(|| pythonize(&item.src, &item.dst, options)));
    match result {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::warn!("{}: {}", item.src.display(), err);
            false
        }
        Err(_) => {
            tracing::warn!("{}: converter panicked", item.src.display());
            false
        }
    }
}

/// Worker count for `items` files, capped by `jobs`.
pub fn worker_count(items: usize, jobs: Option<usize>) -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    let cap = jobs.filter(|&j| j > 0).unwrap_or(cpus);
    cpus.min(cap).min(items).max(1)
}

/// Convert many files in parallel.
///
/// Per-file failures are logged and reported in the summary; they never
/// stop the other files.
pub fn convert_batch(
    items: &[ConversionItem],
    options: &TranspileOptions,
    jobs: Option<usize>,
) -> BatchSummary {
    convert_batch_with(pending(), items, options, jobs)
}

/// [`convert_batch`] against an explicit registry.
pub fn convert_batch_with(
    registry: &PendingRegistry,
    items: &[ConversionItem],
    options: &TranspileOptions,
    jobs: Option<usize>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut unique: Vec<&ConversionItem> = Vec::new();
    let mut seen: HashSet<&Path> = HashSet::new();

    for item in items {
        if !seen.insert(&item.dst) {
            tracing::warn!("{} is listed twice, converting it once", item.dst.display());
            summary.duplicates.push(item.dst.clone());
            continue;
        }
        unique.push(item);
    }

    let wanted: Vec<&Path> = unique.iter().map(|&item| item.dst.as_path()).collect();
    let (granted, waited) = registry.claim_all(&wanted);
    summary.waited = waited.into_iter().map(Path::to_path_buf).collect();
    let granted: HashSet<&Path> = granted.into_iter().collect();
    let claimed: Vec<&ConversionItem> = unique
        .into_iter()
        .filter(|item| granted.contains(item.dst.as_path()))
        .collect();

    if claimed.is_empty() {
        return summary;
    }

    let workers = worker_count(claimed.len(), jobs);
    let results: Vec<bool> = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| {
            claimed
                .par_iter()
                .map(|item| convert_item(item, options))
                .collect()
        }),
        Err(err) => {
            tracing::debug!("worker pool unavailable ({}), converting sequentially", err);
            claimed.iter().map(|item| convert_item(item, options)).collect()
        }
    };

    for item in &claimed {
        registry.release(&item.dst);
    }

    summary.converted = claimed
        .iter()
        .zip(results)
        .map(|(item, ok)| (item.dst.clone(), ok))
        .collect();
    if !summary.all_ok() {
        tracing::warn!("Conversion failed for some files");
    }
    summary
}
