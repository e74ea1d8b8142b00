use crate::{
    prioritizer::{SvPrioritizer, SvPriority},
    settings::PrioritizationSettings,
    variant::VariantRecord,
};
use futures::{StreamExt, stream};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use std::time::{Duration, Instant};

/// Logs throughput every `tick` items.
pub struct ProgressReporter {
    total: usize,
    tick: usize,
    done: usize,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(total: usize, tick: usize) -> Self {
        Self {
            total,
            tick: tick.max(1),
            done: 0,
            started: Instant::now(),
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }

    fn rate(&self) -> f64 {
        let seconds = self.started.elapsed().as_secs_f64();
        if seconds > 0.0 {
            self.done as f64 / seconds
        } else {
            0.0
        }
    }

    pub fn tick(&mut self) {
        self.done += 1;
        if self.done % self.tick == 0 {
            info!(
                "Prioritized {}/{} variants ({:.1} items/s)",
                self.done,
                self.total,
                self.rate()
            );
        }
    }

    pub fn finish(&self) {
        info!(
            "Prioritized {} variants in {:.2}s ({:.1} items/s)",
            self.done,
            self.started.elapsed().as_secs_f64(),
            self.rate()
        );
    }
}

/// Prioritize `records` on at most `settings.workers` blocking tasks.
///
/// The output has one entry per record, in input order. Rejected records and variants that fail,
/// panic or run past `settings.timeout_ms` are `SvPriority::Unknown`.
pub async fn prioritize_batch(
    prioritizer: Arc<SvPrioritizer>,
    records: Vec<VariantRecord>,
    settings: &PrioritizationSettings,
) -> Vec<SvPriority> {
    let timeout = settings.timeout_ms.map(Duration::from_millis);
    let workers = settings.workers.max(1);
    // a timed out task keeps its permit until it returns, so abandoned tasks still count
    // against `workers`
    let permits = Arc::new(Semaphore::new(workers));
    let mut progress = ProgressReporter::new(records.len(), settings.progress_tick);
    let mut priorities = Vec::with_capacity(records.len());

    let mut results = stream::iter(records)
        .map(|record| {
            let prioritizer = prioritizer.clone();
            let permits = permits.clone();
            async move {
                let variant = match record {
                    VariantRecord::Parsed(variant) => variant,
                    VariantRecord::Rejected { id, error } => {
                        debug!("Not prioritizing {}: {}", id, error);
                        return SvPriority::Unknown;
                    }
                };
                let id = variant.id.clone();

                let permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Prioritizing {} failed: {}", id, e);
                        return SvPriority::Unknown;
                    }
                };
                let task = tokio::task::spawn_blocking(move || {
                    let priority = prioritizer.prioritize(&variant);
                    drop(permit);
                    priority
                });

                let joined = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, task).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            // the blocking task runs to completion and its result is dropped
                            warn!("Prioritizing {} timed out after {:?}", id, limit);
                            return SvPriority::Unknown;
                        }
                    },
                    None => task.await,
                };

                joined.unwrap_or_else(|e| {
                    error!("Prioritizing {} failed: {}", id, e);
                    SvPriority::Unknown
                })
            }
        })
        .buffered(workers);

    while let Some(priority) = results.next().await {
        priorities.push(priority);
        progress.tick();
    }
    progress.finish();

    priorities
}
