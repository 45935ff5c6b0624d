//! Pair operation starts with their finishes.
//!
//! The dispatcher makes one forward pass over the records. On a start it asks
//! the visitor for a pending completion value and parks it, together with the
//! start, in the open-operation directory. On the matching finish the entry is
//! removed and handed back to the visitor. Memory therefore tracks the number
//! of concurrently open operations, never the length of the log.
//!
//! A finish whose id is not open is dropped. Starts that never finish stay in
//! the directory; there is no end-of-stream flush.

use std::collections::HashMap;

use anyhow::Result;

use super::record::{
    BuildOperationFinish, BuildOperationProgress, BuildOperationRecord, BuildOperationStart,
    OperationId,
};

/// Receives paired build operation events.
pub trait BuildOperationVisitor {
    /// What the visitor needs to remember between a start and its finish.
    type Pending;

    /// Called for every start. The returned value is passed to
    /// [`on_finish`](Self::on_finish) when the matching finish arrives.
    fn on_start(&mut self, start: &BuildOperationStart) -> Result<Self::Pending>;

    /// Called exactly once per start that is later matched by a finish, in
    /// finish-arrival order.
    fn on_finish(
        &mut self,
        pending: Self::Pending,
        start: &BuildOperationStart,
        finish: &BuildOperationFinish,
    ) -> Result<()>;

    fn on_progress(&mut self, progress: &BuildOperationProgress) -> Result<()> {
        let _ = progress;
        Ok(())
    }
}

/// Counters describing a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub records: usize,
    pub starts: usize,
    pub finishes: usize,
    pub progress: usize,
    /// Finishes that referenced no open operation
    pub unmatched_finishes: usize,
    /// Operations that were started but never finished
    pub still_open: usize,
    /// High-water mark of the open-operation directory
    pub max_open: usize,
    /// Finishes and progress seen before any start, which cannot be timed
    pub before_first_start: usize,
}

struct OpenOperation<P> {
    start: BuildOperationStart,
    pending: P,
}

/// Drives a [`BuildOperationVisitor`] over a record sequence.
pub struct Dispatcher<'v, V: BuildOperationVisitor> {
    visitor: &'v mut V,
    open: HashMap<OperationId, OpenOperation<V::Pending>>,
    stats: DispatchStats,
}

impl<'v, V: BuildOperationVisitor> Dispatcher<'v, V> {
    pub fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            open: HashMap::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Process one record.
    pub fn dispatch(&mut self, record: BuildOperationRecord) -> Result<()> {
        self.stats.records += 1;
        if self.stats.starts == 0 && !matches!(record, BuildOperationRecord::Start(_)) {
            if self.stats.before_first_start == 0 {
                log::warn!(
                    "Record for operation {} precedes the first operation start",
                    record.id()
                );
            }
            self.stats.before_first_start += 1;
        }
        match record {
            BuildOperationRecord::Start(start) => {
                self.stats.starts += 1;
                let pending = self.visitor.on_start(&start)?;
                let id = start.id;
                if self
                    .open
                    .insert(id, OpenOperation { start, pending })
                    .is_some()
                {
                    log::debug!("Operation {id} started again while still open");
                }
                self.stats.max_open = self.stats.max_open.max(self.open.len());
            }
            BuildOperationRecord::Finish(finish) => {
                self.stats.finishes += 1;
                match self.open.remove(&finish.id) {
                    Some(OpenOperation { start, pending }) => {
                        self.visitor.on_finish(pending, &start, &finish)?;
                    }
                    None => {
                        self.stats.unmatched_finishes += 1;
                        log::debug!("Dropping finish for operation {} with no open start", finish.id);
                    }
                }
            }
            BuildOperationRecord::Progress(progress) => {
                self.stats.progress += 1;
                self.visitor.on_progress(&progress)?;
            }
        }
        Ok(())
    }

    /// Number of operations currently started but not finished.
    pub fn open_operations(&self) -> usize {
        self.open.len()
    }

    pub fn is_open(&self, id: OperationId) -> bool {
        self.open.contains_key(&id)
    }

    /// End the pass and report what happened.
    pub fn finish(self) -> DispatchStats {
        DispatchStats {
            still_open: self.open.len(),
            ..self.stats
        }
    }
}

/// Run `visitor` over every record, stopping at the first error.
pub fn visit_records<I, V>(records: I, visitor: &mut V) -> Result<DispatchStats>
where
    I: IntoIterator<Item = Result<BuildOperationRecord>>,
    V: BuildOperationVisitor,
{
    let mut dispatcher = Dispatcher::new(visitor);
    for record in records {
        dispatcher.dispatch(record?)?;
    }
    Ok(dispatcher.finish())
}
