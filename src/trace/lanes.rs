//! Lane assignment.
//!
//! Perfetto draws each track as a horizontal row of properly nested slices.
//! Build operations run concurrently, so they are spread across synthetic
//! "abstract thread" lanes. Each lane remembers the id of the operation at the
//! top of its stack; a child goes onto its parent's lane when the parent is on
//! top there, otherwise onto the first idle lane, otherwise onto a new lane.
//!
//! The table is append-only. Lanes are numbered from 1 so that no lane shares
//! an index with the process track.

use super::record::OperationId;

/// Result of [`LaneTable::assign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneChoice {
    /// 1-based lane index, also used as the lane's `tid`
    pub index: u32,
    /// Whether this lane was just created and still needs a descriptor
    pub is_new: bool,
}

#[derive(Debug, Default)]
pub struct LaneTable {
    /// Innermost open operation per lane, `None` when idle. Slot `i` is lane `i + 1`.
    top: Vec<Option<OperationId>>,
}

impl LaneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the lane for an operation whose parent is `parent`.
    ///
    /// A `None` parent matches an idle lane in the first rule, which is the
    /// same lane the second rule would pick.
    pub fn assign(&mut self, parent: Option<OperationId>) -> LaneChoice {
        let found = self
            .top
            .iter()
            .position(|top| *top == parent)
            .or_else(|| self.top.iter().position(Option::is_none));

        match found {
            Some(slot) => LaneChoice {
                index: slot as u32 + 1,
                is_new: false,
            },
            None => {
                self.top.push(None);
                LaneChoice {
                    index: self.top.len() as u32,
                    is_new: true,
                }
            }
        }
    }

    /// Push `id` onto `lane`, returning what was on top before.
    pub fn open(&mut self, lane: u32, id: OperationId) -> Option<OperationId> {
        self.slot_mut(lane).and_then(|top| top.replace(id))
    }

    /// Put `previous` back on top of `lane` when an operation finishes.
    pub fn restore(&mut self, lane: u32, previous: Option<OperationId>) {
        if let Some(top) = self.slot_mut(lane) {
            *top = previous;
        }
    }

    /// The operation currently on top of `lane`.
    pub fn top(&self, lane: u32) -> Option<OperationId> {
        lane.checked_sub(1)
            .and_then(|slot| self.top.get(slot as usize))
            .copied()
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.top.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    fn slot_mut(&mut self, lane: u32) -> Option<&mut Option<OperationId>> {
        let slot = lane.checked_sub(1)?;
        self.top.get_mut(slot as usize)
    }
}
