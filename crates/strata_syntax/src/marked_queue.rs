//! Output queue with save points for speculative insertion.
//!
//! The term parser often learns what a run of tokens *is* only after it has emitted them: an expression start is
//! known when the operator after the first operand is seen, a statement start when its first token is. The
//! `MarkedQueue` lets the parser remember a position (a *mark*), keep appending, and later insert a start event at
//! the remembered position. Nothing is released to the consumer while any mark is live.
//!
//! ## Notes
//! - Nodes live in a slab `Vec` and are linked by index; removed slots are reused.
//! - A mark records the node it follows (`None` for "before the first node").

use crate::diagnostics::ContractError;

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    next: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    after: Option<usize>,
    committed: bool,
}

/// A FIFO queue with nested marks.
///
/// ## Examples
/// ```rust
/// use strata_syntax::MarkedQueue;
///
/// let mut queue = MarkedQueue::new();
/// queue.push_mark();
/// queue.append("a");
/// queue.append("+");
/// queue.insert_at_mark("start").unwrap();
/// queue.pop_mark().unwrap();
///
/// let drained: Vec<_> = std::iter::from_fn(|| queue.get().unwrap()).collect();
/// assert_eq!(drained, vec!["start", "a", "+"]);
/// ```
#[derive(Debug)]
pub struct MarkedQueue<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    marks: Vec<Mark>,
    len: usize,
}

impl<T> Default for MarkedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MarkedQueue<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            marks: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_mark(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// Some live mark is still a target for mark-relative insertion.
    pub fn has_active_mark(&self) -> bool {
        self.active_mark().is_some()
    }

    /// Output is pending behind a mark, or there is no output at all.
    pub fn is_more_tokens_needed(&self) -> bool {
        self.has_mark() || self.is_empty()
    }

    /// Values can be dequeued with [`MarkedQueue::get`].
    pub fn has_output(&self) -> bool {
        !self.is_more_tokens_needed()
    }

    // ========================================================================
    // Marks
    // ========================================================================

    /// Save the current tail as a new innermost mark.
    pub fn push_mark(&mut self) {
        self.marks.push(Mark {
            after: self.tail,
            committed: false,
        });
    }

    /// Discard the innermost mark; queued values stay where they are.
    pub fn pop_mark(&mut self) -> Result<(), ContractError> {
        self.marks.pop().map(|_| ()).ok_or(ContractError::NoMark)
    }

    /// Promote the innermost uncommitted mark to committed.
    ///
    /// A committed mark still holds output back until it is popped, but mark-relative insertions skip it.
    pub fn commit_mark(&mut self) -> Result<(), ContractError> {
        let index = self.active_mark().ok_or(ContractError::NoMark)?;
        self.marks[index].committed = true;
        Ok(())
    }

    fn active_mark(&self) -> Option<usize> {
        self.marks.iter().rposition(|m| !m.committed)
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    pub fn append(&mut self, value: T) {
        let after = self.tail;
        self.insert_after(after, value);
    }

    /// Insert `value` right after the position of the innermost uncommitted mark.
    ///
    /// The mark does not move, so repeated insertions at the same mark come out newest first.
    pub fn insert_at_mark(&mut self, value: T) -> Result<(), ContractError> {
        let index = self.active_mark().ok_or(ContractError::NoMark)?;
        let after = self.marks[index].after;
        self.insert_after(after, value);
        Ok(())
    }

    /// Insert `value` at the head of the queue and move the outermost mark past it.
    ///
    /// ## Notes
    /// - Callers hold exactly one live mark (statement-start stamping). The value lands at the head whatever was
    ///   queued before the mark.
    pub fn insert_before_mark(&mut self, value: T) -> Result<(), ContractError> {
        debug_assert_eq!(self.marks.len(), 1, "insert_before_mark expects exactly one live mark");
        if self.marks.is_empty() {
            return Err(ContractError::NoMark);
        }
        let node = self.insert_after(None, value);
        self.marks[0].after = Some(node);
        Ok(())
    }

    /// The value right after the innermost uncommitted mark.
    pub fn peek_object_after_mark(&self) -> Option<&T> {
        let index = self.active_mark()?;
        let node = match self.marks[index].after {
            Some(after) => self.nodes[after].next,
            None => self.head,
        }?;
        self.nodes[node].value.as_ref()
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Dequeue the head value; allowed only while no mark is live.
    pub fn get(&mut self) -> Result<Option<T>, ContractError> {
        if self.has_mark() {
            return Err(ContractError::MarksLive(self.marks.len()));
        }
        let Some(head) = self.head else {
            return Ok(None);
        };
        let node = &mut self.nodes[head];
        let value = node.value.take();
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.free.push(head);
        self.len -= 1;
        Ok(value)
    }

    /// Iterate queued values in order without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::successors(self.head, |&i| self.nodes[i].next).filter_map(|i| self.nodes[i].value.as_ref())
    }

    fn insert_after(&mut self, after: Option<usize>, value: T) -> usize {
        let next = match after {
            Some(a) => self.nodes[a].next,
            None => self.head,
        };
        let node = Node { value: Some(value), next };
        let index = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        match after {
            Some(a) => self.nodes[a].next = Some(index),
            None => self.head = Some(index),
        }
        if next.is_none() {
            self.tail = Some(index);
        }
        self.len += 1;
        index
    }
}
