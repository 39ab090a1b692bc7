// One FIFO of thread ids per priority level; lower index is higher
// priority.
pub struct ReadyQueues {
    queues: Vec<std::collections::VecDeque<crate::types::Tid>>,
}

impl ReadyQueues {
    pub fn new(levels: usize, depth: usize) -> Self {
        // each band reserves `depth` slots up front so a push from the
        // tick path never allocates
        ReadyQueues {
            queues: (0..levels)
                .map(|_| std::collections::VecDeque::with_capacity(depth))
                .collect(),
        }
    }

    pub fn push_back(&mut self, priority: usize, tid: crate::types::Tid) {
        self.queues[priority].push_back(tid);
    }

    // pop the head of the highest-priority non-empty band
    pub fn pop_highest(&mut self) -> Option<(usize, crate::types::Tid)> {
        self.queues
            .iter_mut()
            .enumerate()
            .find_map(|(priority, queue)| queue.pop_front().map(|tid| (priority, tid)))
    }

    pub fn remove(&mut self, tid: crate::types::Tid) -> bool {
        for queue in &mut self.queues {
            if let Some(at) = queue.iter().position(|&queued| queued == tid) {
                queue.remove(at);
                return true;
            }
        }
        false
    }
}
