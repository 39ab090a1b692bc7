pub struct Tcb {
    pub id: crate::types::Tid,
    pub state: crate::types::ThreadState,
    pub priority: usize,
    pub quantums: u64, // number of times this thread has been dispatched
    pub regs: crate::context::Registers,
    pub stack: Option<crate::context::Stack>, // None for the main thread
    pub entry: Option<Box<dyn crate::types::Executable>>, // consumed at first dispatch
}

impl Tcb {
    // the adopted caller of init, already mid-way through its first quantum
    pub fn main() -> Self {
        Tcb {
            id: 0,
            state: crate::types::ThreadState::Running,
            priority: 0,
            quantums: 1,
            regs: crate::context::Registers::empty(),
            stack: None,
            entry: None,
        }
    }

    pub fn spawned(
        id: crate::types::Tid,
        priority: usize,
        stack: crate::context::Stack,
        entry: Box<dyn crate::types::Executable>,
    ) -> Self {
        let regs = crate::context::Registers::fresh(stack.top());

        Tcb {
            id,
            state: crate::types::ThreadState::Ready,
            priority,
            quantums: 0,
            regs,
            stack: Some(stack),
            entry: Some(entry),
        }
    }

    pub fn regs_mut(&mut self) -> *mut crate::context::Registers {
        &mut self.regs as *mut crate::context::Registers
    }

    pub fn regs(&self) -> *const crate::context::Registers {
        &self.regs as *const crate::context::Registers
    }
}

// Control blocks are boxed so a saved `Registers` pointer stays stable
// while its thread is suspended.
pub struct ThreadTable {
    slots: Vec<Option<Box<Tcb>>>,
}

impl ThreadTable {
    pub fn new(capacity: usize) -> Self {
        ThreadTable {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    // smallest unused id in [1, capacity); slot 0 is the main thread's
    pub fn allocate_tid(&self) -> Option<crate::types::Tid> {
        (1..self.slots.len()).find(|&tid| self.slots[tid].is_none())
    }

    pub fn insert(&mut self, tcb: Box<Tcb>) {
        let tid = tcb.id;
        self.slots[tid] = Some(tcb);
    }

    pub fn remove(&mut self, tid: crate::types::Tid) -> Option<Box<Tcb>> {
        self.slots.get_mut(tid)?.take()
    }

    pub fn get(&self, tid: crate::types::Tid) -> Option<&Tcb> {
        self.slots.get(tid)?.as_deref()
    }

    pub fn get_mut(&mut self, tid: crate::types::Tid) -> Option<&mut Tcb> {
        self.slots.get_mut(tid)?.as_deref_mut()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
