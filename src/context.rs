pub const PAGE_SIZE: usize = 4 * 1024; // 4KiB

#[cfg(target_arch = "x86_64")]
#[repr(C)]
pub struct Registers {
    pub rbx: u64,
    pub rbp: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rsp: u64,
    pub rdx: u64, // resume address
}

#[cfg(target_arch = "aarch64")]
#[repr(C)]
pub struct Registers {
    // Floating-point registers d8-d15 (each pair is 16 bytes)
    pub d8_d9: [u64; 2],
    pub d10_d11: [u64; 2],
    pub d12_d13: [u64; 2],
    pub d14_d15: [u64; 2],
    // General-purpose registers x19-x28 (each pair is 16 bytes)
    pub x19_x20: [u64; 2],
    pub x21_x22: [u64; 2],
    pub x23_x24: [u64; 2],
    pub x25_x26: [u64; 2],
    pub x27_x28: [u64; 2],
    // Frame pointer and link register (16 bytes)
    pub x29_x30: [u64; 2], // [x29 (frame pointer), x30 (resume address)]
    pub sp: u64,
}

#[cfg(target_arch = "x86_64")]
impl Registers {
    // a synthetic context whose first restore enters thread_start on a
    // fresh stack
    pub fn fresh(stack_top: u64) -> Self {
        unsafe extern "C" {
            fn thread_start() -> !;
        }

        // System V expects the stack pointer 8 bytes past a 16-byte
        // boundary at function entry
        let rsp = (stack_top & !0xf) - 8;

        Registers {
            rbx: 0,
            rbp: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
            rsp,
            rdx: thread_start as usize as u64,
        }
    }

    // the main thread's slot is filled in by its first save
    pub fn empty() -> Self {
        Registers {
            rbx: 0,
            rbp: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
            rsp: 0,
            rdx: 0,
        }
    }
}

#[cfg(target_arch = "aarch64")]
impl Registers {
    // a synthetic context whose first restore enters thread_start on a
    // fresh stack
    pub fn fresh(stack_top: u64) -> Self {
        unsafe extern "C" {
            fn thread_start() -> !;
        }

        Registers {
            d8_d9: [0, 0],
            d10_d11: [0, 0],
            d12_d13: [0, 0],
            d14_d15: [0, 0],
            x19_x20: [0, 0],
            x21_x22: [0, 0],
            x23_x24: [0, 0],
            x25_x26: [0, 0],
            x27_x28: [0, 0],
            x29_x30: [0, thread_start as usize as u64],
            sp: stack_top & !0xf,
        }
    }

    // the main thread's slot is filled in by its first save
    pub fn empty() -> Self {
        Registers {
            d8_d9: [0, 0],
            d10_d11: [0, 0],
            d12_d13: [0, 0],
            d14_d15: [0, 0],
            x19_x20: [0, 0],
            x21_x22: [0, 0],
            x23_x24: [0, 0],
            x25_x26: [0, 0],
            x27_x28: [0, 0],
            x29_x30: [0, 0],
            sp: 0,
        }
    }
}

unsafe extern "C" {
    // returns 0 after taking the snapshot and 1 when it is resumed
    pub fn set_context(ctx: *mut Registers) -> u64;
    pub fn switch_context(ctx: *const Registers) -> !;
}

// An owned execution stack with a guard page at its low end.
pub struct Stack {
    base: *mut u8,
    layout: std::alloc::Layout,
}

impl Stack {
    pub fn new(size: usize) -> Self {
        let layout = match std::alloc::Layout::from_size_align(size, PAGE_SIZE) {
            Ok(layout) => layout,
            Err(e) => crate::error::fatal(format!("bad stack layout: {e}")),
        };

        let base = unsafe { std::alloc::alloc(layout) };
        if base.is_null() {
            crate::error::fatal("stack allocation failed");
        }

        // guard page for stack overflow protection
        unsafe {
            let ptr = std::ptr::NonNull::new_unchecked(base as *mut std::ffi::c_void);
            if let Err(e) =
                nix::sys::mman::mprotect(ptr, PAGE_SIZE, nix::sys::mman::ProtFlags::PROT_NONE)
            {
                crate::error::fatal(format!("mprotect failed: {e}"));
            }
        }

        Stack { base, layout }
    }

    pub fn top(&self) -> u64 {
        self.base as u64 + self.layout.size() as u64
    }
}

impl Drop for Stack {
    fn drop(&mut self) {
        unsafe {
            // the allocator may write into the lowest page, undo the guard
            let ptr = std::ptr::NonNull::new_unchecked(self.base as *mut std::ffi::c_void);
            let _ = nix::sys::mman::mprotect(
                ptr,
                PAGE_SIZE,
                nix::sys::mman::ProtFlags::PROT_READ | nix::sys::mman::ProtFlags::PROT_WRITE,
            );
            std::alloc::dealloc(self.base, self.layout);
        }
    }
}
