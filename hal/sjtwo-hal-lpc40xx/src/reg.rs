//! Volatile 32-bit register access

/// Address of one 32-bit peripheral register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reg(usize);

impl Reg {
    pub(crate) const fn at(base: usize, offset: usize) -> Self {
        Self(base + offset)
    }

    #[inline(always)]
    pub(crate) fn read(self) -> u32 {
        // SAFETY: register blocks are only constructed for valid, aligned
        // peripheral addresses (see the `unsafe` constructors).
        unsafe { core::ptr::read_volatile(self.0 as *const u32) }
    }

    #[inline(always)]
    pub(crate) fn write(self, value: u32) {
        // SAFETY: as for `read`.
        unsafe { core::ptr::write_volatile(self.0 as *mut u32, value) }
    }

    #[inline(always)]
    pub(crate) fn modify(self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()));
    }
}
