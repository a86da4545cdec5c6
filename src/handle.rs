use core::num::NonZeroU32;

/// Index of a node slot in the tree's arena.
///
/// Every node holds three links (parent and two children), each an `Option<Handle>`. Storing
/// `index + 1` in a `NonZeroU32` gives `None` the zero niche, so a link stays 4 bytes instead of
/// the 16 an `Option<usize>` would take.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZeroU32);

impl Handle {
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        let raw = NonZeroU32::new((index + 1) as u32).expect("`index + 1` is never zero");
        Self(raw)
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
