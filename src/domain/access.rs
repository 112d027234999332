use super::coloring::DisjointColor;
use rayon::prelude::*;
use std::marker::PhantomData;
use std::ops::AddAssign;

/// Shared mutable access to the entries of a slice from several threads.
struct ParallelSliceAccess<'a, T> {
    ptr: *mut T,
    len: usize,
    marker: PhantomData<&'a mut T>,
}

impl<'a, T> ParallelSliceAccess<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `index` must be in bounds, and no two references to the same index may be alive at the
    /// same time.
    unsafe fn get_unchecked_mut(&self, index: usize) -> &'a mut T {
        debug_assert!(index < self.len);
        &mut *self.ptr.add(index)
    }
}

// Hands out `&mut T` to other threads
unsafe impl<'a, T: Send> Sync for ParallelSliceAccess<'a, T> {}
unsafe impl<'a, T: Send> Send for ParallelSliceAccess<'a, T> {}

/// Adds the values produced by `contribution(ispec)` to `target` at the nodes of each element of
/// `color`, processing the elements in parallel.
///
/// Values are matched to the element's nodes in order. Surplus values on either side are ignored.
///
/// # Panics
///
/// Panics if a node of the color is out of bounds for `target`.
pub(crate) fn par_scatter_add<T, F, I>(color: &DisjointColor, target: &mut [T], contribution: F)
where
    T: Send + AddAssign,
    F: Sync + Fn(usize) -> I,
    I: IntoIterator<Item = T>,
{
    if let Some(max_node) = color.max_node() {
        assert!(max_node < target.len(), "Node {max_node} is out of bounds for the target");
    }
    let access = ParallelSliceAccess::new(target);
    (0..color.len()).into_par_iter().for_each(|local| {
        let ispec = color.elements()[local];
        for (&iglob, value) in color.nodes(local).iter().zip(contribution(ispec)) {
            // SAFETY: the node is in bounds, and only the thread handling this element touches it.
            // Each reference is dropped before the next is created.
            unsafe { *access.get_unchecked_mut(iglob) += value };
        }
    });
}
