// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::ops::{Index, IndexMut};
use std::slice::SliceIndex;

/// A growable byte buffer that can also grow towards the front.
///
/// Every layer of the protocol wraps the payload of the layer above it with
/// a header (message id, then encryption, then transport framing). Reserving
/// room for those headers up-front means prepending them rarely moves memory.
#[derive(Clone, Debug)]
pub struct DequeBuffer<T: Copy + Default> {
    storage: Vec<T>,
    start: usize,
    reserved_front: usize,
}

impl<T: Copy + Default> DequeBuffer<T> {
    /// Creates an empty buffer with room for at least `back_capacity` elements after the data
    /// and exactly `front_capacity` elements before it.
    pub fn with_capacity(back_capacity: usize, front_capacity: usize) -> Self {
        let mut storage = Vec::with_capacity(front_capacity + back_capacity);
        storage.resize(front_capacity, T::default());
        Self {
            storage,
            start: front_capacity,
            reserved_front: front_capacity,
        }
    }

    /// Removes all values, restoring the original front reservation.
    pub fn clear(&mut self) {
        self.storage.truncate(self.reserved_front);
        self.storage.fill(T::default());
        self.start = self.reserved_front;
    }

    /// Prepends a copy of `slice`, growing the allocation only if the front space ran out.
    pub fn extend_front(&mut self, slice: &[T]) {
        if slice.len() <= self.start {
            self.start -= slice.len();
        } else {
            let missing = slice.len() - self.start;
            self.storage.resize(self.storage.len() + missing, T::default());
            self.storage.rotate_right(missing);
            self.start = 0;
        }
        self.storage[self.start..self.start + slice.len()].copy_from_slice(slice);
    }

    /// Appends a single element to the back.
    pub fn push(&mut self, value: T) {
        self.storage.push(value)
    }

    /// Shortens the buffer to keep only the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.storage.truncate(self.start + len);
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.storage.len() - self.start
    }
}

impl<T: Copy + Default> AsRef<[T]> for DequeBuffer<T> {
    fn as_ref(&self) -> &[T] {
        &self.storage[self.start..]
    }
}

impl<T: Copy + Default> AsMut<[T]> for DequeBuffer<T> {
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.storage[self.start..]
    }
}

impl<T: Copy + Default, I: SliceIndex<[T]>> Index<I> for DequeBuffer<T> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        self.as_ref().index(index)
    }
}

impl<T: Copy + Default, I: SliceIndex<[T]>> IndexMut<I> for DequeBuffer<T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        self.as_mut().index_mut(index)
    }
}

impl<T: Copy + Default> Extend<T> for DequeBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.storage.extend(iter)
    }
}

impl<'a, T: Copy + Default + 'a> Extend<&'a T> for DequeBuffer<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.storage.extend(iter)
    }
}
