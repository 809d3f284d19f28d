use core::fmt;

/// Error returned when a [`Pool`] has no free slot left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolExhausted;

impl fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool exhausted")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PoolExhausted {}

/// An index into a [`Pool`].
///
/// A handle is only meaningful for the pool that returned it, and only until it is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handle(usize);

impl Handle {
    /// Return the slot index of the handle.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<Handle>,
}

/// A fixed-capacity slab.
///
/// Values are stored in `N` slots. Allocation never grows the storage: when every slot is in
/// use, [`Pool::alloc`] returns [`PoolExhausted`] and the value is handed back to nobody.
///
/// Slots can be chained into insertion-ordered, singly linked [`List`]s that live inside the
/// pool. A list owns its slots until [`Pool::free_list`] releases them.
#[derive(Debug)]
pub struct Pool<T, const N: usize> {
    slots: [Option<Node<T>>; N],
    used: usize,
}

impl<T, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Pool<T, N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            used: 0,
        }
    }

    /// Return the number of slots of the pool.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Return the number of slots currently allocated.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Return the number of free slots.
    pub fn available(&self) -> usize {
        N - self.used
    }

    /// Store a value in a free slot.
    pub fn alloc(&mut self, value: T) -> Result<Handle, PoolExhausted> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(PoolExhausted)?;

        self.slots[index] = Some(Node { value, next: None });
        self.used += 1;
        Ok(Handle(index))
    }

    /// Release a slot and return its value.
    ///
    /// Freeing a slot that is part of a list breaks that list; use [`Pool::free_list`] instead.
    pub fn free(&mut self, handle: Handle) -> Option<T> {
        let node = self.slots.get_mut(handle.0)?.take()?;
        self.used -= 1;
        Some(node.value)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.0)?.as_ref().map(|node| &node.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.0)?
            .as_mut()
            .map(|node| &mut node.value)
    }

    /// Allocate a value and append it to the tail of `list`.
    ///
    /// On exhaustion the list is left untouched.
    pub fn push_back(&mut self, list: &mut List, value: T) -> Result<Handle, PoolExhausted> {
        let handle = self.alloc(value)?;

        match list.tail {
            Some(tail) => {
                if let Some(Some(node)) = self.slots.get_mut(tail.0) {
                    node.next = Some(handle);
                }
            }
            None => list.head = Some(handle),
        }

        list.tail = Some(handle);
        list.len += 1;
        Ok(handle)
    }

    /// Iterate over the values of `list`, in insertion order.
    pub fn iter<'a>(&'a self, list: &List) -> ListIter<'a, T, N> {
        ListIter {
            pool: self,
            next: list.head,
        }
    }

    /// Return every slot of `list` to the pool and leave the list empty.
    pub fn free_list(&mut self, list: &mut List) {
        let mut next = list.head.take();

        while let Some(handle) = next {
            next = match self.slots.get_mut(handle.0).and_then(Option::take) {
                Some(node) => {
                    self.used -= 1;
                    node.next
                }
                None => None,
            };
        }

        list.tail = None;
        list.len = 0;
    }
}

/// An insertion-ordered, singly linked list of [`Pool`] slots.
///
/// The list only stores handles; the values live in the pool it was filled from.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct List {
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl List {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<Handle> {
        self.head
    }
}

/// Iterator over the values of a [`List`].
#[derive(Debug)]
pub struct ListIter<'a, T, const N: usize> {
    pool: &'a Pool<T, N>,
    next: Option<Handle>,
}

impl<'a, T, const N: usize> Iterator for ListIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pool.slots.get(self.next?.0)?.as_ref()?;
        self.next = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alloc_until_exhausted() {
        let mut pool: Pool<u32, 2> = Pool::new();

        let a = pool.alloc(1).unwrap();
        let b = pool.alloc(2).unwrap();
        assert_eq!(pool.alloc(3), Err(PoolExhausted));
        assert_eq!(pool.available(), 0);

        assert_eq!(pool.free(a), Some(1));
        assert_eq!(pool.free(a), None);
        assert_eq!(pool.get(b), Some(&2));

        let c = pool.alloc(3).unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut pool: Pool<u8, 4> = Pool::new();
        let mut list = List::new();

        for value in [7, 3, 9] {
            pool.push_back(&mut list, value).unwrap();
        }

        assert_eq!(list.len(), 3);
        assert!(pool.iter(&list).copied().eq([7, 3, 9]));
    }

    #[test]
    fn exhausted_list_stays_usable() {
        let mut pool: Pool<u8, 2> = Pool::new();
        let mut list = List::new();

        pool.push_back(&mut list, 1).unwrap();
        pool.push_back(&mut list, 2).unwrap();
        assert_eq!(pool.push_back(&mut list, 3), Err(PoolExhausted));

        assert_eq!(list.len(), 2);
        assert!(pool.iter(&list).copied().eq([1, 2]));
    }

    #[test]
    fn free_list_returns_every_slot() {
        let mut pool: Pool<u8, 3> = Pool::new();
        let mut first = List::new();
        let mut second = List::new();

        pool.push_back(&mut first, 1).unwrap();
        pool.push_back(&mut second, 2).unwrap();
        pool.push_back(&mut first, 3).unwrap();

        pool.free_list(&mut first);
        assert!(first.is_empty());
        assert_eq!(pool.len(), 1);
        assert!(pool.iter(&second).copied().eq([2]));

        pool.free_list(&mut second);
        assert!(pool.is_empty());
    }
}
