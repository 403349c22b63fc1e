use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// A vector that can only be indexed by a dedicated key type, so that
/// per-variable tables cannot accidentally be indexed with a literal code
/// and vice versa.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct KeyedVec<Key, Value> {
    key: PhantomData<Key>,
    elements: Vec<Value>,
}

impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        KeyedVec {
            key: PhantomData,
            elements: self.elements.clone(),
        }
    }
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            key: PhantomData,
            elements: Vec::default(),
        }
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &'_ Value> {
        self.elements.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &'_ mut Value> {
        self.elements.iter_mut()
    }
}

impl<Key: StorageKey, Value: Clone> KeyedVec<Key, Value> {
    pub(crate) fn resize(&mut self, new_len: usize, value: Value) {
        self.elements.resize(new_len, value)
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, index: Key) -> &mut Self::Output {
        &mut self.elements[index.index()]
    }
}

/// Types that can act as a dense index into a [`KeyedVec`] or a
/// [`crate::StampSet`].
pub trait StorageKey {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct TestKey(usize);

    impl StorageKey for TestKey {
        fn index(&self) -> usize {
            self.0
        }

        fn create_from_index(index: usize) -> Self {
            TestKey(index)
        }
    }

    #[test]
    fn values_are_retrieved_by_their_typed_key() {
        let mut vec: KeyedVec<TestKey, &str> = KeyedVec::default();
        vec.resize(2, "a");
        vec[TestKey(1)] = "b";
        assert_eq!(vec[TestKey(0)], "a");
        assert_eq!(vec[TestKey(1)], "b");
    }

    #[test]
    fn resize_grows_with_the_given_value() {
        let mut vec: KeyedVec<TestKey, u32> = KeyedVec::default();
        vec.resize(3, 9);
        assert_eq!(vec.len(), 3);
        assert_eq!(vec[TestKey(2)], 9);
    }
}
