use std::ops::BitOr;

use smallvec::SmallVec;

use crate::term::GoTermId;
use crate::DEFAULT_NUM_PARENTS;

/// A set of [`GoTermId`] representing a group of GO terms
///
/// Each term can occur only once in the group and the IDs
/// are kept sorted, so lookups are binary searches.
///
/// This group is used e.g. for holding the parent or child terms of a term
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GoGroup {
    ids: SmallVec<[GoTermId; DEFAULT_NUM_PARENTS]>,
}

impl GoGroup {
    /// Constructs a new, empty [`GoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`GoGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`GoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`GoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`GoTermId`] to the group
    ///
    /// Returns whether the `GoTermId` was newly inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use goenrich::term::GoGroup;
    ///
    /// let mut group = GoGroup::new();
    /// assert!(group.insert(5u32));
    /// assert!(!group.insert(5u32));
    /// assert_eq!(group.len(), 1);
    /// ```
    pub fn insert<I: Into<GoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Appends without checking order or uniqueness
    ///
    /// Callers must guarantee that `id` is larger than every ID in the group.
    fn insert_unchecked(&mut self, id: GoTermId) {
        self.ids.push(id);
    }

    /// Returns `true` if the group contains the [`GoTermId`]
    pub fn contains(&self, id: &GoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`GoTermId`]s inside the group
    pub fn iter(&self) -> GoTermIds<'_> {
        GoTermIds::new(self.ids.iter())
    }
}

impl FromIterator<GoTermId> for GoGroup {
    fn from_iter<T: IntoIterator<Item = GoTermId>>(iter: T) -> Self {
        let mut group = GoGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl<'a> IntoIterator for &'a GoGroup {
    type Item = GoTermId;
    type IntoIter = GoTermIds<'a>;

    fn into_iter(self) -> GoTermIds<'a> {
        GoTermIds::new(self.ids.iter())
    }
}

/// An iterator over [`GoTermId`]s
pub struct GoTermIds<'a> {
    inner: std::slice::Iter<'a, GoTermId>,
}

impl<'a> GoTermIds<'a> {
    fn new(inner: std::slice::Iter<'a, GoTermId>) -> Self {
        Self { inner }
    }
}

impl Iterator for GoTermIds<'_> {
    type Item = GoTermId;
    fn next(&mut self) -> Option<GoTermId> {
        self.inner.next().copied()
    }
}

impl BitOr for &GoGroup {
    type Output = GoGroup;

    fn bitor(self, rhs: &GoGroup) -> GoGroup {
        let mut group = GoGroup::with_capacity(self.len() + rhs.len());
        let (mut left, mut right) = (self.ids.iter().peekable(), rhs.ids.iter().peekable());
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) if l < r => left.next(),
                (Some(l), Some(r)) if l > r => right.next(),
                (Some(_), Some(_)) => {
                    right.next();
                    left.next()
                }
                (Some(_), None) => left.next(),
                (None, Some(_)) => right.next(),
                (None, None) => break,
            };
            if let Some(id) = next {
                group.insert_unchecked(*id);
            }
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[u32]) -> GoGroup {
        ids.iter().map(|id| GoTermId::from(*id)).collect()
    }

    #[test]
    fn iteration_is_sorted() {
        let g = group(&[3, 1, 2, 1]);
        let ids: Vec<u32> = g.iter().map(|id| id.as_u32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_bitor() {
        let result = &group(&[1, 2, 3]) | &group(&[2, 4, 5]);
        assert_eq!(result, group(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_bitor_empty() {
        let result = &group(&[]) | &group(&[7]);
        assert_eq!(result, group(&[7]));
    }
}
