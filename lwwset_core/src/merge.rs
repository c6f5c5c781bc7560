/// The interface state-based CRDTs implement to converge. Replicas exchange
/// their full state and merge it into their own.
pub trait Merge {
    /// Merge two values into one. In order for CRDT semantics to hold, this
    /// operation must be commutative, associative, and idempotent. There are
    /// tests to help guarantee this below.
    #[must_use]
    fn merge(self, other: Self) -> Self;
}

/// Test that a Merge implementation is idempotent (in other words, merging
/// with itself should not change the state.)
#[cfg(test)]
pub fn test_idempotent<T>(orig: T)
where
    T: Merge + Clone + PartialEq + std::fmt::Debug,
{
    let merged = orig.clone().merge(orig.clone());

    assert_eq!(merged, orig, "idempotency failure");
}

/// Test that a Merge implementation is commutative (in other words, the order
/// of merges should not effect the final result.)
#[cfg(test)]
pub fn test_commutative<T>(m1: T, m2: T)
where
    T: Merge + Clone + PartialEq + std::fmt::Debug,
{
    let merged1 = m1.clone().merge(m2.clone());
    let merged2 = m2.merge(m1);

    assert_eq!(merged1, merged2, "commutativity failure");
}

/// Test that a Merge implementation is associative (in other words, the order
/// in which replicas are merged should not effect the final result.)
#[cfg(test)]
pub fn test_associative<T>(m1: T, m2: T, m3: T)
where
    T: Merge + Clone + PartialEq + std::fmt::Debug,
{
    let merged1 = m1.clone().merge(m2.clone()).merge(m3.clone());
    let merged2 = m1.merge(m2.merge(m3));

    assert_eq!(merged1, merged2, "associativity failure");
}
