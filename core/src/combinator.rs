//! Flattening of conditional query and header contributions.
//!
//! # Design
//! A descriptor's queries and headers are usually built from a mix of fixed
//! entries, optional entries, either/or branches and loops. Every such piece
//! implements [`Contribution`], and a [`Combinator`] appends them in
//! declaration order into one flat `Vec`. Flattening is depth-first, keeps
//! order and never deduplicates; conflict resolution happens later, at
//! request assembly.

/// Something that contributes zero or more `T` values to a flat sequence.
pub trait Contribution<T> {
    fn contribute(self, into: &mut Vec<T>);
}

/// Contributes nothing. The identity element of flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl<T> Contribution<T> for Empty {
    fn contribute(self, _into: &mut Vec<T>) {}
}

/// One of two alternative contributions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Either<A, B> {
    First(A),
    Second(B),
}

impl<T, A, B> Contribution<T> for Either<A, B>
where
    A: Contribution<T>,
    B: Contribution<T>,
{
    fn contribute(self, into: &mut Vec<T>) {
        match self {
            Either::First(a) => a.contribute(into),
            Either::Second(b) => b.contribute(into),
        }
    }
}

impl<T, C: Contribution<T>> Contribution<T> for Option<C> {
    fn contribute(self, into: &mut Vec<T>) {
        if let Some(inner) = self {
            inner.contribute(into);
        }
    }
}

impl<T, C: Contribution<T>> Contribution<T> for Vec<C> {
    fn contribute(self, into: &mut Vec<T>) {
        for item in self {
            item.contribute(into);
        }
    }
}

impl<T, C: Contribution<T>, const N: usize> Contribution<T> for [C; N] {
    fn contribute(self, into: &mut Vec<T>) {
        for item in self {
            item.contribute(into);
        }
    }
}

/// Fluent builder that flattens contributions into one ordered sequence.
///
/// ```
/// use endpoints_core::{Combinator, Query};
///
/// let page = Some(2);
/// let queries = Combinator::<Query>::new()
///     .add(Query::new("q", "rust"))
///     .add(page.map(|p| Query::new("page", p)))
///     .add_each(["a", "b"].map(|tag| Query::new("tag", tag)))
///     .build();
/// assert_eq!(queries.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinator<T> {
    items: Vec<T>,
}

impl<T> Default for Combinator<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Combinator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, contribution: impl Contribution<T>) -> Self {
        contribution.contribute(&mut self.items);
        self
    }

    /// Optional branch: the contribution is only built when `condition` holds.
    pub fn add_if<C, F>(self, condition: bool, contribution: F) -> Self
    where
        C: Contribution<T>,
        F: FnOnce() -> C,
    {
        self.add(condition.then(contribution))
    }

    /// Either/or branch.
    pub fn either<A, B>(self, condition: bool, first: A, second: B) -> Self
    where
        A: Contribution<T>,
        B: Contribution<T>,
    {
        if condition {
            self.add(first)
        } else {
            self.add(second)
        }
    }

    /// Repeated branch: every item of `items` contributes in iteration order.
    pub fn add_each<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Contribution<T>,
    {
        for item in items {
            item.contribute(&mut self.items);
        }
        self
    }

    pub fn build(self) -> Vec<T> {
        self.items
    }
}

impl<T> Contribution<T> for Combinator<T> {
    fn contribute(self, into: &mut Vec<T>) {
        into.extend(self.items);
    }
}

/// Concatenate any number of contributions, preserving order.
pub fn merge<T, I>(parts: I) -> Vec<T>
where
    I: IntoIterator,
    I::Item: Contribution<T>,
{
    Combinator::new().add_each(parts).build()
}
