#![forbid(unsafe_code)]

//! Equality checks for derived values.
//!
//! Subscribers compare each freshly derived value with the previous one and
//! only schedule work when the check reports a difference. Two checks ship
//! with the crate:
//!
//! - [`Strict`]: identity. Shared pointers (`Rc`, `Arc`) compare by address;
//!   plain values (numbers, `bool`, `char`, `String`, `()`) compare by value
//!   since they carry no identity of their own. This is the default.
//! - [`Shallow`]: one level of field-by-field identity. Two `Rc<Post>`s that
//!   are different allocations but whose fields are identical compare equal.
//!
//! Any `Fn(&T, &T) -> bool` is also an [`Equality`].
//!
//! Owned collections (`Vec`, maps) do not implement [`Identity`]: a freshly
//! built collection never has the identity of the previous one. Wrap them in
//! `Rc` to share them, or compare them with [`Shallow`].

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

/// Identity comparison: "is this the same value", not "does it look alike".
pub trait Identity {
    fn identical(&self, other: &Self) -> bool;
}

/// One-level structural comparison whose fields are compared by [`Identity`].
pub trait ShallowEq {
    fn shallow_eq(&self, other: &Self) -> bool;
}

/// A pluggable comparison between a previous and a next derived value.
pub trait Equality<T: ?Sized> {
    /// `true` when `next` should be treated as unchanged from `prev`.
    fn equals(&self, prev: &T, next: &T) -> bool;
}

impl<T: ?Sized, F> Equality<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equals(&self, prev: &T, next: &T) -> bool {
        self(prev, next)
    }
}

/// Identity equality (the default check).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strict;

impl<T: Identity + ?Sized> Equality<T> for Strict {
    fn equals(&self, prev: &T, next: &T) -> bool {
        prev.identical(next)
    }
}

/// Shallow field-by-field equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shallow;

impl<T: ShallowEq + ?Sized> Equality<T> for Shallow {
    fn equals(&self, prev: &T, next: &T) -> bool {
        prev.shallow_eq(next)
    }
}

/// Compare two values with [`Strict`] semantics.
#[must_use]
pub fn strict_equal<T: Identity + ?Sized>(a: &T, b: &T) -> bool {
    a.identical(b)
}

/// Compare two values with [`Shallow`] semantics.
#[must_use]
pub fn shallow_equal<T: ShallowEq + ?Sized>(a: &T, b: &T) -> bool {
    a.shallow_eq(b)
}

macro_rules! value_semantics {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                #[inline]
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }
            }

            impl ShallowEq for $ty {
                #[inline]
                fn shallow_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_semantics!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
    &'static str,
);

impl<T: ?Sized> Identity for Rc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<A: Identity, B: Identity> Identity for (A, B) {
    fn identical(&self, other: &Self) -> bool {
        self.0.identical(&other.0) && self.1.identical(&other.1)
    }
}

impl<A: Identity, B: Identity, C: Identity> Identity for (A, B, C) {
    fn identical(&self, other: &Self) -> bool {
        self.0.identical(&other.0) && self.1.identical(&other.1) && self.2.identical(&other.2)
    }
}

// A shared pointer is shallow-equal to another when it is the same
// allocation, or when the pointees are shallow-equal.
impl<T: ShallowEq + ?Sized> ShallowEq for Rc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

impl<T: ShallowEq + ?Sized> ShallowEq for Arc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

impl<T: ShallowEq> ShallowEq for Option<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.shallow_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identity> ShallowEq for [T] {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.identical(b))
    }
}

impl<T: Identity> ShallowEq for Vec<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.as_slice().shallow_eq(other.as_slice())
    }
}

impl<K, V, H> ShallowEq for HashMap<K, V, H>
where
    K: Eq + Hash,
    V: Identity,
    H: BuildHasher,
{
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.identical(o)))
    }
}

impl<K: Ord, V: Identity> ShallowEq for BTreeMap<K, V> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.identical(vb))
    }
}

/// Implement [`ShallowEq`] for a struct by comparing the listed fields with
/// [`Identity`].
///
/// # Examples
///
/// ```
/// use tether_core::{impl_shallow_eq, shallow_equal};
///
/// struct Post {
///     title: String,
///     views: u64,
/// }
/// impl_shallow_eq!(Post { title, views });
///
/// let a = Post { title: "Hi".into(), views: 3 };
/// let b = Post { title: "Hi".into(), views: 3 };
/// assert!(shallow_equal(&a, &b));
/// ```
#[macro_export]
macro_rules! impl_shallow_eq {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::ShallowEq for $ty {
            fn shallow_eq(&self, other: &Self) -> bool {
                true $(&& $crate::Identity::identical(&self.$field, &other.$field))*
            }
        }
    };
}
