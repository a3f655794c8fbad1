//! Operation metadata as an ordinary struct.
//!
//! The source ecosystem stamped a callable's introspectable name and
//! parameter count onto the function object itself. That has no
//! portable equivalent here, so the metadata lives in an explicit
//! descriptor that dispatch layers consult instead.

use serde::{Deserialize, Serialize};

/// Name and arity of an operation. Fixed at construction, immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// The operation's name, explicit or inferred from a handler name.
    pub name: String,
    /// How many call arguments the operation takes.
    pub arity: usize,
}

impl Descriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Compile-time argument count of a call-argument tuple, the analog of
/// a handler's declared parameter count.
pub trait Arity {
    /// Number of elements in the tuple.
    const ARITY: usize;
}

macro_rules! impl_arity {
    ($count:expr => $($ty:ident),*) => {
        impl<$($ty),*> Arity for ($($ty,)*) {
            const ARITY: usize = $count;
        }
    };
}

impl Arity for () {
    const ARITY: usize = 0;
}

impl_arity!(1 => A1);
impl_arity!(2 => A1, A2);
impl_arity!(3 => A1, A2, A3);
impl_arity!(4 => A1, A2, A3, A4);
impl_arity!(5 => A1, A2, A3, A4, A5);
impl_arity!(6 => A1, A2, A3, A4, A5, A6);
impl_arity!(7 => A1, A2, A3, A4, A5, A6, A7);
impl_arity!(8 => A1, A2, A3, A4, A5, A6, A7, A8);

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_arity_matches_element_count() {
        assert_eq!(<()>::ARITY, 0);
        assert_eq!(<(u8,)>::ARITY, 1);
        assert_eq!(<(u8, String, bool)>::ARITY, 3);
    }

    #[test]
    fn descriptor_round_trips_through_json() {
        let descriptor = Descriptor::new("minify", 2);
        let json = serde_json::to_string(&descriptor).unwrap();
        let back: Descriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, descriptor);
    }
}
