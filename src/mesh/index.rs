//! Index types for mesh elements.
//!
//! Mesh elements cross-reference each other through stable `u32` indices
//! into the mesh's flat storage vectors rather than through pointers. Each
//! element kind gets its own newtype so a face index can never be handed to
//! a vertex lookup by accident. `u32::MAX` is reserved as the null sentinel;
//! a half-edge with an invalid twin is a boundary half-edge.

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_id {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if `index` collides with the sentinel.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} overflows u32 id", index);
                Self(index as u32)
            }

            /// Create the invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $label, self.0)
                } else {
                    write!(f, "{}(-)", $label)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_id!(VertexId, "V");
impl_id!(HalfEdgeId, "HE");
impl_id!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_and_invalid() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let none = HalfEdgeId::invalid();
        assert!(!none.is_valid());
        assert_eq!(FaceId::default(), FaceId::invalid());
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(7)), "V(7)");
        assert_eq!(format!("{:?}", HalfEdgeId::invalid()), "HE(-)");
    }

    #[test]
    fn ids_are_distinct_types() {
        // Same raw value, different types; only the raw index compares.
        let v = VertexId::new(3);
        let f = FaceId::new(3);
        assert_eq!(v.index(), f.index());
    }
}
