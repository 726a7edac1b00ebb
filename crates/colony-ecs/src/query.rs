//! Type lists for intersection queries.

use std::any::{TypeId, type_name};

/// A tuple of types used as a query filter, e.g. `(Position, Velocity)`.
///
/// Implemented for tuples of one to six `'static` types.
pub trait ComponentSet {
    fn type_ids() -> Vec<TypeId>;
    fn type_names() -> Vec<&'static str>;
}

macro_rules! impl_component_set {
    ($($t:ident),+) => {
        impl<$($t: 'static),+> ComponentSet for ($($t,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$t>()),+]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$t>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
