//! Bearer material issued by the identity provider.

pub mod pair;
pub mod secret;
