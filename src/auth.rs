//! Identity-domain identifiers, secrets, credential pairs, and challenge states.

pub mod challenge;
pub mod id;
pub mod token;

pub use challenge::*;
pub use id::*;
pub use token::{pair::*, secret::*};
