//! Public extension contracts.
//!
//! The admin APIs behind sign-in and user creation must be signed with the caller's cloud
//! credentials. The crate exposes the signing hook as a trait so services can plug in the
//! signer their platform already provides.

pub mod request_signer;

pub use request_signer::*;
