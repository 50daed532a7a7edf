//! SAML 2.0 types and data structures.
//!
//! Constants, metadata descriptors, and the protocol message representation
//! shared by the processing core and its collaborators.

mod constants;
mod message;
mod metadata;

pub use constants::*;
pub use message::*;
pub use metadata::*;
