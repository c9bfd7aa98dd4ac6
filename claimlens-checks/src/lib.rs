//! ClaimLens verification checks
//!
//! Each check is an independent signal producer: it consumes the claim (and
//! whatever remote collaborators it is configured with) and emits one
//! [`claimlens_core::Signal`]. Checks never consult each other's output;
//! disagreement between them is expressed in the score, not resolved here.

pub mod hygiene;
pub mod idcheck;
pub mod merge;
pub mod official;
pub mod traits;

pub use hygiene::*;
pub use idcheck::*;
pub use merge::*;
pub use official::*;
pub use traits::*;
