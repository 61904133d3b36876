mod config;
mod diagnostic;
mod error;
mod grouping;
mod instance;
mod merge;
mod net;
mod pin;
mod pinmap;
mod scene;
mod session;
mod split;

pub mod geometry;
pub mod point;
pub mod record;

pub use config::*;
pub use diagnostic::*;
pub use error::ErrorKind;
pub use grouping::*;
pub use instance::*;
pub use merge::{merge_nets, Merged};
pub use net::{NameStrength, Net, NetId};
pub use pin::*;
pub use pinmap::*;
pub use scene::*;
pub use session::Session;
pub use split::*;
