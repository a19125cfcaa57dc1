//! Backend pools and weighted round-robin selection.

mod rotor;
mod router;

pub use rotor::{Backend, RotorError, Selection, WeightedRotor};
pub use router::{PoolRouter, RouteError};
