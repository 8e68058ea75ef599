//! Core types and abstractions for the Lattice entity graph builder.
//!
//! This crate provides the error taxonomy, arena identifiers, and the
//! module-join configuration model shared by all Lattice components.

pub mod config;
pub mod error;
pub mod id;

pub use config::{
    ExtendsRelationship, JoinerAlias, JoinerExtends, JoinerRelationship, ModuleJoinerConfig,
    ModuleRegistry,
};
pub use error::{LatticeError, Result};
pub use id::EntityId;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        ExtendsRelationship, JoinerAlias, JoinerExtends, JoinerRelationship, ModuleJoinerConfig,
        ModuleRegistry,
    };
    pub use crate::error::{LatticeError, Result};
    pub use crate::id::EntityId;
}
