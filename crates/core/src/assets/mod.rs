//! Assets module - domain models and identity resolution.

mod assets_model;
mod identity_resolver;

pub use assets_model::{Asset, InstrumentKind, SchemeMeta};
pub use identity_resolver::{
    is_valid_isin, normalize_isin, resolve_identity, IDENTITY_DELIMITER,
};
