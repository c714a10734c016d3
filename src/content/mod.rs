//! Content layer: everything between the mappers and the HTTP handlers.

pub mod alerts;
pub mod assembler;
pub mod definitions;
pub mod media;
pub mod navigation;
pub mod pagination;
pub mod save;
pub mod settings;
pub mod toolbox;

#[cfg(test)]
pub(crate) mod memory;
