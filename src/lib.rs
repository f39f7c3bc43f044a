//! fabrica-core: domain model and referential-integrity layer for a
//! beverage-factory admin back office, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
