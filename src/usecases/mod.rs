//! Application services. Orchestrate the domain over the store port.

pub mod admin_service;
pub mod deletion;
pub mod references;

pub use admin_service::AdminService;
pub use deletion::DeletionPlanner;
pub use references::ReferenceChecker;
