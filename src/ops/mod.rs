//! High-level operations.
//!
//! Each step of adding a service worker lives in its own module;
//! [`service_worker`] runs them in order.

pub mod bootstrap;
pub mod build_config;
pub mod dependency;
pub mod ngsw_config;
pub mod service_worker;

pub use bootstrap::{insert_registration, register_service_worker, BootstrapReport, RegistrationOutcome};
pub use build_config::{ngsw_config_path, patch_build_config, BuildConfigReport, NGSW_CONFIG_FILE};
pub use dependency::{add_worker_dependency, DependencyOutcome, DependencyReport};
pub use ngsw_config::{generate_ngsw_config, render_ngsw_config, ConfigOutcome, NgswConfigReport};
pub use service_worker::{
    add_service_worker, add_service_worker_staged, ServiceWorkerOptions, ServiceWorkerReport,
    StagedRun, DEFAULT_TARGET,
};
