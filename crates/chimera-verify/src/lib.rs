//! # chimera-verify
//!
//! Contract validation for the Chimera agent swarm.
//!
//! This crate provides [`engine::SchemaValidator`], which implements the
//! [`chimera_core::traits::ContractValidator`] trait for both task manifests
//! and task results. The planner gates every manifest through it before
//! publishing a batch, and the orchestrator gates every result through it
//! before applying a transition.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chimera_core::traits::ContractValidator;
//! use chimera_verify::engine::SchemaValidator;
//!
//! let validator = SchemaValidator::new()?;
//! let report = validator.validate_manifest(&manifest_json);
//! ```

pub mod engine;

pub use engine::SchemaValidator;
