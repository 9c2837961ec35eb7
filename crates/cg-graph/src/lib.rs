//! # cg-graph
//!
//! The neutral call-graph data model and the typed-AST provider boundary.
//!
//! This crate provides the core graph primitives (`CallGraph`, `Node`,
//! `Edge`, `Parameter`, the deterministic `NodeId` scheme), the narrow
//! `TypeProvider` trait standing in for the external typed-AST provider, and
//! its shipped Oxc-backed default implementation. It does not itself
//! resolve symbols, find entry points, or drive a traversal — that is
//! `cg-engine`'s job, built on top of the types here.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CallGraph                              │
//! │        (immutable once built; append-only during build)      │
//! └────────────────────┬──────────────────────────────────────--─┘
//!                      │
//!          ┌───────────┼───────────┐
//!          │           │           │
//!          ▼           ▼           ▼
//!    ┌─────────┐ ┌─────────┐ ┌──────────┐
//!    │  Node   │ │  Edge   │ │ NodeId   │
//!    └─────────┘ └─────────┘ └──────────┘
//!
//!    ┌─────────────────────────────────────┐
//!    │            TypeProvider             │
//!    │  (narrow trait; OxcTypeProvider is  │
//!    │   the shipped default impl)         │
//!    └─────────────────────────────────────┘
//! ```

pub mod chain;
pub mod graph;
pub mod oxc_provider;
pub mod provider;
#[cfg(test)]
mod property_tests;
pub mod serialization;

pub use chain::{CallChain, find_chain, find_chains};
pub use graph::{CallGraph, Edge, EdgeKind, GraphError, GraphMetadata, Node, NodeId, NodeKind, Parameter, Visibility};
pub use oxc_provider::OxcTypeProvider;
pub use provider::{CallSite, CallSiteKind, CallbackSite, Declaration, ProviderError, SourcePos, TypeProvider};
