//! Feature Catalogue
//!
//! An ISO 19110 feature catalogue held as a cyclic graph, and its projection
//! into tree-shaped documents.
//!
//! ## Features
//!
//! - **Arena Graph**: catalogues, feature types, associations, inheritance
//!   relations and property types in a petgraph arena with typed links
//! - **Reference Stubs**: repeat occurrences of identified nodes become
//!   identifier-only stubs, so cyclic graphs serialize to finite trees
//! - **Resolve-on-Read**: documents re-link into the original graph
//! - **Diagnostics**: cycle groups and nodes that need an identifier
//!
//! ## Example
//!
//! ```
//! use feature_catalogue::graph::CatalogueBuilder;
//! use feature_catalogue::model::{CatalogueBody, FeatureTypeBody};
//! use feature_catalogue::projection::project;
//!
//! let mut builder = CatalogueBuilder::new();
//! let fc = builder.catalogue("FC", CatalogueBody::new("Roads")).unwrap();
//! builder.feature_type("FT1", FeatureTypeBody::new("Road")).unwrap();
//! let graph = builder.build();
//!
//! let tree = project(&graph, fc).unwrap();
//! // The feature type's back-link to its catalogue is a stub
//! assert_eq!(tree.occurrences("FC"), (1, 1));
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod projection;

pub use checksum::Checksum;
pub use config::{CatalogueConfig, OutputFormat};
pub use error::{CatalogueError, MissingIdentifierReason, Result};
pub use graph::{CatalogueBuilder, CatalogueGraph, GraphFile, NodeIndex};
pub use model::{LinkKind, Node, NodeBody, NodeKind};
pub use projection::{
    project, resolve_document, Document, MissingIdentifierPolicy, ProjectedNode,
    ProjectionContext, ProjectionOptions,
};
