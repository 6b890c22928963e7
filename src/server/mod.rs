//! Request pipeline integration for query param validation

pub mod middleware;

pub use middleware::{
    ExtensionPlacement, Placement, QueryParamLayer, QueryParamService, QueryParamValidator,
    create, validate_query,
};
