//! Product catalog: public listing plus admin CRUD, persisted through the
//! key-value store.

pub mod model;
pub mod repository;
pub mod routes;

pub use model::{Product, ProductDraft, ProductPatch};
pub use repository::ProductCatalog;
pub use routes::{CatalogRouteState, catalog_routes};
