//! PO catalogs and their compiled MO form.

pub mod mo;
pub mod po;

pub use mo::MoCatalog;
pub use po::Catalog;
