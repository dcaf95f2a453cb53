//! Implementations of [`TextDomainRuntime`](crate::domain::ports::TextDomainRuntime).

pub mod catalog;
#[cfg(feature = "native")]
pub mod native;

pub use catalog::CatalogRuntime;
#[cfg(feature = "native")]
pub use native::NativeRuntime;
