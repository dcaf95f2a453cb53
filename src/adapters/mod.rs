// Adapters layer: concrete implementations of the domain ports.

pub mod framework;
pub mod runtime;
pub mod session;

pub use framework::StaticAdapter;
pub use runtime::CatalogRuntime;
#[cfg(feature = "native")]
pub use runtime::NativeRuntime;
pub use session::MemorySession;
