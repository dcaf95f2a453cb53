//! Binds gettext text domains for a web application, keeps the active locale
//! in the session and scaffolds `<locale>/LC_MESSAGES/<domain>.{po,mo}` trees.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CatalogRuntime, MemorySession, StaticAdapter};
#[cfg(feature = "native")]
pub use adapters::NativeRuntime;
pub use config::{DomainConfig, GettextConfig};
pub use core::catalog::{Catalog, MoCatalog};
pub use core::filesystem::{clear_directory, relative_path, FileSystem};
pub use core::gettext::Gettext;
pub use core::translator::Translator;
pub use domain::ports::{FrameworkAdapter, SessionHandler, TextDomainRuntime};
pub use utils::error::{GettextError, Result};
