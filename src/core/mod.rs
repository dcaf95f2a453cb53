pub mod catalog;
pub mod filesystem;
pub mod gettext;
pub mod translator;
pub mod view_compiler;

pub use crate::domain::model::{LocaleCategory, Message};
pub use crate::domain::ports::{FrameworkAdapter, SessionHandler, TextDomainRuntime};
pub use crate::utils::error::Result;
