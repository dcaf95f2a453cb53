// Domain layer: core models and ports (interfaces) to the host framework and gettext.

pub mod model;
pub mod ports;
