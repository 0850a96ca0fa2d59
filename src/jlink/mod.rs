//! Runtime image generation with jlink

pub mod builder;
pub mod command;
pub mod layout;
pub mod module_info;

pub use builder::{RuntimeBuilder, BASE_MODULE};
pub use command::JlinkCommand;
pub use layout::PlatformLayout;
pub use module_info::parse_module_info;
