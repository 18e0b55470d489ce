pub mod aliases;
pub mod settings;
