pub mod logs;
pub mod settings;
