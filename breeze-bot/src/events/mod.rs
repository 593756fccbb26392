pub mod text_commands;
