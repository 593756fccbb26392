/// Embed styling shared by rich replies.
pub mod embed;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '/';
/// Page arithmetic shared by the log store and the log API.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
