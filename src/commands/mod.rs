// commands/mod.rs - Command Module Registry
// This file declares all command modules and the General command group.
// The Help and Owner groups live next to their commands in help.rs and
// owner.rs.

pub mod echo; // Echo command for testing
pub mod help; // Reaction-paginated help system
pub mod owner; // Administrative commands (owner only)
pub mod ping; // Basic ping/pong functionality

use serenity::framework::standard::macros::group;

use echo::ECHO_COMMAND;
use ping::PING_COMMAND;

pub use help::HELP_GROUP;
pub use owner::OWNER_GROUP;

#[group]
#[commands(ping, echo)]
pub struct General;
