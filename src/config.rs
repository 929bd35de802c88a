// ABOUTME: Version and REPL constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const REPL_PROMPT: &str = "> ";
pub const REPL_HISTORY_FILE: &str = ".lango_history";
pub const REPL_QUIT_MESSAGE: &str = "Exiting...";
