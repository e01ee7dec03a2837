pub mod commands;
pub mod ui;
pub mod util;

pub use commands::generate::GenerateArgs;
pub use util::CommandContext;
