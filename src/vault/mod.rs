pub mod archiver;
pub mod config;
pub mod cursor;
pub mod discovery;
pub mod paths;
pub mod registry;
pub mod source;
pub mod transcript;
pub mod util;
pub mod warn;
