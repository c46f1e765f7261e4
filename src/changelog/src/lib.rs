pub mod db;
mod error;
mod reader;

pub use db::{ChangeEvent, ChangeLogConfig, DbClient, DbConfig, SslMode, Watermark};
pub use error::ChangeLogError;
pub use reader::{ChangeLogReader, ChangeSource};
