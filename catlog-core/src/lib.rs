//! # catlog-core
//! Core of catlog - hierarchical categories, priorities, layouts and appenders.
//!
//! Categories are named with dotted paths and form a tree rooted at `root`.
//! A category without an explicit priority inherits the priority of its
//! nearest ancestor that has one, and the root always has one.

mod macros;

mod appender;
mod category;
mod config;
mod error;
mod event;
mod layout;
mod log_writer;
mod priority;
mod registry;
mod utils;

pub use appender::{Appender, FanoutAppender, WriterAppender};
pub use category::{Category, ROOT_NAME};
pub use config::{CATLOG_CONFIG, CatlogConfig, CatlogEnv, DefaultAppender};
pub use error::{Error, Result};
pub use event::{LocationInfo, LoggingEvent};
pub use layout::{BasicLayout, ColoredLayout, DatedLayout, Layout, LocatedLayout};
pub use log_writer::{LogFile, LogStderr, LogStdout, LogWriter};
pub use priority::Priority;
pub use registry::Registry;
pub use utils::{LoggerGuard, ThreadedAppender, spawn_log_thread};
