//! Command implementations for the cmdpal CLI

pub mod exec;
pub mod list;

pub use exec::{run_exec, ExecArgs};
pub use list::{run_list, ListArgs};
