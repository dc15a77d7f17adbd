//! console-common - 通用类型和工具库

pub mod id_list;
pub mod types;

pub use id_list::*;
pub use types::*;
