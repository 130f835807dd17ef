pub mod call_log;
pub mod document;
pub mod enums;
pub mod event;

pub use call_log::*;
pub use document::*;
pub use enums::*;
pub use event::*;
