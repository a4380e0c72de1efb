//! RPC request and response types.

mod create;
pub use create::*;

mod fund;
pub use fund::*;

mod settle;
pub use settle::*;

mod view;
pub use view::*;
