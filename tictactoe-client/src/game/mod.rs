//! 客户端对局状态与输入

mod input;
mod state;

pub use input::{parse_input, InputAction};
pub use state::{ClientView, Reaction, SharedView};
