//! 井字棋客户端
//!
//! 控制台客户端：渲染棋盘、校验输入并与服务端交换文本行命令

pub mod board;
pub mod game;
pub mod network;

pub use board::render_board;
pub use game::{parse_input, ClientView, InputAction, Reaction, SharedView};
pub use network::{drive, receive_loop, run, SessionEnd};
