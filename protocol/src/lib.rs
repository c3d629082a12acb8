//! 井字棋（Jogo da Velha）共享协议库
//!
//! 包含:
//! - 棋盘、符号等核心数据结构
//! - 消息类型定义 (ClientMessage, ServerMessage) 与文本编解码
//! - 行分帧 (LineDecoder, LineReader, LineWriter)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 网络配置

mod board;
mod constants;
mod error;
mod framing;
mod message;
mod transport;

pub use board::{Board, Symbol, WINNING_LINES};
pub use constants::*;
pub use error::{GameError, ProtocolError, Result, SessionError};
pub use framing::{LineDecoder, LineReader, LineWriter, Lines};
pub use message::{ClientMessage, DecodedCommand, ServerMessage};
pub use transport::{
    Connection, Connector, Listener,
    TcpConnection, TcpConnector, TcpListener,
    NetworkConfig,
};
