//! 错误类型定义
//!
//! `GameError` 与 `SessionError` 的 Display 文本即为 `ERR` 行的原因文本。

use thiserror::Error;

/// 走棋规则错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// 对局尚未开始
    #[error("Partida ainda nao iniciou")]
    NotStarted,

    /// 对局已结束
    #[error("Partida encerrada")]
    GameOver,

    /// 不是你的回合
    #[error("Nao eh sua vez")]
    NotYourTurn,

    /// 位置超出 0..8
    #[error("Posicao invalida")]
    InvalidPosition { position: i32 },

    /// 格子已被占用
    #[error("Casa ocupada")]
    CellOccupied { position: usize },
}

/// 会话层拒绝原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// MOVE 参数无法解析
    #[error("Comando invalido")]
    InvalidArgument,

    /// 未知命令
    #[error("Comando desconhecido")]
    UnknownCommand,

    /// 房间已满或对局已结束
    #[error("Sala cheia")]
    RoomFull,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 无效地址
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
