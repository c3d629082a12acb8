//! 消息类型定义
//!
//! 线路格式：每行一条消息，动词与参数之间以单个空格分隔，动词区分大小写。
//! 编码由 `Display` 实现完成（不含换行，换行由 `LineWriter` 追加）。

use std::fmt;

use crate::board::{Board, Symbol};
use crate::constants::MAX_PLAYERS;

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// 走棋（位置由服务端校验范围）
    Move { position: i32 },
    /// 主动退出
    End,
}

/// 服务端对一行命令的解码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedCommand {
    /// 可识别的命令
    Command(ClientMessage),
    /// MOVE 的参数不是整数
    BadArgument,
    /// 未知动词
    Unknown,
}

impl ClientMessage {
    /// 解码一行命令，从不失败
    pub fn decode(line: &str) -> DecodedCommand {
        if let Some(arg) = line.strip_prefix("MOVE ") {
            return match parse_int(arg) {
                Some(position) => DecodedCommand::Command(ClientMessage::Move { position }),
                None => DecodedCommand::BadArgument,
            };
        }
        if line == "END" {
            return DecodedCommand::Command(ClientMessage::End);
        }
        DecodedCommand::Unknown
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Move { position } => write!(f, "MOVE {}", position),
            ClientMessage::End => write!(f, "END"),
        }
    }
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// 分配的固定符号
    Assign(Symbol),
    /// 已连接人数
    Waiting { connected: usize },
    /// 双方到齐，对局开始
    Start,
    /// 完整棋盘快照
    Board(Board),
    /// 轮到的符号
    Turn(Symbol),
    /// 走法被接受（双方都会收到）
    MoveAccepted { position: usize },
    /// 命令被拒绝
    Error(String),
    /// 获胜
    Win(Symbol),
    /// 和棋
    Draw,
    /// 对手离开
    OpponentLeft,
    /// 服务端即将结束本局
    Bye,
}

impl ServerMessage {
    /// 解码一行事件；无法识别的行返回 `None`，由调用方忽略
    pub fn decode(line: &str) -> Option<ServerMessage> {
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (line, None),
        };

        match (verb, arg) {
            ("ASSIGN", Some(arg)) => parse_symbol(arg).map(ServerMessage::Assign),
            ("WAITING", Some(arg)) => {
                let (connected, _) = arg.split_once('/')?;
                let connected = connected.parse().ok()?;
                Some(ServerMessage::Waiting { connected })
            }
            ("START", None) => Some(ServerMessage::Start),
            ("BOARD", Some(arg)) => arg.parse().ok().map(ServerMessage::Board),
            ("TURN", Some(arg)) => parse_symbol(arg).map(ServerMessage::Turn),
            ("OK", Some(arg)) => {
                let position = arg.strip_prefix("MOVE ")?.parse().ok()?;
                Some(ServerMessage::MoveAccepted { position })
            }
            ("ERR", reason) => Some(ServerMessage::Error(reason.unwrap_or_default().to_string())),
            ("WIN", Some(arg)) => parse_symbol(arg).map(ServerMessage::Win),
            ("DRAW", None) => Some(ServerMessage::Draw),
            ("OPP_LEFT", None) => Some(ServerMessage::OpponentLeft),
            ("BYE", None) => Some(ServerMessage::Bye),
            _ => None,
        }
    }

    /// 是否为终局消息（WIN / DRAW / OPP_LEFT）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ServerMessage::Win(_) | ServerMessage::Draw | ServerMessage::OpponentLeft
        )
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Assign(symbol) => write!(f, "ASSIGN {}", symbol),
            ServerMessage::Waiting { connected } => {
                write!(f, "WAITING {}/{}", connected, MAX_PLAYERS)
            }
            ServerMessage::Start => write!(f, "START"),
            ServerMessage::Board(board) => write!(f, "BOARD {}", board),
            ServerMessage::Turn(symbol) => write!(f, "TURN {}", symbol),
            ServerMessage::MoveAccepted { position } => write!(f, "OK MOVE {}", position),
            ServerMessage::Error(reason) => write!(f, "ERR {}", reason),
            ServerMessage::Win(symbol) => write!(f, "WIN {}", symbol),
            ServerMessage::Draw => write!(f, "DRAW"),
            ServerMessage::OpponentLeft => write!(f, "OPP_LEFT"),
            ServerMessage::Bye => write!(f, "BYE"),
        }
    }
}

/// 整数参数：允许前导空白与正负号，其余字符必须全部是数字
fn parse_int(arg: &str) -> Option<i32> {
    arg.trim_start().parse().ok()
}

/// 符号参数取第一个字符
fn parse_symbol(arg: &str) -> Option<Symbol> {
    arg.chars().next().and_then(Symbol::from_char)
}
