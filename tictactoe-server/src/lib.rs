//! 井字棋服务端
//!
//! 包含:
//! - 对局状态机
//! - 单房间会话管理
//! - 接受循环与接收任务

pub mod game;
pub mod room;
pub mod server;

pub use game::{Delivery, Match, MatchPhase, Outbox, Recipient, Slot};
pub use room::{Room, SessionFlow};
pub use server::{serve_session, GameServer};
