//! 房间（单局会话管理）
//!
//! 一把锁保护整个对局与两个座位的写端。状态修改与由此产生的发送都在持锁期间完成，
//! 因此任何一方看到的广播顺序与修改顺序一致。

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use protocol::{
    Board, ClientMessage, DecodedCommand, LineWriter, ServerMessage, SessionError, MAX_PLAYERS,
};

use crate::game::{Match, MatchPhase, Outbox, Recipient, Slot};

/// 处理一行命令后会话是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Close,
}

struct RoomInner<W> {
    game: Match,
    writers: [Option<LineWriter<W>>; MAX_PLAYERS],
}

impl<W: AsyncWrite + Unpin + Send> RoomInner<W> {
    /// 按顺序发送待发消息；单个座位写失败只记录日志
    async fn flush(&mut self, out: Outbox) {
        for delivery in out {
            match delivery.to {
                Recipient::Slot(slot) => self.write(slot, &delivery.message).await,
                Recipient::Both => {
                    for slot in Slot::ALL {
                        self.write(slot, &delivery.message).await;
                    }
                }
            }
        }
    }

    async fn write(&mut self, slot: Slot, message: &ServerMessage) {
        let Some(writer) = self.writers[slot.index()].as_mut() else {
            return;
        };
        debug!(?slot, "-> {}", message);
        if let Err(e) = writer.send(message).await {
            warn!(?slot, "Failed to send '{}': {}", message, e);
        }
    }

    /// 先关闭离开方的写端，再结束对局，离开方不会收到 OPP_LEFT
    async fn depart(&mut self, slot: Slot, out: &mut Outbox) {
        if let Some(mut writer) = self.writers[slot.index()].take() {
            if let Err(e) = writer.shutdown().await {
                debug!(?slot, "Shutdown after departure failed: {}", e);
            }
        }
        let was_finished = self.game.phase() == MatchPhase::Finished;
        self.game.depart(slot, out);
        if !was_finished {
            info!(?slot, "Player left, match finished");
        }
    }
}

/// 房间
///
/// 进程内只有一个房间、一局对局；结束后不再接受新玩家。
pub struct Room<W> {
    inner: Mutex<RoomInner<W>>,
}

impl<W: AsyncWrite + Unpin + Send> Room<W> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RoomInner {
                game: Match::new(),
                writers: [None, None],
            }),
        }
    }

    /// 接纳新连接
    ///
    /// 入座则返回座位；房间已满或对局已结束时发送 `ERR Sala cheia` 与 `BYE` 并关闭写端。
    pub async fn admit(&self, mut writer: LineWriter<W>) -> Option<Slot> {
        let mut inner = self.inner.lock().await;
        let mut out = Outbox::new();

        match inner.game.admit(&mut out) {
            Ok(slot) => {
                inner.writers[slot.index()] = Some(writer);
                info!(?slot, connected = inner.game.connected(), "Player seated");
                inner.flush(out).await;
                if inner.game.phase() == MatchPhase::InProgress {
                    info!("Match started");
                }
                Some(slot)
            }
            Err(err) => {
                warn!("Rejecting connection: {}", err);
                for message in [ServerMessage::Error(err.to_string()), ServerMessage::Bye] {
                    if let Err(e) = writer.send(&message).await {
                        debug!("Failed to send rejection: {}", e);
                        break;
                    }
                }
                if let Err(e) = writer.shutdown().await {
                    debug!("Shutdown of rejected connection failed: {}", e);
                }
                None
            }
        }
    }

    /// 处理某座位发来的一行
    pub async fn handle_line(&self, slot: Slot, line: &str) -> SessionFlow {
        let mut inner = self.inner.lock().await;
        let mut out = Outbox::new();

        let flow = match ClientMessage::decode(line) {
            DecodedCommand::Command(ClientMessage::Move { position }) => {
                match inner.game.apply_move(slot, position, &mut out) {
                    Ok(()) => {
                        if inner.game.phase() == MatchPhase::Finished {
                            let board = inner.game.board();
                            info!(
                                %board,
                                moves = board.occupied(),
                                winner = ?board.winner(),
                                "Match finished"
                            );
                        }
                    }
                    Err(err) => {
                        debug!(?slot, position, "Move rejected: {}", err);
                        out.reject(slot, err);
                    }
                }
                SessionFlow::Continue
            }
            DecodedCommand::Command(ClientMessage::End) => {
                inner.depart(slot, &mut out).await;
                SessionFlow::Close
            }
            DecodedCommand::BadArgument => {
                out.reject(slot, SessionError::InvalidArgument);
                SessionFlow::Continue
            }
            DecodedCommand::Unknown => {
                out.reject(slot, SessionError::UnknownCommand);
                SessionFlow::Continue
            }
        };

        inner.flush(out).await;
        flow
    }

    /// 座位断线
    pub async fn depart(&self, slot: Slot) {
        let mut inner = self.inner.lock().await;
        let mut out = Outbox::new();
        inner.depart(slot, &mut out).await;
        inner.flush(out).await;
    }

    pub async fn phase(&self) -> MatchPhase {
        self.inner.lock().await.game.phase()
    }

    pub async fn board(&self) -> Board {
        *self.inner.lock().await.game.board()
    }
}

impl<W: AsyncWrite + Unpin + Send> Default for Room<W> {
    fn default() -> Self {
        Self::new()
    }
}
