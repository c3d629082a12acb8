//! 服务器主逻辑
//!
//! 接受循环逐个接纳连接（持房间锁完成入座与开局广播），随后为每个入座的连接
//! 启动一个接收任务。接受循环本身不受任何一局结果影响。

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{debug, info, warn};

use protocol::{Connection, LineReader, Listener, TcpConnection};

use crate::game::Slot;
use crate::room::{Room, SessionFlow};

/// accept 失败后的退避时间
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// 游戏服务器
pub struct GameServer {
    room: Arc<Room<OwnedWriteHalf>>,
}

impl GameServer {
    pub fn new() -> Self {
        Self {
            room: Arc::new(Room::new()),
        }
    }

    /// 共享的房间
    pub fn room(&self) -> Arc<Room<OwnedWriteHalf>> {
        Arc::clone(&self.room)
    }

    /// 运行接受循环，不会返回
    pub async fn run<L>(&self, mut listener: L)
    where
        L: Listener<Conn = TcpConnection>,
    {
        loop {
            match listener.accept().await {
                Ok(conn) => self.admit(conn).await,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    /// 入座并启动接收任务；被拒绝的连接在此关闭
    async fn admit(&self, conn: TcpConnection) {
        let peer = conn.peer_addr().unwrap_or_else(|| "unknown".to_string());
        let (reader, writer) = conn.split();

        match self.room.admit(writer).await {
            Some(slot) => {
                info!(%peer, ?slot, "Connection accepted");
                tokio::spawn(serve_session(self.room(), slot, reader, peer));
            }
            None => info!(%peer, "Connection refused, room full"),
        }
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个座位的接收循环
///
/// 逐行解码并交给房间处理；读到流结束或读错误时按断线处理。
pub async fn serve_session<R, W>(room: Arc<Room<W>>, slot: Slot, mut reader: LineReader<R>, peer: String)
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    loop {
        match reader.read_line().await {
            Ok(line) => {
                debug!(%peer, ?slot, "<- {}", line);
                if room.handle_line(slot, &line).await == SessionFlow::Close {
                    info!(%peer, ?slot, "Player ended the session");
                    break;
                }
            }
            Err(e) => {
                info!(%peer, ?slot, "Disconnected: {}", e);
                room.depart(slot).await;
                break;
            }
        }
    }
}
