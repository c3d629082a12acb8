//! 客户端会话
//!
//! 使用 protocol 库的传输层抽象，读写两端分别由接收任务与输入循环持有。

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, info, warn};

use protocol::{ClientMessage, Connector, LineReader, LineWriter, NetworkConfig, ServerMessage, TcpConnector};

use crate::game::{parse_input, InputAction, SharedView};

const CONNECTION_CLOSED: &str = "Conexao encerrada.";

/// 会话结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// 收到 BYE
    ServerBye,
    /// 连接断开或读写失败
    Disconnected,
    /// 玩家输入 END
    UserEnd,
    /// 控制台输入结束
    InputClosed,
}

/// 接收循环
///
/// 逐行解码服务端消息并更新共享状态，收到 BYE 或连接结束时返回。
/// 无法识别的行直接忽略。
pub async fn receive_loop<R, F>(mut reader: LineReader<R>, view: SharedView, mut emit: F) -> SessionEnd
where
    R: AsyncRead + Unpin + Send,
    F: FnMut(String) + Send,
{
    loop {
        let line = match reader.read_line().await {
            Ok(line) => line,
            Err(e) => {
                debug!("Receive ended: {}", e);
                emit(CONNECTION_CLOSED.to_string());
                return SessionEnd::Disconnected;
            }
        };

        let Some(msg) = ServerMessage::decode(&line) else {
            debug!("Ignoring unknown line: {}", line);
            continue;
        };

        let reaction = view.apply(&msg);
        for text in reaction.output {
            emit(text);
        }
        if reaction.exit {
            return SessionEnd::ServerBye;
        }
    }
}

/// 驱动一次会话
///
/// 接收任务在后台运行；主循环逐行读取输入，本地校验后发送。
/// 任一方结束即返回。
pub async fn drive<I, R, W, F>(
    input: I,
    reader: LineReader<R>,
    mut writer: LineWriter<W>,
    view: SharedView,
    mut emit: F,
) -> SessionEnd
where
    I: AsyncBufRead + Unpin,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
    F: FnMut(String) + Send + Clone + 'static,
{
    let mut receiver = tokio::spawn(receive_loop(reader, view.clone(), emit.clone()));
    let mut lines = input.lines();

    let end = loop {
        tokio::select! {
            joined = &mut receiver => {
                break joined.unwrap_or_else(|e| {
                    warn!("Receive task failed: {}", e);
                    SessionEnd::Disconnected
                });
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break SessionEnd::InputClosed,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break SessionEnd::InputClosed;
                    }
                };

                match parse_input(&line, view.snapshot()) {
                    InputAction::Send(msg) => {
                        if let Err(e) = writer.send(&msg).await {
                            warn!("Failed to send '{}': {}", msg, e);
                            emit(CONNECTION_CLOSED.to_string());
                            break SessionEnd::Disconnected;
                        }
                    }
                    InputAction::Quit => {
                        if let Err(e) = writer.send(&ClientMessage::End).await {
                            debug!("Failed to send END: {}", e);
                        }
                        break SessionEnd::UserEnd;
                    }
                    InputAction::Reject(text) => emit(text.to_string()),
                }
            }
        }
    };

    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown failed: {}", e);
    }
    receiver.abort();
    end
}

/// 连接服务器并在控制台上进行一局
pub async fn run(config: &NetworkConfig) -> anyhow::Result<SessionEnd> {
    let addr = config.addr();
    let conn = TcpConnector
        .connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    info!("Connected to server: {}", addr);

    let (reader, writer) = conn.split();
    let input = BufReader::new(tokio::io::stdin());
    let end = drive(input, reader, writer, SharedView::new(), |text| println!("{}", text)).await;
    info!(?end, "Session ended");

    Ok(end)
}
