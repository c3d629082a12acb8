//! 行分帧
//!
//! 每条消息以单个 `\n` 结尾。`LineDecoder` 是不做 IO 的累积器，
//! `LineReader` / `LineWriter` 把它接到异步流上。

use std::fmt::Display;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::constants::MAX_LINE_SIZE;
use crate::error::{ProtocolError, Result};

/// 行解码器
///
/// 保存已收到但尚未构成完整行的字节（carry）。若累积了 `limit` 字节仍未见换行，
/// 这 `limit` 字节被强制作为一行输出，其后的字节开始新的一行。
///
/// 换行符也计入 `limit`：恰好 `limit` 字节的内容后跟 `\n` 时，内容先被强制输出，
/// 剩下的 `\n` 再产出一个空行。与固定长度行缓冲的行为一致。
#[derive(Debug)]
pub struct LineDecoder {
    carry: Vec<u8>,
    limit: usize,
}

impl LineDecoder {
    /// 使用默认缓冲区大小创建
    pub fn new() -> Self {
        Self::with_buffer_size(MAX_LINE_SIZE)
    }

    /// 指定缓冲区大小（含结尾占位，单行最多 `size - 1` 字节）
    pub fn with_buffer_size(size: usize) -> Self {
        let limit = size.saturating_sub(1).max(1);
        Self {
            carry: Vec::with_capacity(size),
            limit,
        }
    }

    /// 追加新读到的字节，返回惰性的行迭代器
    pub fn feed(&mut self, bytes: &[u8]) -> Lines<'_> {
        self.carry.extend_from_slice(bytes);
        Lines { decoder: self }
    }

    /// 取出下一行；需要更多数据时返回 `None`
    pub fn next_line(&mut self) -> Option<String> {
        let window = self.carry.len().min(self.limit);
        if let Some(i) = self.carry[..window].iter().position(|&b| b == b'\n') {
            let line = Self::to_line(&self.carry[..i]);
            self.carry.drain(..=i);
            return Some(line);
        }

        if self.carry.len() >= self.limit {
            debug!("Line exceeds {} bytes, flushing truncated", self.limit);
            let line = Self::to_line(&self.carry[..self.limit]);
            self.carry.drain(..self.limit);
            return Some(line);
        }

        None
    }

    /// 尚未成行的字节数
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    fn to_line(bytes: &[u8]) -> String {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// `LineDecoder::feed` 返回的行迭代器
pub struct Lines<'a> {
    decoder: &'a mut LineDecoder,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.decoder.next_line()
    }
}

/// 行读取器
pub struct LineReader<R> {
    reader: R,
    decoder: LineDecoder,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> LineReader<R> {
    /// 创建新的行读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: LineDecoder::new(),
            buffer: vec![0; MAX_LINE_SIZE],
        }
    }

    /// 读取下一行
    ///
    /// 读到 0 字节返回 `ConnectionClosed`，读错误返回 `Io`；两者之后不再产出行。
    pub async fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.decoder.next_line() {
                return Ok(line);
            }
            let n = self.reader.read(&mut self.buffer).await?;
            if n == 0 {
                if self.decoder.pending() > 0 {
                    debug!("Stream ended with {} bytes of partial line", self.decoder.pending());
                }
                return Err(ProtocolError::ConnectionClosed);
            }
            self.decoder.feed(&self.buffer[..n]);
        }
    }
}

/// 行写入器
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> LineWriter<W> {
    /// 创建新的行写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写入一行，保证恰好一个结尾换行
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// 编码并发送一条消息
    pub async fn send<M: Display + ?Sized>(&mut self, msg: &M) -> Result<()> {
        self.write_line(&msg.to_string()).await
    }

    /// 关闭写端
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
