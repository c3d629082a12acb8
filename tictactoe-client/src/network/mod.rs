//! 网络通信模块
//!
//! 接收任务处理服务端消息，主任务读取控制台输入并发送命令

mod connection;

pub use connection::*;
