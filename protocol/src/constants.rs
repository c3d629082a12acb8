//! 协议常量定义

use std::time::Duration;

/// 棋盘格子数（3x3）
pub const BOARD_CELLS: usize = 9;

/// 棋盘边长
pub const BOARD_SIDE: usize = 3;

/// 单局玩家数
pub const MAX_PLAYERS: usize = 2;

/// 行缓冲区大小，单行最多承载 `MAX_LINE_SIZE - 1` 字节
pub const MAX_LINE_SIZE: usize = 1024;

/// 默认端口
pub const DEFAULT_PORT: u16 = 5000;

/// 服务端默认监听地址
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// 客户端默认连接地址
pub const DEFAULT_CLIENT_HOST: &str = "127.0.0.1";

/// 配置文件路径的环境变量名
pub const ENV_CONFIG: &str = "TICTACTOE_CONFIG";

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);
