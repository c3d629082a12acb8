//! 棋盘状态

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_CELLS;
use crate::error::GameError;

/// 空格子在快照中的字符
const EMPTY_CHAR: char = '.';

/// 8 条获胜连线：3 行、3 列、2 条对角线
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// 先手
    X,
    /// 后手
    O,
}

impl Symbol {
    /// 线路上的字符
    pub fn as_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }

    /// 从字符解析
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Symbol::X),
            'O' => Some(Symbol::O),
            _ => None,
        }
    }

    /// 获取对方符号
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 棋盘
///
/// 9 个格子按行优先编号 0..8，只有被接受的走法写入的格子非空。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Option<Symbol>; BOARD_CELLS],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self::default()
    }

    /// 获取指定格子
    pub fn get(&self, position: usize) -> Option<Symbol> {
        self.cells.get(position).copied().flatten()
    }

    /// 落子；越界或已占用时不修改棋盘
    pub fn place(&mut self, position: usize, symbol: Symbol) -> Result<(), GameError> {
        let cell = self.cells.get_mut(position).ok_or(GameError::InvalidPosition {
            position: i32::try_from(position).unwrap_or(i32::MAX),
        })?;
        if cell.is_some() {
            return Err(GameError::CellOccupied { position });
        }
        *cell = Some(symbol);
        Ok(())
    }

    /// 检查某符号是否占满任一连线
    pub fn has_line(&self, symbol: Symbol) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(symbol)))
    }

    /// 获胜者（若有）
    pub fn winner(&self) -> Option<Symbol> {
        [Symbol::X, Symbol::O]
            .into_iter()
            .find(|&symbol| self.has_line(symbol))
    }

    /// 棋盘是否已满
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// 已落子数
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// 9 字符快照，'.' 表示空
    pub fn snapshot(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            let c = cell.map_or(EMPTY_CHAR, Symbol::as_char);
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ();

    /// 解析 9 字符快照
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::empty();
        let mut count = 0;
        for (i, c) in s.chars().enumerate() {
            if i >= BOARD_CELLS {
                return Err(());
            }
            board.cells[i] = match c {
                EMPTY_CHAR => None,
                other => Some(Symbol::from_char(other).ok_or(())?),
            };
            count += 1;
        }
        if count != BOARD_CELLS {
            return Err(());
        }
        Ok(board)
    }
}
