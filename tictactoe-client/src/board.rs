//! 控制台棋盘渲染

use protocol::{Board, BOARD_CELLS, BOARD_SIDE};

/// 渲染 3x3 棋盘与位置提示
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("\nTabuleiro:\n");
    for i in 0..BOARD_CELLS {
        let c = board.get(i).map_or(' ', |s| s.as_char());
        out.push(' ');
        out.push(c);
        out.push(' ');
        if i % BOARD_SIDE != BOARD_SIDE - 1 {
            out.push('|');
        } else if i != BOARD_CELLS - 1 {
            out.push_str("\n---+---+---\n");
        }
    }
    out.push_str("\n\nPosicoes: 0 1 2 / 3 4 5 / 6 7 8");
    out
}
