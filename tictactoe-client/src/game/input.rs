//! 控制台输入解析
//!
//! 走法在本地按已知状态先行校验，被拒绝的输入不会产生网络流量。

use protocol::{ClientMessage, BOARD_CELLS};

use super::state::ClientView;

const NOT_YOUR_TURN: &str = "Nao eh sua vez.";
const INVALID_POSITION: &str = "Posicao invalida. Use 0..8.";
const INVALID_COMMAND: &str = "Comando invalido. Use [0-8] para jogar ou END para sair.";

/// 一行输入对应的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// 发送命令
    Send(ClientMessage),
    /// 发送 END 并停止读取输入
    Quit,
    /// 本地拒绝，附带提示
    Reject(&'static str),
}

/// 解析一行输入
pub fn parse_input(line: &str, view: ClientView) -> InputAction {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.eq_ignore_ascii_case("END") {
        return InputAction::Quit;
    }

    let Ok(position) = line.trim_start().parse::<i64>() else {
        return InputAction::Reject(INVALID_COMMAND);
    };
    if !view.my_turn {
        return InputAction::Reject(NOT_YOUR_TURN);
    }
    match i32::try_from(position) {
        Ok(position) if (0..BOARD_CELLS as i32).contains(&position) => {
            InputAction::Send(ClientMessage::Move { position })
        }
        _ => InputAction::Reject(INVALID_POSITION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Symbol;

    fn my_turn() -> ClientView {
        ClientView {
            symbol: Some(Symbol::X),
            my_turn: true,
        }
    }

    #[test]
    fn test_valid_move() {
        assert_eq!(
            parse_input("4", my_turn()),
            InputAction::Send(ClientMessage::Move { position: 4 })
        );
        assert_eq!(
            parse_input("  0\r\n", my_turn()),
            InputAction::Send(ClientMessage::Move { position: 0 })
        );
    }

    #[test]
    fn test_end_is_case_insensitive() {
        for line in ["END", "end", "End\n"] {
            assert_eq!(parse_input(line, ClientView::default()), InputAction::Quit);
        }
    }

    #[test]
    fn test_not_my_turn_is_checked_first() {
        let view = ClientView {
            symbol: Some(Symbol::O),
            my_turn: false,
        };
        assert_eq!(parse_input("4", view), InputAction::Reject(NOT_YOUR_TURN));
        assert_eq!(parse_input("42", view), InputAction::Reject(NOT_YOUR_TURN));
    }

    #[test]
    fn test_out_of_range() {
        for line in ["9", "-1", "99999999999"] {
            assert_eq!(parse_input(line, my_turn()), InputAction::Reject(INVALID_POSITION));
        }
    }

    #[test]
    fn test_invalid_command() {
        for line in ["", "MOVE 4", "4a", "sair"] {
            assert_eq!(parse_input(line, my_turn()), InputAction::Reject(INVALID_COMMAND));
        }
    }
}
