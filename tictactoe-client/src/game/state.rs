//! 客户端对局状态
//!
//! 接收任务写，输入循环读；两者并发运行，共用一把锁。

use std::sync::{Arc, Mutex, PoisonError};

use protocol::{ServerMessage, Symbol};

use crate::board::render_board;

/// 本地已知的对局状态
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClientView {
    /// 服务端分配的符号
    pub symbol: Option<Symbol>,
    /// 是否轮到本方
    pub my_turn: bool,
}

/// 处理一条服务端消息的结果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    /// 要打印到控制台的文本
    pub output: Vec<String>,
    /// 收到 BYE，接收循环应结束
    pub exit: bool,
}

impl Reaction {
    fn say(text: impl Into<String>) -> Self {
        Self {
            output: vec![text.into()],
            exit: false,
        }
    }

    fn silent() -> Self {
        Self::default()
    }
}

/// 在接收任务与输入循环之间共享的状态
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    inner: Arc<Mutex<ClientView>>,
}

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> ClientView {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<T>(&self, f: impl FnOnce(&mut ClientView) -> T) -> T {
        let mut view = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }

    /// 根据服务端消息更新状态，返回要显示的文本
    pub fn apply(&self, msg: &ServerMessage) -> Reaction {
        // 对局结束后不再有本方回合
        if msg.is_terminal() {
            self.update(|view| view.my_turn = false);
        }

        match msg {
            ServerMessage::Assign(symbol) => {
                self.update(|view| view.symbol = Some(*symbol));
                Reaction::say(format!("Voce eh o jogador {}", symbol))
            }
            ServerMessage::Waiting { connected } => Reaction::say(format!(
                "Aguardando outro jogador... ({}/{})",
                connected,
                protocol::MAX_PLAYERS
            )),
            ServerMessage::Start => Reaction::say("Partida iniciada!"),
            ServerMessage::Board(board) => Reaction::say(render_board(board)),
            ServerMessage::Turn(turn) => {
                let (mine, symbol) = self.update(|view| {
                    view.my_turn = view.symbol == Some(*turn);
                    (view.my_turn, view.symbol)
                });
                match symbol {
                    Some(symbol) if mine => Reaction::say(format!(
                        "Sua vez ({}). Digite posicao [0-8] ou END para sair:",
                        symbol
                    )),
                    _ => Reaction::say(format!("Vez do oponente ({})...", turn)),
                }
            }
            ServerMessage::MoveAccepted { .. } => Reaction::silent(),
            ServerMessage::Error(reason) => Reaction::say(format!("Erro: {}", reason)),
            ServerMessage::Win(winner) => {
                if self.snapshot().symbol == Some(*winner) {
                    Reaction::say("Voce venceu!")
                } else {
                    Reaction::say("Voce perdeu.")
                }
            }
            ServerMessage::Draw => Reaction::say("Empate."),
            ServerMessage::OpponentLeft => Reaction::say("Oponente desconectou. Partida encerrada."),
            ServerMessage::Bye => Reaction {
                output: vec!["Servidor finalizou a partida.".to_string()],
                exit: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Board;

    #[test]
    fn test_assign_then_turn() {
        let view = SharedView::new();

        let reaction = view.apply(&ServerMessage::Assign(Symbol::O));
        assert_eq!(reaction.output, vec!["Voce eh o jogador O"]);
        assert_eq!(view.snapshot().symbol, Some(Symbol::O));

        let reaction = view.apply(&ServerMessage::Turn(Symbol::X));
        assert_eq!(reaction.output, vec!["Vez do oponente (X)..."]);
        assert!(!view.snapshot().my_turn);

        let reaction = view.apply(&ServerMessage::Turn(Symbol::O));
        assert_eq!(
            reaction.output,
            vec!["Sua vez (O). Digite posicao [0-8] ou END para sair:"]
        );
        assert!(view.snapshot().my_turn);
    }

    #[test]
    fn test_turn_before_assign_is_not_mine() {
        let view = SharedView::new();
        view.apply(&ServerMessage::Turn(Symbol::X));
        assert!(!view.snapshot().my_turn);
    }

    #[test]
    fn test_results() {
        let view = SharedView::new();
        view.apply(&ServerMessage::Assign(Symbol::X));
        view.apply(&ServerMessage::Turn(Symbol::X));

        assert_eq!(view.apply(&ServerMessage::Win(Symbol::X)).output, vec!["Voce venceu!"]);
        assert!(!view.snapshot().my_turn);
        assert_eq!(view.apply(&ServerMessage::Win(Symbol::O)).output, vec!["Voce perdeu."]);
        assert_eq!(view.apply(&ServerMessage::Draw).output, vec!["Empate."]);
    }

    #[test]
    fn test_opponent_left_ends_my_turn() {
        let view = SharedView::new();
        view.apply(&ServerMessage::Assign(Symbol::O));
        view.apply(&ServerMessage::Turn(Symbol::O));
        assert!(view.snapshot().my_turn);

        view.apply(&ServerMessage::OpponentLeft);
        assert!(!view.snapshot().my_turn);
        assert_eq!(view.snapshot().symbol, Some(Symbol::O));
    }

    #[test]
    fn test_bye_exits() {
        let view = SharedView::new();
        let reaction = view.apply(&ServerMessage::Bye);
        assert!(reaction.exit);

        assert!(!view.apply(&ServerMessage::OpponentLeft).exit);
        assert!(!view.apply(&ServerMessage::Board(Board::empty())).exit);
    }

    #[test]
    fn test_quiet_and_error_messages() {
        let view = SharedView::new();
        assert!(view.apply(&ServerMessage::MoveAccepted { position: 3 }).output.is_empty());
        assert_eq!(
            view.apply(&ServerMessage::Error("Casa ocupada".to_string())).output,
            vec!["Erro: Casa ocupada"]
        );
        assert_eq!(
            view.apply(&ServerMessage::Waiting { connected: 1 }).output,
            vec!["Aguardando outro jogador... (1/2)"]
        );
    }
}
