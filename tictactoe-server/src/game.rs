//! 对局状态机
//!
//! `Match` 是单局的唯一状态来源：棋盘、回合、座位与生命周期。
//! 所有操作都把要发出的消息按顺序写入 `Outbox`，由房间在持锁期间统一发送。

use std::fmt::Display;

use protocol::{Board, GameError, ServerMessage, SessionError, Symbol, BOARD_CELLS, MAX_PLAYERS};

/// 座位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 0 号座位，执 X
    First,
    /// 1 号座位，执 O
    Second,
}

impl Slot {
    /// 按编号排列的全部座位
    pub const ALL: [Slot; MAX_PLAYERS] = [Slot::First, Slot::Second];

    /// 座位编号
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }

    /// 座位固定的符号
    pub fn symbol(self) -> Symbol {
        match self {
            Slot::First => Symbol::X,
            Slot::Second => Symbol::O,
        }
    }

    /// 对面的座位
    pub fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

/// 对局生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// 等待玩家
    WaitingForPlayers,
    /// 进行中
    InProgress,
    /// 已结束（不会再开始新局）
    Finished,
}

/// 消息接收方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// 单播
    Slot(Slot),
    /// 广播给当前在座的双方
    Both,
}

/// 一条待发送的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: Recipient,
    pub message: ServerMessage,
}

/// 待发送的消息，保持产生顺序
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单播
    pub fn unicast(&mut self, slot: Slot, message: ServerMessage) {
        self.deliveries.push(Delivery {
            to: Recipient::Slot(slot),
            message,
        });
    }

    /// 广播
    pub fn broadcast(&mut self, message: ServerMessage) {
        self.deliveries.push(Delivery {
            to: Recipient::Both,
            message,
        });
    }

    /// 向某座位单播 `ERR <reason>`
    pub fn reject(&mut self, slot: Slot, reason: impl Display) {
        self.unicast(slot, ServerMessage::Error(reason.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// 某座位将按序收到的消息
    pub fn messages_for(&self, slot: Slot) -> Vec<&ServerMessage> {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.to, Recipient::Both) || d.to == Recipient::Slot(slot))
            .map(|d| &d.message)
            .collect()
    }
}

impl IntoIterator for Outbox {
    type Item = Delivery;
    type IntoIter = std::vec::IntoIter<Delivery>;

    fn into_iter(self) -> Self::IntoIter {
        self.deliveries.into_iter()
    }
}

/// 单局对局
#[derive(Debug)]
pub struct Match {
    board: Board,
    current: Slot,
    phase: MatchPhase,
    seated: [bool; MAX_PLAYERS],
    /// 累计入座人数，离开不回退
    connected: usize,
}

impl Match {
    /// 创建新对局（等待玩家）
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            current: Slot::First,
            phase: MatchPhase::WaitingForPlayers,
            seated: [false; MAX_PLAYERS],
            connected: 0,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前走子的座位
    pub fn current(&self) -> Slot {
        self.current
    }

    pub fn connected(&self) -> usize {
        self.connected
    }

    pub fn is_seated(&self, slot: Slot) -> bool {
        self.seated[slot.index()]
    }

    /// 为新连接分配第一个空座位
    ///
    /// 已满或已结束时返回 `RoomFull`，状态不变。
    pub fn admit(&mut self, out: &mut Outbox) -> Result<Slot, SessionError> {
        if self.connected >= MAX_PLAYERS || self.phase == MatchPhase::Finished {
            return Err(SessionError::RoomFull);
        }
        let slot = Slot::ALL
            .into_iter()
            .find(|&s| !self.is_seated(s))
            .ok_or(SessionError::RoomFull)?;

        self.seated[slot.index()] = true;
        self.connected += 1;

        out.unicast(slot, ServerMessage::Assign(slot.symbol()));
        out.unicast(slot, ServerMessage::Waiting { connected: self.connected });

        if self.phase == MatchPhase::InProgress {
            out.unicast(slot, ServerMessage::Start);
            out.unicast(slot, ServerMessage::Board(self.board));
            out.unicast(slot, ServerMessage::Turn(self.current.symbol()));
        }

        self.start_if_ready(out);
        Ok(slot)
    }

    /// 双方到齐时开始对局，X 先走
    fn start_if_ready(&mut self, out: &mut Outbox) {
        if self.connected == MAX_PLAYERS && self.phase == MatchPhase::WaitingForPlayers {
            self.phase = MatchPhase::InProgress;
            self.current = Slot::First;
            out.broadcast(ServerMessage::Start);
            out.broadcast(ServerMessage::Board(self.board));
            out.broadcast(ServerMessage::Turn(self.current.symbol()));
        }
    }

    /// 执行走棋
    ///
    /// 校验顺序：未开始、已结束、非本方回合、位置越界、格子已占用。
    /// 被拒绝时状态不变，也不会写入任何消息。
    pub fn apply_move(&mut self, slot: Slot, position: i32, out: &mut Outbox) -> Result<(), GameError> {
        match self.phase {
            MatchPhase::WaitingForPlayers => return Err(GameError::NotStarted),
            MatchPhase::Finished => return Err(GameError::GameOver),
            MatchPhase::InProgress => {}
        }
        if slot != self.current {
            return Err(GameError::NotYourTurn);
        }
        let cell = usize::try_from(position)
            .ok()
            .filter(|&p| p < BOARD_CELLS)
            .ok_or(GameError::InvalidPosition { position })?;

        let symbol = slot.symbol();
        self.board.place(cell, symbol)?;

        out.broadcast(ServerMessage::MoveAccepted { position: cell });
        out.broadcast(ServerMessage::Board(self.board));

        if self.board.has_line(symbol) {
            self.phase = MatchPhase::Finished;
            out.broadcast(ServerMessage::Win(symbol));
            out.broadcast(ServerMessage::Bye);
            return Ok(());
        }
        if self.board.is_full() {
            self.phase = MatchPhase::Finished;
            out.broadcast(ServerMessage::Draw);
            out.broadcast(ServerMessage::Bye);
            return Ok(());
        }

        self.current = self.current.other();
        out.broadcast(ServerMessage::Turn(self.current.symbol()));
        Ok(())
    }

    /// 座位离开（主动 END 或断线）
    ///
    /// 对局未结束时立即结束并通知剩下的一方；座位不会被重新分配。
    pub fn depart(&mut self, slot: Slot, out: &mut Outbox) {
        self.seated[slot.index()] = false;
        if self.phase != MatchPhase::Finished {
            self.phase = MatchPhase::Finished;
            out.broadcast(ServerMessage::OpponentLeft);
            out.broadcast(ServerMessage::Bye);
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Match {
        let mut game = Match::new();
        let mut out = Outbox::new();
        game.admit(&mut out).unwrap();
        game.admit(&mut out).unwrap();
        game
    }

    fn play(game: &mut Match, moves: &[(Slot, i32)]) -> Outbox {
        let mut out = Outbox::new();
        for &(slot, position) in moves {
            game.apply_move(slot, position, &mut out).unwrap();
        }
        out
    }

    #[test]
    fn test_admit_assigns_slots_in_order() {
        let mut game = Match::new();

        let mut out = Outbox::new();
        assert_eq!(game.admit(&mut out), Ok(Slot::First));
        assert_eq!(
            out.messages_for(Slot::First),
            vec![
                &ServerMessage::Assign(Symbol::X),
                &ServerMessage::Waiting { connected: 1 },
            ]
        );
        assert_eq!(game.phase(), MatchPhase::WaitingForPlayers);

        let mut out = Outbox::new();
        assert_eq!(game.admit(&mut out), Ok(Slot::Second));
        assert_eq!(
            out.messages_for(Slot::Second),
            vec![
                &ServerMessage::Assign(Symbol::O),
                &ServerMessage::Waiting { connected: 2 },
                &ServerMessage::Start,
                &ServerMessage::Board(Board::empty()),
                &ServerMessage::Turn(Symbol::X),
            ]
        );
        // 先入座的一方只收到开局广播
        assert_eq!(
            out.messages_for(Slot::First),
            vec![
                &ServerMessage::Start,
                &ServerMessage::Board(Board::empty()),
                &ServerMessage::Turn(Symbol::X),
            ]
        );
        assert_eq!(game.phase(), MatchPhase::InProgress);
        assert_eq!(game.current(), Slot::First);
    }

    #[test]
    fn test_third_admission_is_rejected() {
        let mut game = started();
        let mut out = Outbox::new();
        assert_eq!(game.admit(&mut out), Err(SessionError::RoomFull));
        assert!(out.is_empty());
        assert_eq!(game.connected(), 2);
    }

    #[test]
    fn test_admission_after_finish_is_rejected() {
        let mut game = Match::new();
        let mut out = Outbox::new();
        game.admit(&mut out).unwrap();
        game.depart(Slot::First, &mut out);

        assert_eq!(game.phase(), MatchPhase::Finished);
        assert_eq!(game.admit(&mut Outbox::new()), Err(SessionError::RoomFull));
    }

    #[test]
    fn test_move_before_start() {
        let mut game = Match::new();
        game.admit(&mut Outbox::new()).unwrap();

        let mut out = Outbox::new();
        assert_eq!(
            game.apply_move(Slot::First, 0, &mut out),
            Err(GameError::NotStarted)
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_accepted_move_events() {
        let mut game = started();
        let out = play(&mut game, &[(Slot::First, 4)]);

        let mut board = Board::empty();
        board.place(4, Symbol::X).unwrap();
        assert_eq!(
            out.messages_for(Slot::Second),
            vec![
                &ServerMessage::MoveAccepted { position: 4 },
                &ServerMessage::Board(board),
                &ServerMessage::Turn(Symbol::O),
            ]
        );
        assert_eq!(game.current(), Slot::Second);
    }

    #[test]
    fn test_wrong_turn_never_mutates() {
        let mut game = started();
        let mut out = Outbox::new();

        assert_eq!(
            game.apply_move(Slot::Second, 0, &mut out),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(game.board(), &Board::empty());
        assert!(out.is_empty());

        play(&mut game, &[(Slot::First, 0)]);
        assert_eq!(
            game.apply_move(Slot::First, 1, &mut out),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(game.board().occupied(), 1);
    }

    #[test]
    fn test_position_out_of_range() {
        let mut game = started();
        let mut out = Outbox::new();
        for position in [-1, 9, 100, i32::MIN] {
            assert_eq!(
                game.apply_move(Slot::First, position, &mut out),
                Err(GameError::InvalidPosition { position })
            );
        }
        assert!(out.is_empty());
        assert_eq!(game.current(), Slot::First);
    }

    #[test]
    fn test_occupied_cell() {
        // 场景 A
        let mut game = started();
        play(&mut game, &[(Slot::First, 4)]);
        let before = *game.board();

        let mut out = Outbox::new();
        assert_eq!(
            game.apply_move(Slot::Second, 4, &mut out),
            Err(GameError::CellOccupied { position: 4 })
        );
        assert_eq!(game.board(), &before);
        assert_eq!(game.current(), Slot::Second);
        assert!(out.is_empty());
    }

    #[test]
    fn test_top_row_wins() {
        // 场景 B
        let mut game = started();
        let out = play(
            &mut game,
            &[
                (Slot::First, 0),
                (Slot::Second, 3),
                (Slot::First, 1),
                (Slot::Second, 4),
                (Slot::First, 2),
            ],
        );

        let messages = out.messages_for(Slot::Second);
        let tail = &messages[messages.len() - 2..];
        assert_eq!(tail, [&ServerMessage::Win(Symbol::X), &ServerMessage::Bye]);
        assert_eq!(game.phase(), MatchPhase::Finished);

        let mut out = Outbox::new();
        assert_eq!(
            game.apply_move(Slot::Second, 5, &mut out),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_full_board_draw() {
        // 场景 C：X O X / X O O / O X X
        let mut game = started();
        let out = play(
            &mut game,
            &[
                (Slot::First, 0),
                (Slot::Second, 1),
                (Slot::First, 2),
                (Slot::Second, 4),
                (Slot::First, 3),
                (Slot::Second, 5),
                (Slot::First, 7),
                (Slot::Second, 6),
                (Slot::First, 8),
            ],
        );

        let messages = out.messages_for(Slot::First);
        assert!(!messages.iter().any(|m| matches!(m, ServerMessage::Win(_))));
        let tail = &messages[messages.len() - 2..];
        assert_eq!(tail, [&ServerMessage::Draw, &ServerMessage::Bye]);
        assert!(game.board().is_full());
        assert_eq!(game.phase(), MatchPhase::Finished);
    }

    #[test]
    fn test_win_on_last_cell_is_not_a_draw() {
        // X O X / O X O / O X X，第 9 步 X 落 8 完成对角线
        let mut game = started();
        let out = play(
            &mut game,
            &[
                (Slot::First, 0),
                (Slot::Second, 1),
                (Slot::First, 2),
                (Slot::Second, 3),
                (Slot::First, 4),
                (Slot::Second, 5),
                (Slot::First, 7),
                (Slot::Second, 6),
            ],
        );
        assert!(!out.messages_for(Slot::First).iter().any(|m| m.is_terminal()));

        let out = play(&mut game, &[(Slot::First, 8)]);
        let messages = out.messages_for(Slot::First);
        assert!(game.board().is_full());
        assert!(!messages.contains(&&ServerMessage::Draw));
        assert_eq!(
            &messages[messages.len() - 2..],
            [&ServerMessage::Win(Symbol::X), &ServerMessage::Bye]
        );
    }

    #[test]
    fn test_departure_finishes_match() {
        // 场景 D
        let mut game = started();
        play(&mut game, &[(Slot::First, 0)]);

        let mut out = Outbox::new();
        game.depart(Slot::Second, &mut out);
        assert_eq!(
            out.messages_for(Slot::First),
            vec![&ServerMessage::OpponentLeft, &ServerMessage::Bye]
        );
        assert_eq!(game.phase(), MatchPhase::Finished);
        assert!(!game.is_seated(Slot::Second));

        let mut out = Outbox::new();
        assert_eq!(
            game.apply_move(Slot::First, 1, &mut out),
            Err(GameError::GameOver)
        );
        // 第二次离开不再广播
        game.depart(Slot::First, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_turn_alternates() {
        let mut game = started();
        let mut expected = Slot::First;
        for position in [4, 0, 8, 2, 6] {
            assert_eq!(game.current(), expected);
            play(&mut game, &[(expected, position)]);
            expected = expected.other();
        }
    }

    #[test]
    fn test_reject_is_unicast() {
        let mut out = Outbox::new();
        out.reject(Slot::Second, GameError::NotYourTurn);
        assert!(out.messages_for(Slot::First).is_empty());
        assert_eq!(
            out.messages_for(Slot::Second),
            vec![&ServerMessage::Error("Nao eh sua vez".to_string())]
        );
    }
}
