//! The match state machine.
//!
//! A [`Match`] owns everything one game needs: up to two player slots, the
//! turn pointer, and the rules engine. It reacts to three events:
//!
//! - [`on_connect`](Match::on_connect): seat a new connection
//! - [`on_message`](Match::on_message): a line arrived from a connection
//! - [`on_disconnect`](Match::on_disconnect): a connection went away
//!
//! Every reaction is written to an [`Outbox`]. Nothing here is async and
//! nothing here can fail loudly: bad input from a player turns into an
//! ordinary status message for that player.

use std::net::SocketAddr;

use velha_engine::{Board, EngineError, Mark, Outcome, RandomSource, Rules};
use velha_protocol::{Codec, MatchState, MatchStatus, ProtocolError};
use velha_transport::ConnectionId;

use crate::{MatchError, MatchPhase, Outbox};

/// A seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSlot {
    pub conn: ConnectionId,
    pub mark: Mark,
    /// Remote address, for logs only.
    pub addr: SocketAddr,
}

/// Why a move from the current player was not applied. Each case is
/// answered by prompting the player again.
#[derive(Debug, thiserror::Error)]
enum MoveRejected {
    #[error("undecodable message: {0}")]
    Undecodable(#[from] ProtocolError),

    #[error("message claims mark {claimed}, sender plays {actual}")]
    WrongMark { claimed: Mark, actual: Mark },

    #[error("message carries no position")]
    NoPosition,

    #[error("illegal move: {0}")]
    Illegal(#[from] EngineError),
}

/// One two-player match.
///
/// Generic over the codec (how records look on the wire) and the random
/// source (mark assignment and starting player), so tests can run it with
/// scripted draws.
pub struct Match<C: Codec, R: RandomSource> {
    codec: C,
    rng: R,
    rules: Rules,
    slots: Vec<PlayerSlot>,
    /// Index into `slots` of the player who moves next. `Some` exactly
    /// when two slots are taken.
    turn: Option<usize>,
}

impl<C: Codec, R: RandomSource> Match<C, R> {
    /// Creates an empty match.
    pub fn new(codec: C, rng: R) -> Self {
        Self {
            codec,
            rng,
            rules: Rules::new(),
            slots: Vec::with_capacity(2),
            turn: None,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        MatchPhase::from_slot_count(self.slots.len())
    }

    pub fn slots(&self) -> &[PlayerSlot] {
        &self.slots
    }

    /// The turn pointer: index into [`slots`](Self::slots).
    pub fn turn(&self) -> Option<usize> {
        self.turn
    }

    /// The slot allowed to move, if a game is running.
    pub fn current_player(&self) -> Option<&PlayerSlot> {
        self.turn.and_then(|i| self.slots.get(i))
    }

    pub fn board(&self) -> &Board {
        self.rules.board()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Seats `conn` and returns its mark.
    ///
    /// The first player gets a random mark and is told to wait. The second
    /// gets the other mark and is told to wait too; then a random one of
    /// the two is told to play.
    ///
    /// # Errors
    /// [`MatchError::MatchFull`] when two players are already seated. The
    /// connection is closed and nobody receives a message.
    pub fn on_connect<O: Outbox + ?Sized>(
        &mut self,
        conn: ConnectionId,
        addr: SocketAddr,
        out: &mut O,
    ) -> Result<Mark, MatchError> {
        if !self.phase().is_joinable() {
            tracing::warn!(%conn, %addr, "match is full, refusing connection");
            out.close(conn);
            return Err(MatchError::MatchFull(conn));
        }
        let mark = match self.slots.first() {
            Some(seated) => seated.mark.opponent(),
            None => Mark::ALL[self.rng.below(Mark::ALL.len())],
        };

        self.slots.push(PlayerSlot { conn, mark, addr });
        tracing::info!(%conn, %addr, %mark, players = self.slots.len(), "slot assigned");
        self.send_status(out, self.slots.len() - 1, MatchStatus::Waiting);

        if self.phase() == MatchPhase::Playing {
            let starter = self.rng.below(self.slots.len());
            self.turn = Some(starter);
            tracing::info!(
                first = %self.slots[starter].conn,
                mark = %self.slots[starter].mark,
                "match started"
            );
            self.send_status(out, starter, MatchStatus::YourTurn);
        }

        Ok(mark)
    }

    /// Handles one inbound line from `conn`.
    ///
    /// Out of turn: the sender is told to wait. From the current player: a
    /// line that does not decode, claims the wrong mark, has no position,
    /// or targets a bad cell is answered with another prompt. A legal move
    /// is applied and both players are told how the game stands; if it
    /// ended, both connections are closed and the match starts over empty.
    pub fn on_message<O: Outbox + ?Sized>(&mut self, conn: ConnectionId, text: &str, out: &mut O) {
        let Some(sender) = self.slot_index(conn) else {
            tracing::debug!(%conn, "message from unseated connection, ignoring");
            return;
        };
        let Some(turn) = self.turn else {
            tracing::debug!(%conn, phase = %self.phase(), "message outside a game, ignoring");
            return;
        };

        if sender != turn {
            if let Some(current) = self.current_player() {
                tracing::debug!(%conn, expected = %current.conn, "move out of turn");
            }
            self.send_status(out, sender, MatchStatus::Waiting);
            return;
        }

        let mark = self.slots[sender].mark;
        let outcome = match self.apply_move(mark, text) {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::debug!(%conn, %mark, %reason, line = text, "move rejected");
                self.send_status(out, sender, MatchStatus::YourTurn);
                return;
            }
        };

        let other = 1 - sender;
        self.turn = Some(other);

        let (mover_status, other_status) = match outcome {
            Outcome::InProgress => (MatchStatus::Waiting, MatchStatus::YourTurn),
            Outcome::Won(_) => (MatchStatus::Won, MatchStatus::Lost),
            Outcome::Draw => (MatchStatus::Draw, MatchStatus::Draw),
        };
        self.send_status(out, sender, mover_status);
        self.send_status(out, other, other_status);

        if outcome.is_over() {
            tracing::info!(board = %self.board(), ?outcome, "game over");
            let mover = self.slots[sender].conn;
            let opponent = self.slots[other].conn;
            out.close(mover);
            out.close(opponent);
            self.slots.clear();
            self.reset();
        }
    }

    /// Handles `conn` going away.
    ///
    /// During a game the remaining player is told the opponent left and is
    /// closed as well, leaving the match empty. Connections the match has
    /// already released (or never seated) are ignored.
    pub fn on_disconnect<O: Outbox + ?Sized>(&mut self, conn: ConnectionId, out: &mut O) {
        let Some(index) = self.slot_index(conn) else {
            tracing::debug!(%conn, "disconnect from unseated connection, ignoring");
            return;
        };

        let was_playing = self.phase() == MatchPhase::Playing;
        let leaver = self.slots.remove(index);
        tracing::info!(conn = %leaver.conn, mark = %leaver.mark, "player left");

        if was_playing {
            self.send_status(out, 0, MatchStatus::OpponentLeft);
            let remaining = self.slots.remove(0);
            out.close(remaining.conn);
            tracing::info!(conn = %remaining.conn, mark = %remaining.mark, "opponent left, match closed");
        }

        self.reset();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn slot_index(&self, conn: ConnectionId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.conn == conn)
    }

    /// Decodes and validates a move from `mark`, then plays it.
    fn apply_move(&mut self, mark: Mark, text: &str) -> Result<Outcome, MoveRejected> {
        let state = self.codec.decode(text)?;
        if state.id != mark {
            return Err(MoveRejected::WrongMark {
                claimed: state.id,
                actual: mark,
            });
        }
        let position = state.position.ok_or(MoveRejected::NoPosition)?;
        let outcome = self.rules.play(position, mark)?;
        tracing::info!(%mark, position, "move accepted");
        Ok(outcome)
    }

    /// Sends `status` to the slot at `index`, with that slot's mark and the
    /// current board.
    fn send_status<O: Outbox + ?Sized>(&self, out: &mut O, index: usize, status: MatchStatus) {
        let slot = &self.slots[index];
        let record = MatchState::new(slot.mark, status, *self.board());
        match self.codec.encode(&record) {
            Ok(line) => {
                tracing::debug!(conn = %slot.conn, %status, "sending status");
                out.send(slot.conn, &line);
            }
            Err(err) => {
                tracing::warn!(conn = %slot.conn, %status, error = %err, "failed to encode status");
            }
        }
    }

    /// Clears the board and the turn pointer.
    fn reset(&mut self) {
        self.rules.reset();
        self.turn = None;
    }
}

#[cfg(test)]
mod tests {
    use velha_engine::{Cell, ScriptedRandom};
    use velha_protocol::XmlCodec;

    use super::*;
    use crate::{OutboxEvent, RecordingOutbox};

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn addr() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 4000))
    }

    fn decode(line: &str) -> MatchState {
        XmlCodec.decode(line).unwrap()
    }

    /// Every status sent to `to`, in order.
    fn statuses(out: &RecordingOutbox, to: ConnectionId) -> Vec<MatchStatus> {
        out.sent_to(to).into_iter().map(|l| decode(l).status).collect()
    }

    fn move_line(mark: Mark, pos: usize) -> String {
        let record = MatchState::new(mark, MatchStatus::YourTurn, Board::new()).with_position(pos);
        XmlCodec.encode(&record).unwrap()
    }

    /// A match with two players seated. Draws: first mark X (0), starter
    /// slot 0 (0). So conn 1 plays X and moves first; conn 2 plays O.
    fn playing() -> (Match<XmlCodec, ScriptedRandom>, RecordingOutbox) {
        let mut game = Match::new(XmlCodec, ScriptedRandom::new([0, 0]));
        let mut out = RecordingOutbox::new();
        game.on_connect(conn(1), addr(), &mut out).unwrap();
        game.on_connect(conn(2), addr(), &mut out).unwrap();
        out.take();
        (game, out)
    }

    // =====================================================================
    // Connect
    // =====================================================================

    #[test]
    fn test_first_player_waits() {
        let mut game = Match::new(XmlCodec, ScriptedRandom::new([1]));
        let mut out = RecordingOutbox::new();

        let mark = game.on_connect(conn(1), addr(), &mut out).unwrap();
        assert_eq!(mark, Mark::O);
        assert_eq!(game.phase(), MatchPhase::Seeking);
        assert_eq!(game.turn(), None);

        let sent = out.sent_to(conn(1));
        assert_eq!(sent.len(), 1);
        let record = decode(sent[0]);
        assert_eq!(record.id, Mark::O);
        assert_eq!(record.status, MatchStatus::Waiting);
        assert_eq!(record.position, None);
        assert!(record.board.is_empty());
    }

    #[test]
    fn test_second_player_gets_opponent_mark_and_game_starts() {
        // First mark X, then slot 1 starts.
        let mut game = Match::new(XmlCodec, ScriptedRandom::new([0, 1]));
        let mut out = RecordingOutbox::new();

        assert_eq!(game.on_connect(conn(1), addr(), &mut out), Ok(Mark::X));
        assert_eq!(game.on_connect(conn(2), addr(), &mut out), Ok(Mark::O));
        assert_eq!(game.phase(), MatchPhase::Playing);
        assert_eq!(game.turn(), Some(1));
        assert_eq!(game.current_player().map(|s| s.conn), Some(conn(2)));

        assert_eq!(statuses(&out, conn(1)), [MatchStatus::Waiting]);
        assert_eq!(
            statuses(&out, conn(2)),
            [MatchStatus::Waiting, MatchStatus::YourTurn]
        );
        assert!(out.closed().is_empty());
    }

    #[test]
    fn test_third_connection_is_refused() {
        let (mut game, mut out) = playing();

        let result = game.on_connect(conn(3), addr(), &mut out);
        assert_eq!(result, Err(MatchError::MatchFull(conn(3))));
        assert_eq!(game.slots().len(), 2);
        assert_eq!(out.events(), [OutboxEvent::Closed(conn(3))]);
    }

    // =====================================================================
    // Moves
    // =====================================================================

    #[test]
    fn test_accepted_move_switches_turn() {
        let (mut game, mut out) = playing();

        game.on_message(conn(1), &move_line(Mark::X, 4), &mut out);
        assert_eq!(game.board().cell(4), Cell::X);
        assert_eq!(game.turn(), Some(1));

        let to_mover = decode(out.sent_to(conn(1))[0]);
        let to_other = decode(out.sent_to(conn(2))[0]);
        assert_eq!((to_mover.id, to_mover.status), (Mark::X, MatchStatus::Waiting));
        assert_eq!((to_other.id, to_other.status), (Mark::O, MatchStatus::YourTurn));
        assert_eq!(to_other.board.cell(4), Cell::X);
        assert_eq!(to_other.position, None);

        // Mover's message goes out first.
        assert!(matches!(&out.events()[0], OutboxEvent::Sent(c, _) if *c == conn(1)));
    }

    #[test]
    fn test_turn_alternates() {
        let (mut game, mut out) = playing();
        let moves = [(1, Mark::X, 0), (2, Mark::O, 4), (1, Mark::X, 8), (2, Mark::O, 2)];
        for (i, (id, mark, pos)) in moves.into_iter().enumerate() {
            assert_eq!(game.current_player().map(|s| s.conn), Some(conn(id)), "move {i}");
            game.on_message(conn(id), &move_line(mark, pos), &mut out);
        }
        assert_eq!(game.turn(), Some(0));
        assert_eq!(game.board().count(Mark::X), 2);
        assert_eq!(game.board().count(Mark::O), 2);
    }

    #[test]
    fn test_out_of_turn_sender_is_told_to_wait() {
        let (mut game, mut out) = playing();
        let before = *game.board();

        game.on_message(conn(2), &move_line(Mark::O, 4), &mut out);

        assert_eq!(out.events().len(), 1);
        assert_eq!(statuses(&out, conn(2)), [MatchStatus::Waiting]);
        assert_eq!(*game.board(), before);
        assert_eq!(game.turn(), Some(0));
    }

    #[test]
    fn test_invalid_moves_prompt_again() {
        let (mut game, mut out) = playing();
        game.on_message(conn(1), &move_line(Mark::X, 4), &mut out);
        game.on_message(conn(2), &move_line(Mark::O, 0), &mut out);
        out.take();

        let no_position = XmlCodec
            .encode(&MatchState::new(Mark::X, MatchStatus::YourTurn, Board::new()))
            .unwrap();
        let rejected = [
            "garbage".to_string(),
            move_line(Mark::O, 8), // wrong mark
            no_position,
            move_line(Mark::X, 4), // occupied
            move_line(Mark::X, 0), // occupied by the opponent
        ];
        let before = *game.board();
        for line in &rejected {
            game.on_message(conn(1), line, &mut out);
            assert_eq!(*game.board(), before, "{line}");
            assert_eq!(game.turn(), Some(0), "{line}");
        }

        assert_eq!(statuses(&out, conn(1)), vec![MatchStatus::YourTurn; rejected.len()]);
        assert!(out.sent_to(conn(2)).is_empty());
    }

    #[test]
    fn test_win_ends_match() {
        let (mut game, mut out) = playing();
        for (id, mark, pos) in [(1, Mark::X, 0), (2, Mark::O, 3), (1, Mark::X, 1), (2, Mark::O, 4)] {
            game.on_message(conn(id), &move_line(mark, pos), &mut out);
        }
        out.take();

        game.on_message(conn(1), &move_line(Mark::X, 2), &mut out);

        let to_winner = decode(out.sent_to(conn(1))[0]);
        let to_loser = decode(out.sent_to(conn(2))[0]);
        assert_eq!(to_winner.status, MatchStatus::Won);
        assert_eq!(to_loser.status, MatchStatus::Lost);
        assert_eq!(to_loser.board.winner(), Cell::X);
        assert_eq!(out.closed(), [conn(1), conn(2)]);

        assert_eq!(game.phase(), MatchPhase::Empty);
        assert_eq!(game.turn(), None);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_draw_ends_match() {
        // Final board: X O X / X O O / O X X
        let (mut game, mut out) = playing();
        let moves = [
            (1, Mark::X, 0),
            (2, Mark::O, 1),
            (1, Mark::X, 2),
            (2, Mark::O, 4),
            (1, Mark::X, 3),
            (2, Mark::O, 5),
            (1, Mark::X, 7),
            (2, Mark::O, 6),
        ];
        for (id, mark, pos) in moves {
            game.on_message(conn(id), &move_line(mark, pos), &mut out);
        }
        out.take();

        game.on_message(conn(1), &move_line(Mark::X, 8), &mut out);

        assert_eq!(statuses(&out, conn(1)), [MatchStatus::Draw]);
        assert_eq!(statuses(&out, conn(2)), [MatchStatus::Draw]);
        assert_eq!(out.closed(), [conn(1), conn(2)]);
        assert_eq!(game.phase(), MatchPhase::Empty);
    }

    #[test]
    fn test_messages_outside_a_game_are_ignored() {
        let mut game = Match::new(XmlCodec, ScriptedRandom::new([0]));
        let mut out = RecordingOutbox::new();
        game.on_connect(conn(1), addr(), &mut out).unwrap();
        out.take();

        game.on_message(conn(1), &move_line(Mark::X, 4), &mut out);
        game.on_message(conn(9), &move_line(Mark::X, 4), &mut out);

        assert!(out.is_empty());
        assert!(game.board().is_empty());
    }

    // =====================================================================
    // Disconnect
    // =====================================================================

    #[test]
    fn test_disconnect_during_game_notifies_and_closes_other() {
        let (mut game, mut out) = playing();
        game.on_message(conn(1), &move_line(Mark::X, 4), &mut out);
        out.take();

        game.on_disconnect(conn(1), &mut out);

        let notice = decode(out.sent_to(conn(2))[0]);
        assert_eq!(notice.id, Mark::O);
        assert_eq!(notice.status, MatchStatus::OpponentLeft);
        assert_eq!(out.closed(), [conn(2)]);
        assert!(out.sent_to(conn(1)).is_empty());

        assert_eq!(game.phase(), MatchPhase::Empty);
        assert_eq!(game.turn(), None);
        assert!(game.board().is_empty());

        // The remaining player's own disconnect arrives later and is a no-op.
        out.take();
        game.on_disconnect(conn(2), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_disconnect_while_seeking_is_silent() {
        let mut game = Match::new(XmlCodec, ScriptedRandom::new([0]));
        let mut out = RecordingOutbox::new();
        game.on_connect(conn(1), addr(), &mut out).unwrap();
        out.take();

        game.on_disconnect(conn(1), &mut out);
        assert!(out.is_empty());
        assert_eq!(game.phase(), MatchPhase::Empty);
    }

    #[test]
    fn test_unknown_disconnect_is_ignored() {
        let (mut game, mut out) = playing();
        game.on_disconnect(conn(42), &mut out);
        assert!(out.is_empty());
        assert_eq!(game.phase(), MatchPhase::Playing);
    }

    #[test]
    fn test_match_is_reusable_after_game_over() {
        let (mut game, mut out) = playing();
        game.on_disconnect(conn(2), &mut out);
        assert_eq!(game.phase(), MatchPhase::Empty);

        // Script is exhausted: draws are 0, so the newcomer plays X.
        assert_eq!(game.on_connect(conn(3), addr(), &mut out), Ok(Mark::X));
        assert_eq!(game.on_connect(conn(4), addr(), &mut out), Ok(Mark::O));
        assert_eq!(game.phase(), MatchPhase::Playing);
    }
}
