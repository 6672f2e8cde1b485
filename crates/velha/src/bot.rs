//! A client that plays one match against a Velha server using the move
//! selector.

use rand::SeedableRng;
use rand::rngs::StdRng;
use velha_engine::{Difficulty, RandomSource, select_move};
use velha_protocol::{Codec, MatchState, MatchStatus, XmlCodec};
use velha_transport::{Connection, TcpLineConnection, TransportError};

use crate::{BotConfig, VelhaError};

/// Dials the server in `config`, plays one match and returns the final
/// status (`ganhou`, `perdeu`, `empate` or `wo`).
///
/// # Errors
/// Connection failures, an undecodable record, or the server closing the
/// stream before a final status ([`VelhaError::UnexpectedEof`]).
pub async fn play(config: &BotConfig) -> Result<MatchStatus, VelhaError> {
    let conn = TcpLineConnection::connect(config.server_addr.as_str()).await?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = play_on(&conn, &XmlCodec, config.difficulty, &mut rng).await;
    let _ = conn.close().await;
    result
}

/// Plays one match over an already open connection.
///
/// On every `jogue` record the bot picks a cell on the board it was sent,
/// for the mark it was sent, and answers with the same record plus the
/// chosen position. `aguarde` records are only logged.
pub async fn play_on<C, K, R>(
    conn: &C,
    codec: &K,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<MatchStatus, VelhaError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
    R: RandomSource + ?Sized,
{
    loop {
        let Some(line) = conn.recv().await? else {
            return Err(VelhaError::UnexpectedEof);
        };
        let record = codec.decode(&line)?;
        tracing::debug!(mark = %record.id, status = %record.status, board = %record.board, "record received");

        if record.status.is_terminal() {
            tracing::info!(mark = %record.id, status = %record.status, board = %record.board, "match finished");
            return Ok(record.status);
        }
        if record.status == MatchStatus::YourTurn {
            let Some(pos) = select_move(&record.board, record.id, difficulty, rng) else {
                return Err(VelhaError::NoLegalMove(record.board));
            };
            let reply =
                MatchState::new(record.id, MatchStatus::YourTurn, record.board).with_position(pos);
            tracing::debug!(mark = %record.id, pos, "sending move");
            conn.send(&codec.encode(&reply)?).await?;
        }
    }
}
