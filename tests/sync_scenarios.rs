//! End-to-end sync between two peers, routed through the relay lobby over
//! the in-memory transport.

use glam::Vec2;

use twin_breakout::consts::*;
use twin_breakout::net::{LoopbackTransport, Outcome, Wire};
use twin_breakout::relay::{Delivery, Lobby, PlayerId};
use twin_breakout::sim::{Ball, Board, Phase, TickInput};
use twin_breakout::{ConnectionPhase, LocalGame, Peer, SyncEvent};

struct Player {
    id: PlayerId,
    peer: Peer<LoopbackTransport>,
    wire: Wire,
}

#[derive(Default)]
struct Table {
    lobby: Lobby,
    players: Vec<Player>,
}

impl Table {
    /// Two connected players, already paired
    fn paired() -> Self {
        let mut table = Table::default();
        table.seat();
        table.seat();
        table
    }

    fn seat(&mut self) -> usize {
        let id = self.players.len() as PlayerId + 1;
        let (transport, wire) = LoopbackTransport::new();
        let mut peer = Peer::new(transport);
        peer.connect();
        peer.handle_open();
        self.players.push(Player { id, peer, wire });

        let joined = self.lobby.join(id);
        self.deliver(joined);
        self.players.len() - 1
    }

    fn leave(&mut self, index: usize) {
        let id = self.players[index].id;
        self.players[index].peer.disconnect();
        let left = self.lobby.leave(id);
        self.deliver(left);
    }

    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let player = self
                .players
                .iter_mut()
                .find(|p| p.id == delivery.to)
                .expect("delivery to unknown player");
            player.peer.handle_message(&delivery.text);
        }
    }

    /// Push raw frames from `index` through the lobby
    fn route(&mut self, index: usize, frames: Vec<String>) {
        let from = self.players[index].id;
        let deliveries = frames
            .iter()
            .filter_map(|text| self.lobby.route(from, text))
            .collect();
        self.deliver(deliveries);
    }

    /// Route everything every player has sent so far
    fn pump(&mut self) {
        for index in 0..self.players.len() {
            let frames = self.players[index].wire.drain();
            self.route(index, frames);
        }
    }

    /// Ship events produced by a scripted board as if player `index` sent them
    fn send_from(&mut self, index: usize, events: &[SyncEvent]) {
        for event in events {
            assert!(self.players[index].peer.channel_mut().send(event));
        }
    }

    fn peer(&self, index: usize) -> &Peer<LoopbackTransport> {
        &self.players[index].peer
    }
}

fn scripted(ball: Ball, lives: u32) -> LocalGame {
    let mut board = Board::new();
    board.reset();
    board.ball = ball;
    board.lives = lives;
    LocalGame::from_board(board)
}

fn tier_counts(board: &Board) -> (usize, usize, usize) {
    let count = |hits| board.bricks.iter().filter(|b| b.hits == hits).count();
    (count(3), count(2), count(1))
}

#[test]
fn test_pairing_resets_both_panes_on_both_peers() {
    let mut table = Table::default();
    table.seat();
    assert_eq!(table.peer(0).session().connection(), ConnectionPhase::Waiting);
    assert_eq!(table.peer(0).session().local().phase(), Phase::Waiting);

    table.seat();
    for index in 0..2 {
        let session = table.peer(index).session();
        assert_eq!(session.connection(), ConnectionPhase::Paired);
        for board in [session.local().board(), session.mirror().board()] {
            assert_eq!(board.lives, START_LIVES);
            assert_eq!(board.phase, Phase::Playing);
            assert_eq!(board.bricks.len(), 40);
            assert_eq!(tier_counts(board), (8, 16, 16));
        }
    }
}

#[test]
fn test_paddle_moves_mirrored() {
    let mut table = Table::paired();
    for _ in 0..3 {
        table.players[0].peer.tick(&TickInput {
            left: false,
            right: true,
        });
    }
    table.pump();

    let local_x = table.peer(0).session().local().board().paddle.x;
    assert_eq!(local_x, PADDLE_START_X + 3.0 * PADDLE_STEP);
    assert_eq!(table.peer(1).session().mirror().board().paddle.x, local_x);
}

#[test]
fn test_three_hits_clear_top_row_brick_on_both_sides() {
    let mut table = Table::paired();

    // Ball bouncing between the top wall and brick 0 (row 0, col 0)
    let mut game = scripted(
        Ball {
            pos: Vec2::new(40.0, 10.0),
            vel: Vec2::new(0.0, 3.0),
            size: BALL_SIZE,
        },
        START_LIVES,
    );
    assert_eq!(game.board().bricks[0].hits, 3);

    let mut hits = Vec::new();
    for _ in 0..200 {
        let events = game.tick(&TickInput::default());
        table.send_from(0, &events);
        hits.extend(
            events
                .into_iter()
                .filter(|e| matches!(e, SyncEvent::BrickDestroyed { .. })),
        );
        if hits.len() == 3 {
            break;
        }
    }

    let expected = SyncEvent::BrickDestroyed {
        x: BRICK_MARGIN_X,
        y: BRICK_MARGIN_Y,
        id: Some(0),
    };
    assert_eq!(hits, vec![expected.clone(), expected.clone(), expected]);
    assert_eq!(game.board().brick_index_by_id(0), None);
    assert_eq!(game.board().bricks.len(), 39);

    table.pump();
    let mirror = table.peer(1).session().mirror().board();
    assert_eq!(mirror.brick_index_at(Vec2::new(BRICK_MARGIN_X, BRICK_MARGIN_Y)), None);
    assert_eq!(mirror.bricks.len(), 39);
    assert_eq!(tier_counts(mirror), (7, 16, 16));
}

#[test]
fn test_position_only_hits_from_older_peers() {
    let mut table = Table::paired();
    let frame = r#"{"type":"brickDestroyed","x":20,"y":30}"#.to_string();
    table.route(0, vec![frame.clone(), frame.clone(), frame]);

    let mirror = table.peer(1).session().mirror().board();
    assert_eq!(mirror.brick_index_by_id(0), None);
    assert_eq!(mirror.bricks.len(), 39);
}

#[test]
fn test_last_life_lost_emits_lives_then_game_over() {
    let mut table = Table::paired();
    let mut game = scripted(
        Ball {
            pos: Vec2::new(10.0, FIELD_HEIGHT - 1.0),
            vel: Vec2::new(3.0, 3.0),
            size: BALL_SIZE,
        },
        1,
    );

    let events = game.tick(&TickInput::default());
    assert_eq!(
        events,
        vec![
            SyncEvent::LivesUpdate { lives: 0 },
            SyncEvent::GameOver {
                state: Outcome::GameOver
            },
        ]
    );
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.lives(), 0);
    assert!(game.tick(&TickInput::default()).is_empty());

    table.send_from(0, &events);
    let frames = table.players[0].wire.drain();
    assert_eq!(
        frames,
        vec![
            r#"{"type":"livesUpdate","lives":0}"#.to_string(),
            r#"{"type":"gameOver","state":"gameover"}"#.to_string(),
        ]
    );
    table.route(0, frames);

    let mirror = table.peer(1).session().mirror();
    assert_eq!(mirror.lives(), 0);
    assert_eq!(mirror.phase(), Phase::GameOver);
}

#[test]
fn test_tolerance_miss_changes_nothing() {
    let mut table = Table::paired();
    let before = table.peer(1).session().mirror().board().bricks.clone();

    table.send_from(
        0,
        &[SyncEvent::BrickDestroyed {
            x: BRICK_MARGIN_X + BRICK_MATCH_TOLERANCE + 1.0,
            y: BRICK_MARGIN_Y,
            id: None,
        }],
    );
    table.pump();
    assert_eq!(table.peer(1).session().mirror().board().bricks, before);

    // Right at the edge of the tolerance still matches
    table.send_from(
        0,
        &[SyncEvent::BrickDestroyed {
            x: BRICK_MARGIN_X + BRICK_MATCH_TOLERANCE,
            y: BRICK_MARGIN_Y,
            id: None,
        }],
    );
    table.pump();
    assert_eq!(table.peer(1).session().mirror().board().bricks[0].hits, 2);
}

#[test]
fn test_replayed_hit_is_harmless() {
    let mut table = Table::paired();
    // Bottom-left brick, one hit
    let id = (BRICK_ROWS - 1) * BRICK_COLS;
    let pos = Vec2::new(BRICK_MARGIN_X, BRICK_MARGIN_Y + (BRICK_ROWS - 1) as f32 * BRICK_PITCH_Y);
    let hit = SyncEvent::BrickDestroyed {
        x: pos.x,
        y: pos.y,
        id: Some(id),
    };

    table.send_from(0, &[hit.clone(), hit]);
    table.pump();

    let mirror = table.peer(1).session().mirror().board();
    assert_eq!(mirror.bricks.len(), 39);
    assert_eq!(mirror.brick_index_by_id(id), None);
    assert_eq!(tier_counts(mirror), (8, 16, 15));
}

#[test]
fn test_mirror_lives_only_follow_lives_updates() {
    let mut table = Table::paired();
    for _ in 0..3000 {
        table.players[1].peer.tick(&TickInput::default());
    }
    assert_eq!(table.peer(1).session().mirror().lives(), START_LIVES);

    table.send_from(0, &[SyncEvent::LivesUpdate { lives: 2 }]);
    table.pump();
    assert_eq!(table.peer(1).session().mirror().lives(), 2);
}

#[test]
fn test_opponent_leaving_pauses_and_new_opponent_restarts() {
    let mut table = Table::paired();
    table.send_from(0, &[SyncEvent::LivesUpdate { lives: 1 }]);
    table.pump();

    table.leave(0);
    let session = table.peer(1).session();
    assert_eq!(session.connection(), ConnectionPhase::Waiting);
    assert_eq!(session.local().phase(), Phase::Waiting);
    assert_eq!(table.players[1].peer.tick(&TickInput { left: true, right: false }), 0);

    let newcomer = table.seat();
    assert!(table.peer(newcomer).session().is_paired());
    let session = table.peer(1).session();
    assert!(session.is_paired());
    assert_eq!(session.mirror().lives(), START_LIVES);
    assert_eq!(session.local().phase(), Phase::Playing);
}

#[test]
fn test_clients_cannot_fake_pairing_signals() {
    let mut table = Table::paired();
    table.route(0, vec![r#"{"type":"opponentDisconnected"}"#.to_string()]);
    assert!(table.peer(1).session().is_paired());
}

#[test]
fn test_disconnect_goes_quiet() {
    let mut table = Table::paired();
    table.players[0].peer.disconnect();
    assert_eq!(
        table.peer(0).session().connection(),
        ConnectionPhase::Disconnected
    );
    assert_eq!(table.players[0].peer.tick(&TickInput { left: true, right: false }), 0);
    assert!(table.players[0].wire.is_empty());
}
