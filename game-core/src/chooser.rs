use game_types::{Game, SocketId};

/// Selection policy for who chooses the secret word each round.
pub trait ChooserStrategy: Send + Sync {
    /// Pick the next chooser, or `None` once every current player has had a
    /// turn (which ends the game).
    fn next_chooser(&self, game: &Game) -> Option<SocketId>;
}

/// Rotates through players in join order, skipping anyone who has already
/// chosen this game.
pub struct RoundRobinChooser;

impl ChooserStrategy for RoundRobinChooser {
    fn next_chooser(&self, game: &Game) -> Option<SocketId> {
        game.players
            .iter()
            .map(|p| p.socket_id)
            .find(|id| !game.past_choosers.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::{GameStatus, Player, RoomId};

    fn test_game(player_count: usize) -> Game {
        let players: Vec<Player> = (0..player_count)
            .map(|i| {
                let mut p = Player::new(SocketId::new(), String::new());
                p.name = format!("player{}", i);
                p
            })
            .collect();
        Game {
            room_id: RoomId::from("0000"),
            leader: players[0].socket_id,
            status: GameStatus::Lobby,
            chooser: None,
            current_answer: String::new(),
            speed_bonus_winner: None,
            past_choosers: Vec::new(),
            players,
        }
    }

    #[test]
    fn test_round_robin_never_repeats() {
        let mut game = test_game(3);
        let strategy = RoundRobinChooser;

        let mut seen = Vec::new();
        while let Some(next) = strategy.next_chooser(&game) {
            assert!(!seen.contains(&next));
            seen.push(next);
            game.past_choosers.push(next);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_round_robin_follows_join_order() {
        let game = test_game(4);
        let strategy = RoundRobinChooser;
        assert_eq!(
            strategy.next_chooser(&game),
            Some(game.players[0].socket_id)
        );
    }

    #[test]
    fn test_exhausted_rotation_yields_none() {
        let mut game = test_game(2);
        game.past_choosers = game.players.iter().map(|p| p.socket_id).collect();
        assert_eq!(RoundRobinChooser.next_chooser(&game), None);
    }
}
