use game_core::{GameSession, WordList};
use game_types::{Player, RoomId, SocketId};

pub fn create_test_word_list() -> WordList {
    WordList::new("crane\nslate\nabout\nhouse\nworld\nplace\nround")
}

pub fn create_test_player(name: &str) -> Player {
    let mut player = Player::new(SocketId::new(), String::new());
    player.name = name.to_string();
    player
}

pub fn create_lobby(names: &[&str]) -> GameSession {
    let mut players = names.iter().map(|n| create_test_player(n));
    let mut session = GameSession::create(
        RoomId::from("0007"),
        players.next().expect("at least one player"),
    );
    for player in players {
        session.add_player(player).unwrap();
    }
    session
}
