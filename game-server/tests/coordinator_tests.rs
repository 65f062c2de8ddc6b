mod test_helpers;

use game_store::SessionStore;
use game_types::{
    GameStatus, JoinOutcome, LetterStatus, PlayerStatus, RoomId, ServerMessage,
};
use test_helpers::*;

#[tokio::test]
async fn test_new_game_allocates_a_room_and_broadcasts_lobby() {
    let setup = TestSetup::new().await;
    let (alice, mut rx) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();

    let messages = drain(&mut rx);
    let room_id = created_room(&messages);
    let state = last_state(&messages);
    assert_eq!(state.room_id, room_id);
    assert_eq!(state.status, GameStatus::Lobby);
    assert_eq!(state.leader, alice);
    assert_eq!(state.players.len(), 1);
}

#[tokio::test]
async fn test_join_missing_room_reports_does_not_exist() {
    let setup = TestSetup::new().await;
    let (alice, mut rx) = setup.connect().await;

    setup
        .coordinator
        .request_join_game(alice, RoomId::from("9999"))
        .await
        .unwrap();

    let messages = drain(&mut rx);
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::JoinResult {
            outcome: JoinOutcome::DoesNotExist
        }
    )));
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::GameDoesNotExist)));
}

#[tokio::test]
async fn test_join_full_room_reports_full() {
    let setup = TestSetup::new().await;
    let (leader, _rx) = setup.connect().await;
    setup.coordinator.request_new_game(leader).await.unwrap();
    let room_id = setup
        .store
        .get_player(leader)
        .await
        .unwrap()
        .room_id
        .unwrap();

    for _ in 0..5 {
        let (joiner, _rx) = setup.connect().await;
        setup
            .coordinator
            .request_join_game(joiner, room_id.clone())
            .await
            .unwrap();
    }

    let (late, mut rx) = setup.connect().await;
    setup
        .coordinator
        .request_join_game(late, room_id)
        .await
        .unwrap();
    let messages = drain(&mut rx);
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::JoinResult {
            outcome: JoinOutcome::Full
        }
    )));
}

#[tokio::test]
async fn test_pool_exhaustion_reports_no_rooms() {
    let setup = TestSetup::with_pool_size(1).await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    setup.coordinator.request_new_game(bob).await.unwrap();

    let messages = drain(&mut rx_b);
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::NoRoomsAvailable)));
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    let room_id = setup
        .store
        .get_player(alice)
        .await
        .unwrap()
        .room_id
        .unwrap();
    setup
        .coordinator
        .request_join_game(bob, room_id)
        .await
        .unwrap();

    setup
        .coordinator
        .declare_name(alice, "Morgan".to_string())
        .await
        .unwrap();
    setup
        .coordinator
        .declare_name(bob, "morgan".to_string())
        .await
        .unwrap();

    let messages = drain(&mut rx_b);
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::NameResult {
            accepted: false,
            duplicate: true
        }
    )));
}

#[tokio::test]
async fn test_begin_game_is_leader_only() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    let room_id = setup
        .store
        .get_player(alice)
        .await
        .unwrap()
        .room_id
        .unwrap();
    setup
        .coordinator
        .request_join_game(bob, room_id)
        .await
        .unwrap();
    setup
        .coordinator
        .declare_name(alice, "alice".to_string())
        .await
        .unwrap();
    setup
        .coordinator
        .declare_name(bob, "bob".to_string())
        .await
        .unwrap();
    drain(&mut rx_b);

    // Non-leader request: silently ignored, no broadcast, no transition.
    setup.coordinator.request_begin_game(bob).await.unwrap();
    let messages = drain(&mut rx_b);
    assert!(messages.is_empty());

    setup.coordinator.request_begin_game(alice).await.unwrap();
    let messages = drain(&mut rx_b);
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::BeginGame)));
    let state = last_state(&messages);
    assert_eq!(state.status, GameStatus::Choosing);
    assert!(state.chooser.is_some());
}

#[tokio::test]
async fn test_begin_game_requires_names() {
    let setup = TestSetup::new().await;
    let (alice, mut rx_a) = setup.connect().await;
    let (bob, _rx_b) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    let room_id = setup
        .store
        .get_player(alice)
        .await
        .unwrap()
        .room_id
        .unwrap();
    setup
        .coordinator
        .request_join_game(bob, room_id)
        .await
        .unwrap();
    setup
        .coordinator
        .declare_name(alice, "alice".to_string())
        .await
        .unwrap();
    drain(&mut rx_a);

    // Bob has no name yet; the start predicate fails and nothing moves.
    setup.coordinator.request_begin_game(alice).await.unwrap();
    assert!(drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_word_check_is_pure_validation() {
    let setup = TestSetup::new().await;
    let (alice, mut rx) = setup.connect().await;

    setup
        .coordinator
        .check_chosen_word_valid(alice, "crane".to_string())
        .await
        .unwrap();
    setup
        .coordinator
        .check_chosen_word_valid(alice, "zzzzz".to_string())
        .await
        .unwrap();

    let messages = drain(&mut rx);
    let results: Vec<bool> = messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::WordCheckResult { valid } => Some(*valid),
            _ => None,
        })
        .collect();
    assert_eq!(results, vec![true, false]);
}

#[tokio::test]
async fn test_full_round_end_to_end() {
    let setup = TestSetup::new().await;
    let (alice, mut rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    let _room = setup
        .setup_started_game(alice, &[(bob, "bob")], "alice")
        .await;

    // Leader connected first, so round-robin makes alice the chooser.
    drain(&mut rx_a);
    let state = last_state(&drain(&mut rx_b));
    assert_eq!(state.status, GameStatus::Choosing);
    assert_eq!(state.chooser, Some(alice));

    // The chooser locks in a dictionary word; play begins.
    setup
        .coordinator
        .choose_word(alice, "CRANE".to_string())
        .await
        .unwrap();
    let state = last_state(&drain(&mut rx_b));
    assert_eq!(state.status, GameStatus::Playing);

    // The guesser nails it on the first try.
    setup
        .coordinator
        .guess(bob, "crane".to_string())
        .await
        .unwrap();
    let messages = drain(&mut rx_b);
    let response = find_evaluation(&messages).expect("guesser gets an evaluation");
    assert!(response.accepted);
    assert!(response.correct);
    assert_eq!(
        response.result_by_position.unwrap(),
        vec![LetterStatus::Hit; 5]
    );

    // Round over: back to choosing with the rotation advanced to bob, and
    // per-round state reset.
    let state = last_state(&messages);
    assert_eq!(state.status, GameStatus::Choosing);
    assert_eq!(state.chooser, Some(bob));
    assert!(state.speed_bonus_winner.is_none());
    for player in &state.players {
        assert_eq!(player.status, PlayerStatus::Playing);
        assert!(player.guess_result_history.is_empty());
    }

    // Solving first guess banked efficiency points plus the speed bonus.
    let bob_state = state.players.iter().find(|p| p.socket_id == bob).unwrap();
    assert_eq!(bob_state.score, 60);
}

#[tokio::test]
async fn test_unaccepted_guess_performs_no_color_computation() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup
        .setup_started_game(alice, &[(bob, "bob")], "alice")
        .await;
    setup
        .coordinator
        .choose_word(alice, "crane".to_string())
        .await
        .unwrap();
    drain(&mut rx_b);

    setup
        .coordinator
        .guess(bob, "zzzzz".to_string())
        .await
        .unwrap();

    let messages = drain(&mut rx_b);
    let response = find_evaluation(&messages).unwrap();
    assert!(!response.accepted);
    assert!(response.result_by_position.is_none());
    assert!(response.result_by_letter.is_none());
    // A rejected guess never mutates state, so nothing is broadcast.
    assert!(!messages
        .iter()
        .any(|m| matches!(m, ServerMessage::UpdateGameState { .. })));
}

#[tokio::test]
async fn test_chooser_guess_is_silently_ignored() {
    let setup = TestSetup::new().await;
    let (alice, mut rx_a) = setup.connect().await;
    let (bob, _rx_b) = setup.connect().await;

    setup
        .setup_started_game(alice, &[(bob, "bob")], "alice")
        .await;
    setup
        .coordinator
        .choose_word(alice, "crane".to_string())
        .await
        .unwrap();
    drain(&mut rx_a);

    setup
        .coordinator
        .guess(alice, "slate".to_string())
        .await
        .unwrap();
    assert!(drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_invalid_chosen_word_changes_nothing() {
    let setup = TestSetup::new().await;
    let (alice, mut rx_a) = setup.connect().await;
    let (bob, _rx_b) = setup.connect().await;

    let room_id = setup
        .setup_started_game(alice, &[(bob, "bob")], "alice")
        .await;
    drain(&mut rx_a);

    setup
        .coordinator
        .choose_word(alice, "zzzzz".to_string())
        .await
        .unwrap();

    assert!(drain(&mut rx_a).is_empty());
    let record = setup.store.get_game(&room_id).await.unwrap().unwrap();
    assert_eq!(record.status, GameStatus::Choosing);
    assert!(record.current_answer.is_empty());
}

#[tokio::test]
async fn test_leader_disconnect_promotes_a_remaining_player() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    let room_id = setup
        .store
        .get_player(alice)
        .await
        .unwrap()
        .room_id
        .unwrap();
    setup
        .coordinator
        .request_join_game(bob, room_id)
        .await
        .unwrap();
    drain(&mut rx_b);

    setup.coordinator.handle_disconnect(alice).await.unwrap();

    let state = last_state(&drain(&mut rx_b));
    assert_eq!(state.leader, bob);
    assert_eq!(state.players.len(), 1);
    // The departed player's record is gone.
    assert!(setup.store.get_player(alice).await.is_err());
}

#[tokio::test]
async fn test_last_disconnect_returns_the_room_to_the_pool() {
    let setup = TestSetup::with_pool_size(1).await;
    let (alice, _rx_a) = setup.connect().await;

    setup.coordinator.request_new_game(alice).await.unwrap();
    let room_id = setup
        .store
        .get_player(alice)
        .await
        .unwrap()
        .room_id
        .unwrap();
    setup.coordinator.handle_disconnect(alice).await.unwrap();

    assert!(setup.store.get_game(&room_id).await.unwrap().is_none());

    // The single id is allocatable again.
    let (carol, mut rx_c) = setup.connect().await;
    setup.coordinator.request_new_game(carol).await.unwrap();
    let messages = drain(&mut rx_c);
    assert_eq!(created_room(&messages), room_id);
}

#[tokio::test]
async fn test_chooser_disconnect_abandons_the_round() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;
    let (carol, _rx_c) = setup.connect().await;

    setup
        .setup_started_game(alice, &[(bob, "bob"), (carol, "carol")], "alice")
        .await;
    setup
        .coordinator
        .choose_word(alice, "crane".to_string())
        .await
        .unwrap();
    drain(&mut rx_b);

    setup.coordinator.handle_disconnect(alice).await.unwrap();

    let state = last_state(&drain(&mut rx_b));
    assert_eq!(state.status, GameStatus::Choosing);
    assert!(state.chooser.is_some());
    assert_ne!(state.chooser, Some(alice));
}

#[tokio::test]
async fn test_game_ends_after_every_player_has_chosen() {
    let setup = TestSetup::new().await;
    let (alice, _rx_a) = setup.connect().await;
    let (bob, mut rx_b) = setup.connect().await;

    setup
        .setup_started_game(alice, &[(bob, "bob")], "alice")
        .await;

    // Round 1: alice chooses, bob solves.
    setup
        .coordinator
        .choose_word(alice, "crane".to_string())
        .await
        .unwrap();
    setup
        .coordinator
        .guess(bob, "crane".to_string())
        .await
        .unwrap();

    // Round 2: bob chooses, alice solves; the rotation is exhausted.
    setup
        .coordinator
        .choose_word(bob, "slate".to_string())
        .await
        .unwrap();
    setup
        .coordinator
        .guess(alice, "slate".to_string())
        .await
        .unwrap();

    let state = last_state(&drain(&mut rx_b));
    assert_eq!(state.status, GameStatus::End);
    assert!(state.chooser.is_none());
}
