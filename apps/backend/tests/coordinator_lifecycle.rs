mod common;
mod support;

use backend_test_support::unique_ids::{fixed_player, unique_game_id};
use supply_chain_backend::domain::PlayerAssignment;
use supply_chain_backend::{AppError, EndReason, ErrorCode, GameEvent, RoundPhase};
use support::{constant_settings, harness, seats, three_stage};

#[tokio::test]
async fn unknown_game_is_rejected_and_reported() {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();

    let err = h
        .coordinator
        .submit_order(game_id, fixed_player(1), 4)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownGame);
    assert_eq!(h.sink.rejection_codes(), vec![ErrorCode::UnknownGame]);
    assert_eq!(
        h.coordinator.phase(game_id).await.unwrap_err().code(),
        ErrorCode::UnknownGame
    );
}

#[tokio::test]
async fn invalid_orders_leave_the_round_open() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();
    let players = seats(2);
    h.coordinator
        .create_session(game_id, three_stage(12), players.clone())
        .await?;
    let first = players[0].player;

    h.coordinator.submit_order(game_id, first, 4).await?;

    let duplicate = h.coordinator.submit_order(game_id, first, 5).await.unwrap_err();
    assert_eq!(duplicate.code(), ErrorCode::DuplicateOrder);

    let negative = h
        .coordinator
        .submit_order(game_id, players[1].player, -1)
        .await
        .unwrap_err();
    assert_eq!(negative.code(), ErrorCode::InvalidQuantity);

    let future = h
        .coordinator
        .submit_order_for_round(game_id, players[1].player, 2, 4)
        .await
        .unwrap_err();
    assert_eq!(future.code(), ErrorCode::RoundClosed);

    let stranger = h
        .coordinator
        .submit_order(game_id, fixed_player(99), 4)
        .await
        .unwrap_err();
    assert_eq!(stranger.code(), ErrorCode::NotAPlayer);

    assert_eq!(
        h.sink.rejection_codes(),
        vec![
            ErrorCode::DuplicateOrder,
            ErrorCode::InvalidQuantity,
            ErrorCode::RoundClosed,
            ErrorCode::NotAPlayer,
        ]
    );
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 1 }
    );
    assert_eq!(h.store.snapshot_count(game_id), 1);
    Ok(())
}

#[tokio::test]
async fn second_session_for_same_game_is_refused() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();
    h.coordinator
        .create_session(game_id, three_stage(12), seats(1))
        .await?;

    let err = h
        .coordinator
        .create_session(game_id, three_stage(12), seats(1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionExists);
    assert_eq!(h.coordinator.live_sessions(), 1);
    Ok(())
}

#[tokio::test]
async fn bad_seating_never_registers_a_session() {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();

    let off_chain = vec![PlayerAssignment::new(fixed_player(1), 7)];
    let err = h
        .coordinator
        .create_session(game_id, three_stage(12), off_chain)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigError);

    let twice = vec![
        PlayerAssignment::new(fixed_player(1), 0),
        PlayerAssignment::new(fixed_player(1), 1),
    ];
    let err = h
        .coordinator
        .create_session(game_id, three_stage(12), twice)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigError);
    assert!(!h.coordinator.is_live(game_id));
}

#[tokio::test]
async fn orders_after_the_last_round_are_refused() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 1));
    let game_id = unique_game_id();
    let players = seats(1);
    h.coordinator
        .create_session(game_id, three_stage(12), players.clone())
        .await?;

    h.coordinator
        .submit_order(game_id, players[0].player, 4)
        .await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Ended {
            reason: EndReason::MaxRoundsReached,
            last_round: 1,
        }
    );

    let err = h
        .coordinator
        .submit_order(game_id, players[0].player, 4)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameEnded);
    assert_eq!(h.sink.count("game_ended"), 1);
    Ok(())
}

#[tokio::test]
async fn disconnected_players_are_not_waited_for() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();
    let players = seats(2);
    let (present, absent) = (players[0].player, players[1].player);
    h.coordinator
        .create_session(game_id, three_stage(12), players.clone())
        .await?;

    h.coordinator.submit_order(game_id, present, 4).await?;
    h.coordinator.player_disconnected(game_id, absent).await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 2 }
    );

    let round_two_expected = h
        .sink
        .events()
        .into_iter()
        .find_map(|e| match e {
            GameEvent::RoundOpened {
                round: 2,
                expected_players,
                ..
            } => Some(expected_players),
            _ => None,
        })
        .expect("round 2 opened");
    assert_eq!(round_two_expected, vec![present]);

    h.coordinator.submit_order(game_id, present, 4).await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 3 }
    );

    // Once back, the round waits for them again.
    h.coordinator.player_connected(game_id, absent).await?;
    h.coordinator.submit_order(game_id, present, 4).await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 3 }
    );
    assert_eq!(h.sink.count("player_presence"), 2);
    Ok(())
}

#[tokio::test]
async fn everyone_leaving_does_not_play_the_game_out() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 36));
    let game_id = unique_game_id();
    let players = seats(2);
    let (first, second) = (players[0].player, players[1].player);
    h.coordinator
        .create_session(game_id, three_stage(12), players.clone())
        .await?;

    h.coordinator.player_disconnected(game_id, first).await?;
    assert!(h.sink.resolved_rounds().is_empty());

    // The last departure completes the round it leaves behind, and no more.
    h.coordinator.player_disconnected(game_id, second).await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 2 }
    );
    assert_eq!(h.sink.resolved_rounds(), vec![1]);
    assert_eq!(h.sink.count("game_ended"), 0);

    h.coordinator.player_connected(game_id, first).await?;
    h.coordinator.submit_order(game_id, first, 4).await?;
    assert_eq!(
        h.coordinator.phase(game_id).await?,
        RoundPhase::Open { round: 3 }
    );
    assert_eq!(h.sink.resolved_rounds(), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn terminate_is_idempotent_and_end_session_removes() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();
    let players = seats(1);
    h.coordinator
        .create_session(game_id, three_stage(12), players.clone())
        .await?;

    let ended = RoundPhase::Ended {
        reason: EndReason::Terminated,
        last_round: 0,
    };
    assert_eq!(h.coordinator.terminate(game_id).await?, ended);
    assert_eq!(h.coordinator.terminate(game_id).await?, ended);
    assert_eq!(h.sink.count("game_ended"), 1);

    let err = h
        .coordinator
        .submit_order(game_id, players[0].player, 4)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameEnded);

    // Terminated sessions stay readable until removed.
    let initial = h.coordinator.get_snapshot(game_id, 0).await?;
    assert_eq!(initial.round, 0);

    let summary = h.coordinator.end_session(game_id).await?;
    assert_eq!(summary.rounds_played, 0);
    assert!(!h.coordinator.is_live(game_id));
    assert_eq!(
        h.coordinator.end_session(game_id).await.unwrap_err().code(),
        ErrorCode::UnknownGame
    );
    Ok(())
}

#[tokio::test]
async fn missing_rounds_are_not_found() -> Result<(), AppError> {
    let h = harness(constant_settings(4, 10));
    let game_id = unique_game_id();
    h.coordinator
        .create_session(game_id, three_stage(12), seats(1))
        .await?;

    let err = h.coordinator.get_snapshot(game_id, 99).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SnapshotNotFound);
    Ok(())
}
