
use draftroom_server::protocol::{Phase, TeamSide, CreateRequest};
use draftroom_server::server::{ActionError, JoinError};
use test_helpers::{
    action, create_request, create_test_server, join, pick_only_request, ready_both, setup_draft,
};
use tokio::sync::mpsc;
use uuid::Uuid;

fn is_hex_token(token: &str) -> bool {
    token.len() == 8 && token.chars().all(|c| c.is_ascii_hexdigit())
}

#[tokio::test]
async fn create_returns_room_id_and_distinct_keys() {
    let server = create_test_server();
    let room = server.create_room(&create_request(30, 30));

    assert!(is_hex_token(&room.id));
    let blue_key = room.blue_key.clone().unwrap();
    let red_key = room.red_key.clone().unwrap();
    assert!(is_hex_token(&blue_key));
    assert!(is_hex_token(&red_key));
    assert_ne!(blue_key, red_key);

    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::NoReady);
    assert!(!snapshot.timer_active);
    assert_eq!(snapshot.blue_team.bans, vec![""; 5]);
    assert_eq!(snapshot.red_team.picks, vec![""; 3]);
}

#[tokio::test]
async fn join_classifies_clients_by_key() {
    let server = create_test_server();
    let room = server.create_room(&create_request(30, 30));
    let blue_key = room.blue_key.clone().unwrap();
    let red_key = room.red_key.clone().unwrap();

    let conn = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    let (_, side) = server
        .join_room(&room.id, conn, tx.clone(), &blue_key)
        .await
        .unwrap();
    assert_eq!(side, Some(TeamSide::Blue));

    let (_, side) = server
        .join_room(&room.id, Uuid::new_v4(), tx.clone(), &red_key)
        .await
        .unwrap();
    assert_eq!(side, Some(TeamSide::Red));

    let (_, side) = server
        .join_room(&room.id, Uuid::new_v4(), tx.clone(), "")
        .await
        .unwrap();
    assert_eq!(side, None);

    let err = server
        .join_room(&room.id, Uuid::new_v4(), tx, "00000000")
        .await
        .unwrap_err();
    assert_eq!(err, JoinError::InvalidKey);
    assert_eq!(err.to_string(), "invalid key");
}

#[tokio::test]
async fn unknown_room_rejects_keyed_join_but_shells_for_spectators() {
    let server = create_test_server();
    let (tx, _rx) = mpsc::channel(8);

    let err = server
        .join_room("deadbeef", Uuid::new_v4(), tx.clone(), "12345678")
        .await
        .unwrap_err();
    assert_eq!(err, JoinError::RoomNotFound);
    assert_eq!(err.to_string(), "room not found");

    let (room, side) = server
        .join_room("deadbeef", Uuid::new_v4(), tx, "")
        .await
        .unwrap();
    assert_eq!(side, None);
    assert!(room.blue_key.is_none());
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::NoReady);
    assert_eq!(snapshot.blue_team.name, "Blue Team");
}

#[tokio::test]
async fn ready_handshake_enters_ban_phase_with_timer() {
    let draft = setup_draft(&create_request(30, 25)).await;

    let room = action(&draft.server, &draft.room_id, &draft.blue, "ready", "")
        .await
        .unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::BlueReady);
    assert!(!snapshot.timer_active);

    let room = action(&draft.server, &draft.room_id, &draft.red, "ready", "")
        .await
        .unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::BanBlue1);
    assert!(snapshot.timer_active);
    assert_eq!(snapshot.time_remaining, 25);
}

#[tokio::test]
async fn ready_handshake_without_bans_enters_pick_phase() {
    let draft = setup_draft(&pick_only_request(30)).await;

    action(&draft.server, &draft.room_id, &draft.red, "ready", "")
        .await
        .unwrap();
    let room = action(&draft.server, &draft.room_id, &draft.blue, "ready", "")
        .await
        .unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::PickBlue1);
    assert!(snapshot.timer_active);
    assert_eq!(snapshot.time_remaining, 30);
}

#[tokio::test]
async fn repeated_ready_from_same_side_is_a_noop() {
    let draft = setup_draft(&create_request(30, 30)).await;

    action(&draft.server, &draft.room_id, &draft.blue, "ready", "")
        .await
        .unwrap();
    let room = action(&draft.server, &draft.room_id, &draft.blue, "ready", "")
        .await
        .unwrap();
    assert_eq!(room.snapshot().await.current_phase, Phase::BlueReady);
}

#[tokio::test]
async fn ready_is_rejected_mid_draft() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let err = action(&draft.server, &draft.room_id, &draft.blue, "ready", "")
        .await
        .unwrap_err();
    assert_eq!(err, ActionError::ReadyNotAllowed(Phase::BanBlue1));
    assert_eq!(
        err.to_string(),
        "ready action not allowed in current phase: BanBlue1"
    );
}

#[tokio::test]
async fn spectators_cannot_perform_actions() {
    let draft = setup_draft(&create_request(30, 30)).await;
    let (spectator, _rx) = join(&draft.server, &draft.room_id, "").await;

    let err = action(&draft.server, &draft.room_id, &spectator, "ready", "")
        .await
        .unwrap_err();
    assert_eq!(err, ActionError::SpectatorAction);
    assert_eq!(err.to_string(), "spectators cannot perform actions");
}

#[tokio::test]
async fn unknown_action_tags_are_rejected() {
    let draft = setup_draft(&create_request(30, 30)).await;
    let err = action(&draft.server, &draft.room_id, &draft.blue, "surrender", "")
        .await
        .unwrap_err();
    assert_eq!(err, ActionError::UnknownAction("surrender".into()));
    assert_eq!(err.to_string(), "unknown action type: surrender");
}

#[tokio::test]
async fn champ_select_is_tentative_and_idempotent() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    // Two identical tentative selections both land, and the phase holds.
    for _ in 0..2 {
        let room = action(
            &draft.server,
            &draft.room_id,
            &draft.blue,
            "champ_select",
            "Ahri",
        )
        .await
        .unwrap();
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.current_phase, Phase::BanBlue1);
        assert_eq!(snapshot.blue_team.bans[0], "Ahri");
    }

    // Rewriting the in-flight slot with a different champion is allowed.
    let room = action(
        &draft.server,
        &draft.room_id,
        &draft.blue,
        "champ_select",
        "Zed",
    )
    .await
    .unwrap();
    assert_eq!(room.snapshot().await.blue_team.bans[0], "Zed");
}

#[tokio::test]
async fn champ_select_by_non_acting_side_is_rejected() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let err = action(
        &draft.server,
        &draft.room_id,
        &draft.red,
        "champ_select",
        "Ahri",
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ActionError::WrongTurn {
            side: TeamSide::Red,
            phase: Phase::BanBlue1
        }
    );
    assert_eq!(err.to_string(), "team red cannot act in phase BanBlue1");

    let room = draft.server.room(&draft.room_id).await.unwrap();
    assert_eq!(room.snapshot().await.red_team.bans, vec![""; 5]);
}

#[tokio::test]
async fn champ_select_requires_a_name() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let err = action(
        &draft.server,
        &draft.room_id,
        &draft.blue,
        "champ_select",
        "",
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "champion name is required for champ_select action"
    );
}

#[tokio::test]
async fn select_then_pick_of_same_champion_commits() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    action(
        &draft.server,
        &draft.room_id,
        &draft.blue,
        "champ_select",
        "Ahri",
    )
    .await
    .unwrap();
    let room = action(
        &draft.server,
        &draft.room_id,
        &draft.blue,
        "champ_pick",
        "Ahri",
    )
    .await
    .unwrap();

    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::BanRed1);
    assert_eq!(snapshot.blue_team.bans[0], "Ahri");
    assert!(snapshot.timer_active);
}

#[tokio::test]
async fn committed_champions_collide_case_insensitively() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    action(
        &draft.server,
        &draft.room_id,
        &draft.blue,
        "champ_pick",
        "Xerath",
    )
    .await
    .unwrap();

    let err = action(
        &draft.server,
        &draft.room_id,
        &draft.red,
        "champ_pick",
        "xerath",
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "champion xerath is already banned");

    // The failed pick left the phase and red's slots untouched.
    let room = draft.server.room(&draft.room_id).await.unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::BanRed1);
    assert_eq!(snapshot.red_team.bans, vec![""; 5]);
}

#[tokio::test]
async fn fearless_bans_disable_champions_for_the_whole_draft() {
    let request = CreateRequest {
        fearless_bans: vec!["Yone".into()],
        ..create_request(30, 30)
    };
    let draft = setup_draft(&request).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    for tag in ["champ_select", "champ_pick"] {
        let err = action(&draft.server, &draft.room_id, &draft.blue, tag, " yone ")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "champion  yone  is disabled (fearless ban)");
    }
}

#[tokio::test]
async fn pick_only_draft_walks_six_phases_to_finished() {
    let draft = setup_draft(&pick_only_request(30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let order = [
        (Phase::PickBlue1, &draft.blue, "Ahri"),
        (Phase::PickRed1, &draft.red, "Zed"),
        (Phase::PickRed2, &draft.red, "Jinx"),
        (Phase::PickBlue2, &draft.blue, "Vi"),
        (Phase::PickBlue3, &draft.blue, "Orianna"),
        (Phase::PickRed3, &draft.red, "Thresh"),
    ];

    for (expected_phase, conn, champion) in order {
        let room = draft.server.room(&draft.room_id).await.unwrap();
        assert_eq!(room.snapshot().await.current_phase, expected_phase);
        action(&draft.server, &draft.room_id, conn, "champ_pick", champion)
            .await
            .unwrap();
    }

    let room = draft.server.room(&draft.room_id).await.unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::Finished);
    assert!(!snapshot.timer_active);
    assert_eq!(snapshot.blue_team.picks, vec!["Ahri", "Vi", "Orianna"]);
    assert_eq!(snapshot.red_team.picks, vec!["Zed", "Jinx", "Thresh"]);
}

#[tokio::test]
async fn with_bans_draft_walks_sixteen_phases_to_finished() {
    let draft = setup_draft(&create_request(30, 30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    // (acting side, champion) for each step of the with-bans order.
    let steps: [(&uuid::Uuid, &str); 16] = [
        (&draft.blue, "b1"),
        (&draft.red, "r1"),
        (&draft.blue, "b2"),
        (&draft.red, "r2"),
        (&draft.blue, "b3"),
        (&draft.red, "r3"),
        (&draft.blue, "bp1"),
        (&draft.red, "rp1"),
        (&draft.red, "rp2"),
        (&draft.blue, "bp2"),
        (&draft.red, "r4"),
        (&draft.blue, "b4"),
        (&draft.red, "r5"),
        (&draft.blue, "b5"),
        (&draft.blue, "bp3"),
        (&draft.red, "rp3"),
    ];

    for (conn, champion) in steps {
        action(&draft.server, &draft.room_id, conn, "champ_pick", champion)
            .await
            .unwrap();
    }

    let room = draft.server.room(&draft.room_id).await.unwrap();
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::Finished);
    assert_eq!(snapshot.blue_team.bans, vec!["b1", "b2", "b3", "b4", "b5"]);
    assert_eq!(snapshot.red_team.bans, vec!["r1", "r2", "r3", "r4", "r5"]);
    assert_eq!(snapshot.blue_team.picks, vec!["bp1", "bp2", "bp3"]);
    assert_eq!(snapshot.red_team.picks, vec!["rp1", "rp2", "rp3"]);
}

#[tokio::test]
async fn one_sided_ban_flag_still_uses_the_full_sequence() {
    let request = CreateRequest {
        red_team_has_bans: false,
        ..create_request(30, 30)
    };
    let draft = setup_draft(&request).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let room = draft.server.room(&draft.room_id).await.unwrap();
    assert_eq!(room.snapshot().await.current_phase, Phase::BanBlue1);

    // Red still occupies its ban phases in the full sequence.
    action(&draft.server, &draft.room_id, &draft.blue, "champ_pick", "b1")
        .await
        .unwrap();
    let room = draft.server.room(&draft.room_id).await.unwrap();
    assert_eq!(room.snapshot().await.current_phase, Phase::BanRed1);
}

#[tokio::test]
async fn finished_draft_is_archived_then_evicted_and_replayable() {
    let draft = setup_draft(&pick_only_request(30)).await;
    ready_both(&draft.server, &draft.room_id, &draft.blue, &draft.red).await;

    let picks = [
        (&draft.blue, "Ahri"),
        (&draft.red, "Zed"),
        (&draft.red, "Jinx"),
        (&draft.blue, "Vi"),
        (&draft.blue, "Orianna"),
        (&draft.red, "Thresh"),
    ];
    for (conn, champion) in picks {
        action(&draft.server, &draft.room_id, conn, "champ_pick", champion)
            .await
            .unwrap();
    }

    // Archival is asynchronous; the room must survive the grace period.
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    assert!(draft.server.archive().exists(&draft.room_id).await.unwrap());
    assert!(draft.server.room_in_memory(&draft.room_id).is_some());

    // After the grace the registry entry is gone.
    tokio::time::sleep(tokio::time::Duration::from_millis(400)).await;
    assert!(draft.server.room_in_memory(&draft.room_id).is_none());

    // A later spectator join replays the archived draft, read-only.
    let (tx, _rx) = mpsc::channel(8);
    let (room, side) = draft
        .server
        .join_room(&draft.room_id, Uuid::new_v4(), tx, "")
        .await
        .unwrap();
    assert_eq!(side, None);
    assert!(room.blue_key.is_none());
    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.current_phase, Phase::Finished);
    assert_eq!(snapshot.time_remaining, 0);
    assert!(!snapshot.timer_active);
    assert_eq!(snapshot.blue_team.picks, vec!["Ahri", "Vi", "Orianna"]);
}

#[tokio::test]
async fn disconnect_removes_client_but_keeps_room() {
    let draft = setup_draft(&create_request(30, 30)).await;
    let room = draft.server.room(&draft.room_id).await.unwrap();
    assert_eq!(room.client_count().await, 2);

    draft.server.disconnect(&draft.blue).await;
    assert_eq!(room.client_count().await, 1);
    assert!(draft.server.room_in_memory(&draft.room_id).is_some());

    draft.server.disconnect(&draft.red).await;
    assert_eq!(room.client_count().await, 0);
    // An empty room persists until the draft finishes.
    assert!(draft.server.room_in_memory(&draft.room_id).is_some());
}
