//! End-to-end gateway scenarios over real WebSocket connections

use std::time::Duration;

use anyhow::Result;
use integration_tests::{seed_users, TestServer, TYPING_WINDOW};
use parley_core::{ChatId, ChatStore, MembershipAction, RealtimeEvent, UserId};
use parley_gateway::protocol::{ClientEvent, ServerEvent};

fn assert_message(event: &ServerEvent, chat_id: ChatId, sender_id: UserId, content: &str) {
    match event {
        ServerEvent::ReceiveMessage { message } => {
            assert_eq!(message.chat_id, chat_id);
            assert_eq!(message.sender_id, sender_id);
            assert_eq!(message.content, content);
        }
        other => panic!("expected receiveMessage, got {other:?}"),
    }
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::start().await?;

    let body = reqwest::get(format!("{}/health", server.base_url()))
        .await?
        .text()
        .await?;
    assert_eq!(body, "OK");
    Ok(())
}

#[tokio::test]
async fn message_reaches_every_member_device_and_nobody_else() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let general = server.store.create_group_chat("general", cast.alice, [cast.bob]);
    // Carol is online but shares no chat with alice or bob
    server.store.create_private_chat(cast.carol, cast.dave);

    let mut conn1 = server.connect_as(cast.alice).await?;
    let mut conn2 = server.connect_as(cast.alice).await?;
    let mut conn3 = server.connect_as(cast.bob).await?;
    let mut carol = server.connect_as(cast.carol).await?;

    conn1
        .send(&ClientEvent::SendMessage {
            chat_id: general.id,
            sender_id: cast.alice,
            content: "hello general".to_string(),
        })
        .await?;

    // Both of the sender's devices and bob's connection see the message
    for client in [&mut conn1, &mut conn2, &mut conn3] {
        let event = client.recv_named("receiveMessage").await?;
        assert_message(&event, general.id, cast.alice, "hello general");
    }

    // Persisted before the fan-out
    assert_eq!(server.store.message_count(general.id), 1);

    // Carol is not a member and hears nothing
    carol.expect_silence(Duration::from_millis(300)).await?;
    Ok(())
}

#[tokio::test]
async fn presence_transitions_fire_once_and_reach_contacts_only() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    server.store.create_private_chat(cast.alice, cast.bob);
    server.store.create_private_chat(cast.carol, cast.dave);

    let mut bob = server.connect_as(cast.bob).await?;
    let mut carol = server.connect_as(cast.carol).await?;

    // First alice connection: her contact bob is told, carol is not
    let alice1 = server.connect_as(cast.alice).await?;
    let event = bob.recv_named("userOnline").await?;
    assert_eq!(event, ServerEvent::UserOnline { user_id: cast.alice });

    // Second device is silent
    let alice2 = server.connect_as(cast.alice).await?;
    bob.expect_silence(Duration::from_millis(300)).await?;

    // Closing one device is silent; closing the last one goes offline once
    alice1.close().await?;
    bob.expect_silence(Duration::from_millis(300)).await?;

    alice2.close().await?;
    let event = bob.recv_named("userOffline").await?;
    assert_eq!(event, ServerEvent::UserOffline { user_id: cast.alice });

    // Carol shared no chat with alice and heard nothing throughout
    carol.expect_silence(Duration::from_millis(300)).await?;
    Ok(())
}

#[tokio::test]
async fn identify_snapshot_lists_online_contacts() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    server.store.create_private_chat(cast.alice, cast.bob);
    server.store.create_private_chat(cast.alice, cast.carol);

    // Bob online, carol offline when alice arrives
    let _bob = server.connect_as(cast.bob).await?;

    let mut alice = server.connect().await?;
    let snapshot = alice.identify(cast.alice).await?;
    assert_eq!(snapshot, vec![cast.bob]);
    Ok(())
}

#[tokio::test]
async fn offline_membership_change_is_reconciled_on_identify() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let team = server.store.create_group_chat("team", cast.alice, []);

    let mut alice = server.connect_as(cast.alice).await?;

    // Dave is added while he has zero live connections; the live event
    // reaches nobody and only the store remembers
    server.store.add_member(team.id, cast.dave).await?;
    server.state.router().route(RealtimeEvent::MembershipChanged {
        chat: team.clone(),
        user_id: cast.dave,
        action: MembershipAction::Added,
    });

    // Later dave connects; identify alone must subscribe him, no joinRoom
    let mut dave = server.connect_as(cast.dave).await?;

    alice
        .send(&ClientEvent::SendMessage {
            chat_id: team.id,
            sender_id: cast.alice,
            content: "welcome dave".to_string(),
        })
        .await?;

    let event = dave.recv_named("receiveMessage").await?;
    assert_message(&event, team.id, cast.alice, "welcome dave");
    Ok(())
}

#[tokio::test]
async fn just_added_member_misses_no_message() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let team = server.store.create_group_chat("team", cast.alice, []);

    let mut alice = server.connect_as(cast.alice).await?;
    let mut dave = server.connect_as(cast.dave).await?;

    // REST group-management path: persist, then route
    server.store.add_member(team.id, cast.dave).await?;
    server.state.router().route(RealtimeEvent::MembershipChanged {
        chat: team.clone(),
        user_id: cast.dave,
        action: MembershipAction::Added,
    });

    let event = dave.recv_named("newChatAdded").await?;
    match event {
        ServerEvent::NewChatAdded { chat } => assert_eq!(chat.id, team.id),
        other => panic!("expected newChatAdded, got {other:?}"),
    }
    let event = alice.recv_named("chatUpdated").await?;
    assert!(matches!(event, ServerEvent::ChatUpdated { .. }));

    // A message routed immediately after the membership event reaches dave
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: team.id,
            sender_id: cast.alice,
            content: "first".to_string(),
        })
        .await?;
    let event = dave.recv_named("receiveMessage").await?;
    assert_message(&event, team.id, cast.alice, "first");
    Ok(())
}

#[tokio::test]
async fn typing_is_not_echoed_and_expires() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut alice = server.connect_as(cast.alice).await?;
    let mut bob = server.connect_as(cast.bob).await?;
    // Alice hears her contact come online; consume it before the assertions
    alice.recv_named("userOnline").await?;

    alice
        .send(&ClientEvent::Typing {
            chat_id: chat.id,
            user_id: cast.alice,
            is_typing: true,
        })
        .await?;

    let event = bob.recv_named("userTyping").await?;
    assert_eq!(
        event,
        ServerEvent::UserTyping {
            chat_id: chat.id,
            user_id: cast.alice,
            is_typing: true
        }
    );

    // No refresh and no explicit stop: the server synthesizes one
    let event = bob.recv_named("userTyping").await?;
    assert_eq!(
        event,
        ServerEvent::UserTyping {
            chat_id: chat.id,
            user_id: cast.alice,
            is_typing: false
        }
    );

    // The author never hears their own signal
    alice.expect_silence(Duration::from_millis(300)).await?;
    Ok(())
}

#[tokio::test]
async fn typing_stops_for_subscribers_when_author_disconnects() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let general = server
        .store
        .create_group_chat("general", cast.alice, [cast.bob, cast.carol]);

    let mut bob = server.connect_as(cast.bob).await?;
    let mut carol = server.connect_as(cast.carol).await?;

    let mut alice = server.connect_as(cast.alice).await?;
    alice
        .send(&ClientEvent::Typing {
            chat_id: general.id,
            user_id: cast.alice,
            is_typing: true,
        })
        .await?;

    for watcher in [&mut bob, &mut carol] {
        let event = watcher.recv_named("userTyping").await?;
        assert!(matches!(event, ServerEvent::UserTyping { is_typing: true, .. }));
    }

    // Alice vanishes mid-typing; within one window the stop still arrives
    alice.close().await?;

    for watcher in [&mut bob, &mut carol] {
        let event = tokio::time::timeout(TYPING_WINDOW * 2, watcher.recv_named("userTyping"))
            .await
            .expect("no typing stop within the expiry window")?;
        assert_eq!(
            event,
            ServerEvent::UserTyping {
                chat_id: general.id,
                user_id: cast.alice,
                is_typing: false
            }
        );
    }
    Ok(())
}

#[tokio::test]
async fn send_fails_cleanly_while_store_is_down() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut alice = server.connect_as(cast.alice).await?;
    let mut bob = server.connect_as(cast.bob).await?;

    server.store.set_unavailable(true);
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "lost?".to_string(),
        })
        .await?;

    // The sender gets an explicit failure; nothing is broadcast
    let event = alice.recv_named("error").await?;
    assert!(matches!(event, ServerEvent::Error { .. }));
    bob.expect_silence(Duration::from_millis(300)).await?;

    // The connection survives the outage and works once the store is back
    server.store.set_unavailable(false);
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "found".to_string(),
        })
        .await?;
    let event = bob.recv_named("receiveMessage").await?;
    assert_message(&event, chat.id, cast.alice, "found");
    Ok(())
}

#[tokio::test]
async fn join_room_requires_membership() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut carol = server.connect_as(cast.carol).await?;
    carol.send(&ClientEvent::JoinRoom { chat_id: chat.id }).await?;

    let event = carol.recv_named("error").await?;
    assert!(matches!(event, ServerEvent::Error { .. }));
    assert!(!server.state.rooms().is_subscribed(chat.id, cast.carol));
    Ok(())
}

#[tokio::test]
async fn leave_room_stops_delivery() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut alice = server.connect_as(cast.alice).await?;
    let mut bob = server.connect_as(cast.bob).await?;

    bob.send(&ClientEvent::LeaveRoom { chat_id: chat.id }).await?;
    bob.recv_named("debug").await?;

    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "anyone there?".to_string(),
        })
        .await?;

    bob.expect_silence(Duration::from_millis(300)).await?;

    // An explicit re-join restores delivery
    bob.send(&ClientEvent::JoinRoom { chat_id: chat.id }).await?;
    bob.recv_named("debug").await?;
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "back again".to_string(),
        })
        .await?;
    let event = bob.recv_named("receiveMessage").await?;
    assert_message(&event, chat.id, cast.alice, "back again");
    Ok(())
}

#[tokio::test]
async fn malformed_and_spoofed_frames_do_not_kill_the_connection() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut alice = server.connect_as(cast.alice).await?;

    alice.send_raw("not even json").await?;
    let event = alice.recv_named("error").await?;
    assert!(matches!(event, ServerEvent::Error { .. }));

    // Claiming someone else's identity is rejected per-action
    alice
        .send(&ClientEvent::Typing {
            chat_id: chat.id,
            user_id: cast.bob,
            is_typing: true,
        })
        .await?;
    let event = alice.recv_named("error").await?;
    assert!(matches!(event, ServerEvent::Error { .. }));

    // The connection still routes after both rejections
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "still alive".to_string(),
        })
        .await?;
    let event = alice.recv_named("receiveMessage").await?;
    assert_message(&event, chat.id, cast.alice, "still alive");
    Ok(())
}

#[tokio::test]
async fn duplicate_identify_keeps_original_identity() -> Result<()> {
    let server = TestServer::start().await?;
    let cast = seed_users(&server.directory);
    let chat = server.store.create_private_chat(cast.alice, cast.bob);

    let mut alice = server.connect_as(cast.alice).await?;

    alice.send(&ClientEvent::Identify { user_id: cast.bob }).await?;
    let event = alice.recv_named("error").await?;
    assert!(matches!(event, ServerEvent::Error { .. }));

    // Still alice: a send under the original identity works
    alice
        .send(&ClientEvent::SendMessage {
            chat_id: chat.id,
            sender_id: cast.alice,
            content: "it is still me".to_string(),
        })
        .await?;
    let event = alice.recv_named("receiveMessage").await?;
    assert_message(&event, chat.id, cast.alice, "it is still me");
    Ok(())
}
