//! Event router
//!
//! Computes the target user set for each event, snapshots it, then pushes to
//! every live connection of every target. Snapshots are taken under the
//! tracker locks; delivery happens lock-free through non-blocking sends, so
//! a slow client can only lose its own events, never stall the fan-out.
//!
//! `route` is synchronous: for any one chat, events reach subscribers in the
//! order `route` was called. No ordering holds across chats.

use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;
use crate::rooms::RoomTracker;
use crate::router::TypingTracker;
use parley_core::{ChatId, MembershipAction, RealtimeEvent, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Push an event to every live connection of one user
///
/// Per-connection failures (closed peer, full buffer) are skipped and
/// counted; delivery to the remaining connections continues.
pub fn deliver_to_user(
    registry: &ConnectionRegistry,
    user_id: UserId,
    event: &ServerEvent,
) -> usize {
    let mut sent = 0;
    for connection in registry.connections_for(user_id) {
        match connection.try_send(event.clone()) {
            Ok(()) => sent += 1,
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    user_id = %user_id,
                    event = event.name(),
                    error = %e,
                    "Delivery failed, skipping connection"
                );
            }
        }
    }
    sent
}

/// Routes realtime events to the correct set of connections
pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTracker>,
    typing: Arc<TypingTracker>,
    typing_window: Duration,
}

impl EventRouter {
    /// Create a new router
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomTracker>,
        typing: Arc<TypingTracker>,
        typing_window: Duration,
    ) -> Self {
        Self {
            registry,
            rooms,
            typing,
            typing_window,
        }
    }

    /// The room tracker this router fans out against
    pub fn rooms(&self) -> &Arc<RoomTracker> {
        &self.rooms
    }

    /// The typing tracker backing auto-expiry
    pub fn typing(&self) -> &Arc<TypingTracker> {
        &self.typing
    }

    /// Route one event to its target connections
    pub fn route(&self, event: RealtimeEvent) {
        tracing::trace!(event = event.event_type(), chat_id = ?event.chat_id(), "Routing event");

        match event {
            RealtimeEvent::MessageCreated { chat_id, message } => {
                // Every member device sees the message, the sender's other
                // connections included.
                let targets = self.rooms.subscribers_of(chat_id);
                let out = ServerEvent::ReceiveMessage { message };
                let sent = self.deliver_to_users(&targets, &out);
                tracing::trace!(chat_id = %chat_id, targets = targets.len(), sent, "Message fanned out");
            }

            RealtimeEvent::TypingChanged {
                chat_id,
                user_id,
                is_typing,
            } => {
                // Never echo a typing signal back at its author
                let mut targets = self.rooms.subscribers_of(chat_id);
                targets.remove(&user_id);
                let out = ServerEvent::UserTyping {
                    chat_id,
                    user_id,
                    is_typing,
                };
                self.deliver_to_users(&targets, &out);

                if is_typing {
                    let generation = self.typing.arm(chat_id, user_id);
                    self.spawn_typing_expiry(chat_id, user_id, generation);
                } else {
                    self.typing.clear(chat_id, user_id);
                }
            }

            RealtimeEvent::MembershipChanged {
                chat,
                user_id,
                action,
            } => {
                // Tracker first: no event routed after this call may miss
                // the new member or still reach the removed one.
                match action {
                    MembershipAction::Added => {
                        self.rooms.subscribe(chat.id, user_id);
                        deliver_to_user(
                            &self.registry,
                            user_id,
                            &ServerEvent::NewChatAdded { chat: chat.clone() },
                        );
                        let mut others = self.rooms.subscribers_of(chat.id);
                        others.remove(&user_id);
                        self.deliver_to_users(&others, &ServerEvent::ChatUpdated { chat });
                    }
                    MembershipAction::Removed => {
                        self.rooms.unsubscribe(chat.id, user_id);
                        self.typing.clear(chat.id, user_id);
                        deliver_to_user(
                            &self.registry,
                            user_id,
                            &ServerEvent::ChatUpdated { chat: chat.clone() },
                        );
                        let remaining = self.rooms.subscribers_of(chat.id);
                        self.deliver_to_users(&remaining, &ServerEvent::ChatUpdated { chat });
                    }
                }
            }

            RealtimeEvent::PresenceChanged { user_id, online } => {
                // Contacts only: users sharing at least one chat
                let contacts = self.contacts_of(user_id);
                let out = if online {
                    ServerEvent::UserOnline { user_id }
                } else {
                    ServerEvent::UserOffline { user_id }
                };
                let sent = self.deliver_to_users(&contacts, &out);
                tracing::trace!(user_id = %user_id, online, contacts = contacts.len(), sent, "Presence fanned out");
            }
        }
    }

    /// Users sharing at least one chat with `user_id`, excluding the user
    pub fn contacts_of(&self, user_id: UserId) -> HashSet<UserId> {
        let mut contacts = HashSet::new();
        for chat_id in self.rooms.chats_of(user_id) {
            contacts.extend(self.rooms.subscribers_of(chat_id));
        }
        contacts.remove(&user_id);
        contacts
    }

    fn deliver_to_users(&self, targets: &HashSet<UserId>, event: &ServerEvent) -> usize {
        let mut sent = 0;
        for &user_id in targets {
            sent += deliver_to_user(&self.registry, user_id, event);
        }
        sent
    }

    /// Arm the inactivity timer for a typing entry
    ///
    /// When the window elapses without a refresh or an explicit stop, a
    /// `userTyping{isTyping:false}` is synthesized so clients never display
    /// a stuck indicator - the author may be long gone by then.
    fn spawn_typing_expiry(&self, chat_id: ChatId, user_id: UserId, generation: u64) {
        let registry = Arc::clone(&self.registry);
        let rooms = Arc::clone(&self.rooms);
        let typing = Arc::clone(&self.typing);
        let window = self.typing_window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;

            if typing.clear_if_current(chat_id, user_id, generation) {
                tracing::trace!(
                    chat_id = %chat_id,
                    user_id = %user_id,
                    "Typing state expired, synthesizing stop"
                );
                let mut targets = rooms.subscribers_of(chat_id);
                targets.remove(&user_id);
                let out = ServerEvent::UserTyping {
                    chat_id,
                    user_id,
                    is_typing: false,
                };
                for target in targets {
                    deliver_to_user(&registry, target, &out);
                }
            }
        });
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("typing_window", &self.typing_window)
            .finish()
    }
}
