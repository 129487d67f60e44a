//! RoomRelay - translates connection-scoped events into registry operations.

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::relay::{
    ClientEvent, MembershipChange, MessagePayload, RelayError, RoomMessage, RoomName,
    ServerEvent, SystemMessage,
};
use crate::ports::{ConnectionRegistry, Outbox};

/// The room relay core.
///
/// Holds no membership state of its own; every question and mutation goes
/// through the registry. Each handler runs synchronously to completion.
///
/// Join and leave follow the same order: mutate membership, acknowledge to
/// the actor, then notify the room. Because the room is addressed by
/// membership at notification time, a joiner sees its own arrival notice
/// while a leaver does not see its own departure notice.
pub struct RoomRelay {
    registry: Box<dyn ConnectionRegistry>,
}

impl RoomRelay {
    pub fn new(registry: impl ConnectionRegistry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
        }
    }

    /// Read-only view of the underlying registry.
    pub fn registry(&self) -> &dyn ConnectionRegistry {
        self.registry.as_ref()
    }

    /// Register a newly accepted connection.
    pub fn connect(&mut self, id: ConnectionId, outbox: Outbox) -> Result<(), RelayError> {
        self.registry.register(id, outbox)?;
        Ok(())
    }

    /// Route one inbound event to its handler.
    pub fn handle(&mut self, id: &ConnectionId, event: ClientEvent) -> Result<(), RelayError> {
        match event {
            ClientEvent::Ping => self.ping(id),
            ClientEvent::Join(change) => self.join(id, &change),
            ClientEvent::Leave(change) => self.leave(id, &change),
            ClientEvent::To(message) => self.send_to(id, message),
        }
    }

    /// Reply `pong` to the caller only.
    pub fn ping(&self, id: &ConnectionId) -> Result<(), RelayError> {
        self.acknowledge(id, ServerEvent::Pong)
    }

    /// Add the caller to a room and announce it to the room, caller included.
    ///
    /// Re-joining keeps a single membership but repeats both the
    /// acknowledgement and the announcement.
    pub fn join(&mut self, id: &ConnectionId, change: &MembershipChange) -> Result<(), RelayError> {
        // 1. Mutate membership
        let added = self.registry.join(id, &change.room)?;

        // 2. Acknowledge to the actor
        self.acknowledge(id, ServerEvent::Joined(change.room.clone()))?;

        // 3. Notify the room
        let notice = SystemMessage::joined(&change.user, Timestamp::now());
        let delivered = self.notify(&change.room, notice);

        tracing::debug!(
            connection_id = %id,
            room = %change.room,
            user = %change.user,
            rejoin = !added,
            delivered,
            "Joined room"
        );
        Ok(())
    }

    /// Remove the caller from a room and announce it to the remaining members.
    ///
    /// Leaving a room the caller is not in still acknowledges and announces.
    pub fn leave(&mut self, id: &ConnectionId, change: &MembershipChange) -> Result<(), RelayError> {
        // 1. Mutate membership
        let removed = self.registry.leave(id, &change.room)?;

        // 2. Acknowledge to the actor
        self.acknowledge(id, ServerEvent::Left(change.room.clone()))?;

        // 3. Notify the room (the actor is no longer a member)
        let notice = SystemMessage::left(&change.user, Timestamp::now());
        let delivered = self.notify(&change.room, notice);

        tracing::debug!(
            connection_id = %id,
            room = %change.room,
            user = %change.user,
            was_member = removed,
            delivered,
            "Left room"
        );
        Ok(())
    }

    /// Relay an opaque payload to every current member of a room.
    ///
    /// The sender need not be a member. Posting to an empty room is a no-op.
    pub fn send_to(&self, id: &ConnectionId, message: RoomMessage) -> Result<(), RelayError> {
        if !self.registry.is_registered(id) {
            return Err(RelayError::NotConnected(*id));
        }

        tracing::debug!(
            connection_id = %id,
            room = %message.room,
            msg = %message.msg,
            "Relaying message"
        );

        let event = ServerEvent::Message(MessagePayload::Relayed(message.msg));
        let delivered = self.registry.broadcast(&message.room, &event);

        tracing::trace!(room = %message.room, delivered, "Relay complete");
        Ok(())
    }

    /// Release every membership of a connection and forget it.
    ///
    /// No notifications are sent to the rooms it was in.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Result<Vec<RoomName>, RelayError> {
        Ok(self.registry.unregister(id)?)
    }

    fn acknowledge(&self, id: &ConnectionId, event: ServerEvent) -> Result<(), RelayError> {
        if !self.registry.emit(id, event)? {
            tracing::debug!(connection_id = %id, "Actor outbox closed, acknowledgement dropped");
        }
        Ok(())
    }

    fn notify(&self, room: &RoomName, notice: SystemMessage) -> usize {
        let event = ServerEvent::Message(MessagePayload::System(notice));
        self.registry.broadcast(room, &event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::InMemoryConnectionRegistry;
    use crate::domain::relay::SYSTEM_USER;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Client {
        id: ConnectionId,
        rx: mpsc::UnboundedReceiver<ServerEvent>,
    }

    impl Client {
        fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn relay() -> RoomRelay {
        RoomRelay::new(InMemoryConnectionRegistry::new())
    }

    fn connect(relay: &mut RoomRelay) -> Client {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        relay.connect(id, tx).unwrap();
        Client { id, rx }
    }

    fn change(room: &str, user: &str) -> MembershipChange {
        MembershipChange {
            room: room.into(),
            user: user.to_string(),
        }
    }

    fn system_text(event: &ServerEvent) -> Option<&str> {
        match event {
            ServerEvent::Message(MessagePayload::System(m)) if m.user == SYSTEM_USER => {
                Some(m.message.as_str())
            }
            _ => None,
        }
    }

    #[test]
    fn ping_replies_pong_to_caller_only() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let mut b = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        relay.join(&b.id, &change("lobby", "bob")).unwrap();
        a.drain();
        b.drain();

        relay.handle(&a.id, ClientEvent::Ping).unwrap();

        assert_eq!(a.drain(), vec![ServerEvent::Pong]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn join_acknowledges_then_announces_to_room_including_actor() {
        let mut relay = relay();
        let mut a = connect(&mut relay);

        relay.join(&a.id, &change("lobby", "alice")).unwrap();

        let events = a.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ServerEvent::Joined("lobby".into()));
        assert_eq!(system_text(&events[1]), Some("User 'alice' joined the room"));
        assert_eq!(relay.registry().members(&"lobby".into()), vec![a.id]);
    }

    #[test]
    fn join_announcement_reaches_existing_members() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let mut b = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        a.drain();

        relay.join(&b.id, &change("lobby", "bob")).unwrap();

        let seen_by_a = a.drain();
        assert_eq!(seen_by_a.len(), 1);
        assert_eq!(system_text(&seen_by_a[0]), Some("User 'bob' joined the room"));
        assert_eq!(b.drain().len(), 2);
    }

    #[test]
    fn rejoin_resends_acknowledgement_and_notice() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        a.drain();

        relay.join(&a.id, &change("lobby", "alice")).unwrap();

        assert_eq!(a.drain().len(), 2);
        assert_eq!(relay.registry().members(&"lobby".into()), vec![a.id]);
    }

    #[test]
    fn leave_excludes_actor_from_departure_notice() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let mut b = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        relay.join(&b.id, &change("lobby", "bob")).unwrap();
        a.drain();
        b.drain();

        relay.handle(&b.id, ClientEvent::Leave(change("lobby", "bob"))).unwrap();

        assert_eq!(b.drain(), vec![ServerEvent::Left("lobby".into())]);
        let seen_by_a = a.drain();
        assert_eq!(seen_by_a.len(), 1);
        assert_eq!(system_text(&seen_by_a[0]), Some("User 'bob' left the room"));
        assert_eq!(relay.registry().members(&"lobby".into()), vec![a.id]);
    }

    #[test]
    fn leave_without_membership_still_acknowledges() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let mut b = connect(&mut relay);
        relay.join(&b.id, &change("lobby", "bob")).unwrap();
        b.drain();

        relay.leave(&a.id, &change("lobby", "alice")).unwrap();

        assert_eq!(a.drain(), vec![ServerEvent::Left("lobby".into())]);
        assert_eq!(b.drain().len(), 1);
    }

    #[test]
    fn send_to_delivers_verbatim_to_members_only() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let mut b = connect(&mut relay);
        let mut outsider = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        relay.join(&b.id, &change("lobby", "bob")).unwrap();
        a.drain();
        b.drain();

        let payload = json!({"text": "hi", "nested": {"n": 1}});
        relay
            .handle(
                &a.id,
                ClientEvent::To(RoomMessage {
                    room: "lobby".into(),
                    msg: payload.clone(),
                }),
            )
            .unwrap();

        let expected = ServerEvent::Message(MessagePayload::Relayed(payload));
        assert_eq!(a.drain(), vec![expected.clone()]);
        assert_eq!(b.drain(), vec![expected]);
        assert!(outsider.drain().is_empty());
    }

    #[test]
    fn non_member_may_post_without_receiving_echo() {
        let mut relay = relay();
        let mut member = connect(&mut relay);
        let mut outsider = connect(&mut relay);
        relay.join(&member.id, &change("lobby", "alice")).unwrap();
        member.drain();

        relay
            .send_to(
                &outsider.id,
                RoomMessage {
                    room: "lobby".into(),
                    msg: json!("hello from outside"),
                },
            )
            .unwrap();

        assert_eq!(member.drain().len(), 1);
        assert!(outsider.drain().is_empty());
    }

    #[test]
    fn send_to_empty_room_is_noop() {
        let mut relay = relay();
        let mut a = connect(&mut relay);

        relay
            .send_to(
                &a.id,
                RoomMessage {
                    room: "nobody-here".into(),
                    msg: json!(1),
                },
            )
            .unwrap();

        assert!(a.drain().is_empty());
    }

    #[test]
    fn disconnect_releases_memberships_silently() {
        let mut relay = relay();
        let mut a = connect(&mut relay);
        let b = connect(&mut relay);
        relay.join(&a.id, &change("lobby", "alice")).unwrap();
        relay.join(&b.id, &change("lobby", "bob")).unwrap();
        relay.join(&b.id, &change("games", "bob")).unwrap();
        a.drain();

        let released = relay.disconnect(&b.id).unwrap();

        assert_eq!(released.len(), 2);
        assert!(a.drain().is_empty());
        assert_eq!(relay.registry().members(&"lobby".into()), vec![a.id]);
        assert!(!relay.registry().is_registered(&b.id));
    }

    #[test]
    fn events_from_unknown_connection_are_rejected() {
        let mut relay = relay();
        let ghost = ConnectionId::new();

        assert_eq!(relay.ping(&ghost), Err(RelayError::NotConnected(ghost)));
        assert_eq!(
            relay.join(&ghost, &change("lobby", "ghost")),
            Err(RelayError::NotConnected(ghost))
        );
        assert_eq!(
            relay.send_to(
                &ghost,
                RoomMessage {
                    room: "lobby".into(),
                    msg: json!(null),
                }
            ),
            Err(RelayError::NotConnected(ghost))
        );
        assert_eq!(relay.disconnect(&ghost), Err(RelayError::NotConnected(ghost)));
    }

    #[test]
    fn duplicate_connect_is_rejected() {
        let mut relay = relay();
        let a = connect(&mut relay);
        let (tx, _rx) = mpsc::unbounded_channel();

        assert_eq!(relay.connect(a.id, tx), Err(RelayError::AlreadyConnected(a.id)));
    }
}
