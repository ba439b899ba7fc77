//! Arena - authoritative event orchestration
//!
//! One inbound transport event at a time flows through here: mutate the
//! session registry, then push the reactive broadcasts through the
//! connection hub. Unknown identities degrade to a no-op; one bad client
//! event never takes down the shared session.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::game::combat::{self, DamageOutcome, HitOutcome};
use crate::game::registry::{PlayerRecord, PositionUpdate, SessionRegistry};
use crate::game::spawn::SpawnSelector;
use crate::util::time::unix_millis;
use crate::world::WorldSnapshot;
use crate::ws::hub::ConnectionHub;
use crate::ws::protocol::{ServerMsg, Vec3};

/// The authoritative arena shared by every connection handler
pub struct Arena {
    registry: Arc<SessionRegistry>,
    spawns: SpawnSelector,
    hub: Arc<ConnectionHub>,
    world: Arc<WorldSnapshot>,
}

impl Arena {
    pub fn new(
        registry: Arc<SessionRegistry>,
        spawns: SpawnSelector,
        hub: Arc<ConnectionHub>,
        world: Arc<WorldSnapshot>,
    ) -> Self {
        Self {
            registry,
            spawns,
            hub,
            world,
        }
    }

    /// `player:join` - create the record, hand the joiner the terrain and
    /// the current player list, announce to everyone else
    pub fn handle_join(&self, id: Uuid, username: String) {
        let spawn = self.spawns.pick_initial_spawn();
        let record = self.registry.join(id, username, spawn);

        info!(player_id = %id, username = %record.username, "Player joined");

        let timestamp = record.last_update;

        self.hub.send_to(
            &id,
            ServerMsg::GameStart {
                player_id: id,
                position: spawn,
                health: record.health,
                timestamp,
                terrain: (*self.world).clone(),
            },
        );

        self.hub.broadcast_except(
            &id,
            &ServerMsg::PlayerJoined {
                player_id: id,
                username: record.username.clone(),
                position: spawn,
                health: record.health,
                timestamp,
            },
        );

        self.hub.send_to(
            &id,
            ServerMsg::PlayerList {
                players: self.registry.snapshot(),
            },
        );
    }

    /// `player:update` - fire-and-forget telemetry; relayed to everyone
    /// except the mover. Unknown senders are dropped silently.
    pub fn handle_update(&self, id: Uuid, update: PositionUpdate) {
        if !self.registry.apply_update(id, &update) {
            debug!(player_id = %id, "Update from unknown player ignored");
            return;
        }

        self.hub.broadcast_except(
            &id,
            &ServerMsg::PlayerUpdate {
                player_id: id,
                position: update.position,
                rotation: update.rotation,
                velocity: update.velocity,
                timestamp: unix_millis(),
            },
        );
    }

    /// `player:shoot` - apply fixed damage to the target. A non-lethal hit
    /// broadcasts `player:hit` plus a full state snapshot; a lethal hit
    /// broadcasts `player:died` and `game:over` and leaves the snapshot to
    /// the periodic loop. Shooting yourself is not special-cased.
    pub fn handle_shoot(&self, shooter_id: Uuid, target_id: Uuid) -> HitOutcome {
        if !self.registry.contains(shooter_id) {
            debug!(shooter_id = %shooter_id, "Shot from unknown player ignored");
            return HitOutcome::Ignored;
        }

        let timestamp = unix_millis();

        match self.registry.apply_damage(target_id, combat::DAMAGE_PER_HIT) {
            DamageOutcome::Absorbed { health } => {
                self.hub.broadcast_all(&ServerMsg::PlayerHit {
                    target_id,
                    shooter_id,
                    health,
                    damage: combat::DAMAGE_PER_HIT,
                    timestamp,
                });
                self.hub.broadcast_all(&ServerMsg::PlayersState {
                    players: self.registry.snapshot(),
                });
                HitOutcome::Hit { health }
            }
            DamageOutcome::Lethal => {
                info!(dead_id = %target_id, killer_id = %shooter_id, "Player died");
                self.hub.broadcast_all(&ServerMsg::PlayerDied {
                    dead_id: target_id,
                    killer_id: shooter_id,
                    health: 0,
                    timestamp,
                });
                self.hub.broadcast_all(&ServerMsg::GameOver {
                    dead_id: target_id,
                    killer_id: shooter_id,
                    timestamp,
                });
                HitOutcome::Killed
            }
            DamageOutcome::AlreadyDead | DamageOutcome::Unknown => {
                debug!(target_id = %target_id, "Shot against unavailable target ignored");
                HitOutcome::Ignored
            }
        }
    }

    /// `player:respawn` - reset at a spawn point clear of other players and
    /// announce the new position to everyone
    pub fn handle_respawn(&self, id: Uuid) -> Option<Vec3> {
        if !self.registry.contains(id) {
            debug!(player_id = %id, "Respawn from unknown player ignored");
            return None;
        }

        let occupied = self.registry.positions_except(id);
        let spawn = self.spawns.pick_safe_spawn(&occupied);

        if !self.registry.respawn(id, spawn) {
            return None;
        }

        info!(player_id = %id, "Player respawned");

        self.hub.broadcast_all(&ServerMsg::PlayerRespawned {
            player_id: id,
            position: spawn,
            health: combat::MAX_HEALTH,
            timestamp: unix_millis(),
        });

        Some(spawn)
    }

    /// Transport-level disconnect - remove the record and tell the others.
    /// Safe to call more than once; only the first removal broadcasts.
    pub fn handle_disconnect(&self, id: Uuid) -> Option<PlayerRecord> {
        let record = self.registry.remove(id)?;

        info!(player_id = %id, username = %record.username, "Player left");

        self.hub.broadcast_all(&ServerMsg::PlayerLeft {
            player_id: id,
            timestamp: unix_millis(),
        });

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combat::MAX_HEALTH;
    use crate::game::spawn::default_respawn_points;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn arena() -> (Arena, Arc<ConnectionHub>, Arc<SessionRegistry>) {
        let registry = Arc::new(SessionRegistry::new());
        let hub = Arc::new(ConnectionHub::new());
        let world = Arc::new(WorldSnapshot::generate(Some(7)));
        let arena = Arena::new(
            registry.clone(),
            SpawnSelector::seeded(default_respawn_points(), 42),
            hub.clone(),
            world,
        );
        (arena, hub, registry)
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMsg>) -> Vec<ServerMsg> {
        let mut msgs = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    fn count_died(msgs: &[ServerMsg]) -> usize {
        msgs.iter()
            .filter(|m| matches!(m, ServerMsg::PlayerDied { .. }))
            .count()
    }

    #[test]
    fn join_sends_start_and_list_to_joiner_and_announces_to_others() {
        let (arena, hub, _) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);

        arena.handle_join(a, "alpha".into());

        let msgs_a = drain(&mut rx_a);
        assert!(matches!(msgs_a[0], ServerMsg::GameStart { player_id, health, .. }
            if player_id == a && health == MAX_HEALTH));
        assert!(matches!(&msgs_a[1], ServerMsg::PlayerList { players }
            if players.len() == 1 && players.contains_key(&a)));
        // The joiner is not told about itself via player:joined; the other
        // connection is
        assert!(!msgs_a
            .iter()
            .any(|m| matches!(m, ServerMsg::PlayerJoined { .. })));
        let msgs_b = drain(&mut rx_b);
        assert!(matches!(msgs_b[0], ServerMsg::PlayerJoined { player_id, .. }
            if player_id == a));

        arena.handle_join(b, "bravo".into());

        let msgs_a = drain(&mut rx_a);
        assert!(msgs_a.iter().any(|m| matches!(m, ServerMsg::PlayerJoined { player_id, .. }
            if *player_id == b)));

        let msgs_b = drain(&mut rx_b);
        assert!(matches!(msgs_b.last().unwrap(), ServerMsg::PlayerList { players }
            if players.len() == 2));
    }

    #[test]
    fn update_relays_to_others_but_not_the_mover() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());
        drain(&mut rx_a);
        drain(&mut rx_b);

        let moved = Vec3::new(1.0, 2.0, 3.0);
        arena.handle_update(
            a,
            PositionUpdate {
                position: Some(moved),
                ..Default::default()
            },
        );

        assert!(drain(&mut rx_a).is_empty());
        let msgs_b = drain(&mut rx_b);
        assert!(matches!(msgs_b[0], ServerMsg::PlayerUpdate { player_id, position, .. }
            if player_id == a && position == Some(moved)));
        assert_eq!(registry.get(a).unwrap().position, moved);
    }

    #[test]
    fn update_from_unknown_sender_emits_nothing() {
        let (arena, hub, _) = arena();
        let a = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        arena.handle_join(a, "alpha".into());
        drain(&mut rx_a);

        arena.handle_update(
            Uuid::new_v4(),
            PositionUpdate {
                position: Some(Vec3::ZERO),
                ..Default::default()
            },
        );

        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn non_lethal_hit_broadcasts_hit_then_state_to_everyone() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());
        drain(&mut rx_a);
        drain(&mut rx_b);

        let outcome = arena.handle_shoot(a, b);
        assert_eq!(outcome, HitOutcome::Hit { health: 95 });
        assert_eq!(registry.get(b).unwrap().health, 95);

        for rx in [&mut rx_a, &mut rx_b] {
            let msgs = drain(rx);
            assert!(matches!(msgs[0], ServerMsg::PlayerHit { target_id, shooter_id, health, damage, .. }
                if target_id == b && shooter_id == a && health == 95 && damage == 5));
            assert!(matches!(&msgs[1], ServerMsg::PlayersState { players }
                if players[&b].health == 95));
        }
    }

    #[test]
    fn twenty_shots_produce_exactly_one_death_and_no_negative_health() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());
        drain(&mut rx_a);

        let mut outcomes = Vec::new();
        for _ in 0..20 {
            outcomes.push(arena.handle_shoot(a, b));
        }

        assert_eq!(registry.get(b).unwrap().health, 0);
        assert_eq!(outcomes[19], HitOutcome::Killed);
        assert!(outcomes[..19]
            .iter()
            .all(|o| matches!(o, HitOutcome::Hit { .. })));

        let msgs = drain(&mut rx_a);
        assert_eq!(count_died(&msgs), 1);
        assert_eq!(
            msgs.iter()
                .filter(|m| matches!(m, ServerMsg::GameOver { .. }))
                .count(),
            1
        );
        // Death relies on the periodic loop for the state snapshot
        assert!(!matches!(msgs.last().unwrap(), ServerMsg::PlayersState { .. }));
    }

    #[test]
    fn shooting_a_dead_target_is_ignored_without_a_second_death() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());

        for _ in 0..20 {
            arena.handle_shoot(a, b);
        }
        drain(&mut rx_a);

        assert_eq!(arena.handle_shoot(a, b), HitOutcome::Ignored);
        assert_eq!(registry.get(b).unwrap().health, 0);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn shots_with_unknown_ids_are_ignored() {
        let (arena, hub, _) = arena();
        let a = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        arena.handle_join(a, "alpha".into());
        drain(&mut rx_a);

        // Unknown shooter
        assert_eq!(arena.handle_shoot(Uuid::new_v4(), a), HitOutcome::Ignored);
        // Unknown target
        assert_eq!(arena.handle_shoot(a, Uuid::new_v4()), HitOutcome::Ignored);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn self_shot_is_not_special_cased() {
        let (arena, _, registry) = arena();
        let a = Uuid::new_v4();
        arena.handle_join(a, "alpha".into());

        assert_eq!(arena.handle_shoot(a, a), HitOutcome::Hit { health: 95 });
        assert_eq!(registry.get(a).unwrap().health, 95);
    }

    #[test]
    fn respawn_restores_health_and_broadcasts_to_all() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());

        for _ in 0..20 {
            arena.handle_shoot(a, b);
        }
        drain(&mut rx_a);
        drain(&mut rx_b);

        let spawn = arena.handle_respawn(b).expect("known player respawns");

        let record = registry.get(b).unwrap();
        assert_eq!(record.health, MAX_HEALTH);
        assert_eq!(record.position, spawn);

        let history = registry.history(b).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].position, spawn);

        for rx in [&mut rx_a, &mut rx_b] {
            let msgs = drain(rx);
            assert!(matches!(msgs[0], ServerMsg::PlayerRespawned { player_id, position, health, .. }
                if player_id == b && position == spawn && health == MAX_HEALTH));
        }
    }

    #[test]
    fn respawn_from_unknown_player_is_ignored() {
        let (arena, hub, _) = arena();
        let a = Uuid::new_v4();
        let mut rx_a = hub.register(a);
        arena.handle_join(a, "alpha".into());
        drain(&mut rx_a);

        assert!(arena.handle_respawn(Uuid::new_v4()).is_none());
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn disconnect_broadcasts_left_exactly_once() {
        let (arena, hub, registry) = arena();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_b = hub.register(b);
        arena.handle_join(a, "alpha".into());
        arena.handle_join(b, "bravo".into());
        drain(&mut rx_b);

        assert!(arena.handle_disconnect(a).is_some());
        assert!(registry.get(a).is_none());

        // Double disconnect: no-op, no duplicate broadcast
        assert!(arena.handle_disconnect(a).is_none());

        let msgs = drain(&mut rx_b);
        assert_eq!(
            msgs.iter()
                .filter(|m| matches!(m, ServerMsg::PlayerLeft { player_id, .. } if *player_id == a))
                .count(),
            1
        );
    }
}
