use std::collections::BTreeMap;

use crate::entity::{ClientId, Projectile, Spaceship};

/// Entities known to the client, written by the message layer.
///
/// Ships are keyed by client id and iterated in id order so draw order is stable.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    spaceships: BTreeMap<ClientId, Spaceship>,
    projectiles: Vec<Projectile>,
    client_id: Option<ClientId>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id assigned to this client by the server; selects the tracked ship.
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn set_client_id(&mut self, id: ClientId) {
        self.client_id = Some(id);
    }

    /// The ship the camera follows, if this client has one.
    pub fn tracked_spaceship(&self) -> Option<&Spaceship> {
        self.client_id.and_then(|id| self.spaceships.get(&id))
    }

    /// Inserts or replaces the ship with `ship.id`.
    pub fn upsert_spaceship(&mut self, ship: Spaceship) -> Option<Spaceship> {
        self.spaceships.insert(ship.id, ship)
    }

    pub fn remove_spaceship(&mut self, id: ClientId) -> Option<Spaceship> {
        self.spaceships.remove(&id)
    }

    pub fn spaceship(&self, id: ClientId) -> Option<&Spaceship> {
        self.spaceships.get(&id)
    }

    pub fn spaceship_mut(&mut self, id: ClientId) -> Option<&mut Spaceship> {
        self.spaceships.get_mut(&id)
    }

    pub fn spaceships(&self) -> impl Iterator<Item = &Spaceship> {
        self.spaceships.values()
    }

    pub fn spaceships_mut(&mut self) -> impl Iterator<Item = &mut Spaceship> {
        self.spaceships.values_mut()
    }

    pub fn spaceship_count(&self) -> usize {
        self.spaceships.len()
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.projectiles
    }

    /// Drops projectiles whose lifetime has run out.
    pub fn remove_expired_projectiles(&mut self) -> usize {
        let before = self.projectiles.len();
        self.projectiles.retain(|p| !p.is_expired());
        before - self.projectiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use superstellar_engine::coords::Vec2;

    #[test]
    fn tracked_ship_follows_client_id() {
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(1, Vec2::new(10.0, 0.0)));
        state.upsert_spaceship(Spaceship::new(2, Vec2::new(20.0, 0.0)));
        assert!(state.tracked_spaceship().is_none());

        state.set_client_id(2);
        assert_eq!(state.tracked_spaceship().map(|s| s.id), Some(2));

        state.remove_spaceship(2);
        assert!(state.tracked_spaceship().is_none());
        assert_eq!(state.spaceship_count(), 1);
    }

    #[test]
    fn ships_iterate_in_id_order() {
        let mut state = GameState::new();
        for id in [5, 1, 3] {
            state.upsert_spaceship(Spaceship::new(id, Vec2::zero()));
        }
        let ids: Vec<_> = state.spaceships().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn expired_projectiles_are_removed() {
        let mut state = GameState::new();
        state.add_projectile(Projectile::new(1, Vec2::zero(), Vec2::zero(), 0.0));
        state.add_projectile(Projectile::new(2, Vec2::zero(), Vec2::zero(), 1.0));
        assert_eq!(state.remove_expired_projectiles(), 1);
        assert_eq!(state.projectiles()[0].id, 2);
    }
}
