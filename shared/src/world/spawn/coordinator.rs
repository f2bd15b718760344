use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{
    address::Address64,
    types::UserId,
    world::{
        component::transform::Transform,
        registry::EntityRegistry,
        spawn::{
            error::SpawnError,
            packets::{DestroyEntity, SpawnEntity},
            store::{ElementRef, PrefabRef, Store},
        },
    },
};

/// Creates and disposes the local objects behind spawned entities.
pub trait Instantiator {
    type Instance;

    fn instantiate(
        &mut self,
        prefab: &PrefabRef,
        address: Address64,
        transform: &Transform,
    ) -> Self::Instance;

    fn dispose(&mut self, address: Address64, instance: Self::Instance);
}

/// Lifecycle of one address. `Destroyed` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnState {
    Unspawned,
    Spawned,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned,
    /// Duplicate spawn; the existing entity was kept
    AlreadySpawned,
    /// Spawn for an address destroyed earlier this session
    AlreadyDestroyed,
}

pub struct SpawnedEntity<T> {
    pub element: String,
    pub owner: UserId,
    pub instance: T,
}

/// Runs the spawn/destroy protocol for dynamically created entities.
pub struct SpawnCoordinator<T> {
    local_user: UserId,
    entities: EntityRegistry<Address64, SpawnedEntity<T>>,
    destroyed: HashSet<Address64>,
}

impl<T> SpawnCoordinator<T> {
    pub fn new(local_user: UserId) -> Self {
        Self {
            local_user,
            entities: EntityRegistry::new(),
            destroyed: HashSet::new(),
        }
    }

    pub fn state(&self, address: &Address64) -> SpawnState {
        if self.entities.contains(address) {
            SpawnState::Spawned
        } else if self.destroyed.contains(address) {
            SpawnState::Destroyed
        } else {
            SpawnState::Unspawned
        }
    }

    /// Instantiates and registers an entity locally. Returns the packet to
    /// broadcast when `broadcast` is set.
    ///
    /// Nothing is instantiated or registered if `element` does not resolve.
    #[allow(clippy::too_many_arguments)]
    pub fn request_spawn<I: Instantiator<Instance = T>>(
        &mut self,
        store: &Store,
        instantiator: &mut I,
        element: ElementRef,
        owner: UserId,
        address: Address64,
        transform: Transform,
        broadcast: bool,
    ) -> Result<Option<SpawnEntity>, SpawnError> {
        let Some(resolved) = store.resolve(&element) else {
            warn!("cannot spawn unknown store element {}", element);
            return Err(SpawnError::UnresolvedStoreReference {
                element,
                available: store.len(),
            });
        };
        if self.state(&address) != SpawnState::Unspawned {
            return Err(SpawnError::AddressInUse { address });
        }

        let prefab = resolved.variant_for(owner == self.local_user);
        let instance = instantiator.instantiate(prefab, address, &transform);
        self.entities.register(
            address,
            SpawnedEntity {
                element: resolved.name.clone(),
                owner,
                instance,
            },
        );
        info!("spawned {} at {} for user {}", resolved.name, address, owner);

        Ok(broadcast.then_some(SpawnEntity {
            address,
            element,
            owner,
            transform,
        }))
    }

    /// Handles a spawn announced by another peer. Duplicates and spawns of
    /// destroyed addresses change nothing.
    pub fn apply_spawn<I: Instantiator<Instance = T>>(
        &mut self,
        store: &Store,
        instantiator: &mut I,
        packet: &SpawnEntity,
    ) -> Result<SpawnOutcome, SpawnError> {
        match self.state(&packet.address) {
            SpawnState::Spawned => {
                debug!("duplicate spawn for {} ignored", packet.address);
                return Ok(SpawnOutcome::AlreadySpawned);
            }
            SpawnState::Destroyed => {
                debug!("spawn for destroyed {} ignored", packet.address);
                return Ok(SpawnOutcome::AlreadyDestroyed);
            }
            SpawnState::Unspawned => {}
        }

        self.request_spawn(
            store,
            instantiator,
            packet.element.clone(),
            packet.owner,
            packet.address,
            packet.transform,
            false,
        )?;
        Ok(SpawnOutcome::Spawned)
    }

    /// Disposes a spawned entity. Returns the packet to broadcast when one
    /// was destroyed and `broadcast` is set.
    pub fn request_destroy<I: Instantiator<Instance = T>>(
        &mut self,
        instantiator: &mut I,
        address: &Address64,
        broadcast: bool,
    ) -> Option<DestroyEntity> {
        if !self.destroy_local(instantiator, address) {
            return None;
        }
        broadcast.then_some(DestroyEntity { address: *address })
    }

    /// Handles a destroy announced by another peer. Unknown or already
    /// destroyed addresses are ignored.
    pub fn apply_destroy<I: Instantiator<Instance = T>>(
        &mut self,
        instantiator: &mut I,
        packet: &DestroyEntity,
    ) -> bool {
        self.destroy_local(instantiator, &packet.address)
    }

    /// Disposes a spawned entity without producing a packet
    pub fn destroy_local<I: Instantiator<Instance = T>>(
        &mut self,
        instantiator: &mut I,
        address: &Address64,
    ) -> bool {
        let Some(entity) = self.entities.unregister(address) else {
            debug!("destroy for {} ignored, not spawned", address);
            return false;
        };
        instantiator.dispose(*address, entity.instance);
        self.destroyed.insert(*address);
        info!("destroyed {} at {}", entity.element, address);
        true
    }

    pub fn get(&self, address: &Address64) -> Option<&SpawnedEntity<T>> {
        self.entities.get(address)
    }

    pub fn get_mut(&mut self, address: &Address64) -> Option<&mut SpawnedEntity<T>> {
        self.entities.get_mut(address)
    }

    pub fn owned_by(&self, user: UserId) -> Vec<Address64> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.owner == user)
            .map(|(address, _)| *address)
            .collect()
    }

    pub fn addresses(&self) -> Vec<Address64> {
        self.entities.addresses()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Disposes every entity and forgets destroyed addresses. Session end.
    pub fn clear_all<I: Instantiator<Instance = T>>(&mut self, instantiator: &mut I) -> usize {
        self.destroyed.clear();
        self.entities
            .clear_all_with(|address, entity| instantiator.dispose(address, entity.instance))
    }
}
