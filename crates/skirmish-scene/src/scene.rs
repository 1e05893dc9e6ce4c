use std::any::TypeId;
use std::collections::HashMap;

use glam::Vec2;

use crate::entity::{Entity, EntityAllocator};
use crate::layer::Layer;
use crate::storage::{ComponentStorage, SparseSet};

/// Built-in per-entity data every scene node carries.
#[derive(Debug, Clone, Default)]
struct Node {
    name: String,
    parent: Option<Entity>,
    children: Vec<Entity>,
    layer: Layer,
    tags: Vec<String>,
    position: Vec2,
}

/// The scene container. Owns all entities, their hierarchy and their components.
///
/// Single-threaded: callers hold `&mut Scene` for every mutation.
pub struct Scene {
    entities: EntityAllocator,
    nodes: SparseSet<Node>,
    components: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            nodes: SparseSet::new(),
            components: HashMap::new(),
        }
    }

    // ---- Entity management ----

    /// Spawn a new root entity with the given name.
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.entities.allocate();
        self.nodes.insert(
            entity.index,
            Node {
                name: name.into(),
                ..Default::default()
            },
        );
        entity
    }

    /// Spawn a new entity parented under `parent`, inheriting its layer and position.
    pub fn spawn_child(&mut self, parent: Entity, name: impl Into<String>) -> Entity {
        let (layer, position) = self
            .node(parent)
            .map(|node| (node.layer, node.position))
            .unwrap_or_default();
        let child = self.spawn(name);
        self.set_layer(child, layer);
        self.set_position(child, position);
        self.set_parent(child, Some(parent));
        child
    }

    /// Despawn an entity and its whole subtree.
    ///
    /// Returns every entity that was removed, the root first. Stale handles
    /// return an empty list.
    pub fn despawn(&mut self, entity: Entity) -> Vec<Entity> {
        if !self.is_alive(entity) {
            return Vec::new();
        }
        self.set_parent(entity, None);

        let mut removed = vec![entity];
        removed.extend(self.descendants(entity));
        for &doomed in &removed {
            self.entities.deallocate(doomed);
            self.nodes.take(doomed.index);
            for storage in self.components.values_mut() {
                storage.remove(doomed.index);
            }
        }
        removed
    }

    /// Check whether an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn node(&self, entity: Entity) -> Option<&Node> {
        if !self.is_alive(entity) {
            return None;
        }
        self.nodes.get(entity.index)
    }

    fn node_mut(&mut self, entity: Entity) -> Option<&mut Node> {
        if !self.is_alive(entity) {
            return None;
        }
        self.nodes.get_mut(entity.index)
    }

    // ---- Identity ----

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.node(entity).map(|node| node.name.as_str())
    }

    /// Human-readable label for logs, e.g. `Goblin#3v0`.
    pub fn label(&self, entity: Entity) -> String {
        match self.name(entity) {
            Some(name) => format!("{name}#{entity}"),
            None => format!("<despawned>#{entity}"),
        }
    }

    /// Layer of an entity. Despawned entities report the default layer.
    pub fn layer(&self, entity: Entity) -> Layer {
        self.node(entity).map(|node| node.layer).unwrap_or_default()
    }

    pub fn set_layer(&mut self, entity: Entity, layer: Layer) {
        if let Some(node) = self.node_mut(entity) {
            node.layer = layer;
        }
    }

    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<String>) {
        let tag = tag.into();
        if let Some(node) = self.node_mut(entity) {
            if !node.tags.contains(&tag) {
                node.tags.push(tag);
            }
        }
    }

    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.node(entity)
            .is_some_and(|node| node.tags.iter().any(|t| t == tag))
    }

    /// All live entities carrying `tag`, ordered by slot index.
    pub fn find_tagged(&self, tag: &str) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .nodes
            .indices()
            .iter()
            .filter_map(|&index| self.entities.entity_at(index))
            .filter(|&entity| self.has_tag(entity, tag))
            .collect();
        found.sort();
        found
    }

    // ---- Spatial ----

    /// World-space position. Despawned entities report the origin.
    pub fn position(&self, entity: Entity) -> Vec2 {
        self.node(entity).map(|node| node.position).unwrap_or_default()
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec2) {
        if let Some(node) = self.node_mut(entity) {
            node.position = position;
        }
    }

    /// Move an entity and its subtree by `offset`.
    pub fn translate(&mut self, entity: Entity, offset: Vec2) {
        if !self.is_alive(entity) {
            return;
        }
        let mut moved = vec![entity];
        moved.extend(self.descendants(entity));
        for e in moved {
            if let Some(node) = self.node_mut(e) {
                node.position += offset;
            }
        }
    }

    // ---- Hierarchy ----

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.node(entity).and_then(|node| node.parent)
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.node(entity)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Re-parent `child`. Returns `false` (and changes nothing) if either
    /// handle is stale or the move would create a cycle.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> bool {
        if !self.is_alive(child) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.is_alive(parent) || parent == child || self.is_descendant_of(parent, child) {
                return false;
            }
        }

        if let Some(old) = self.parent(child) {
            if let Some(node) = self.node_mut(old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(parent) = parent {
            if let Some(node) = self.node_mut(parent) {
                node.children.push(child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }
        true
    }

    /// Ancestor chain, nearest first.
    pub fn ancestors(&self, entity: Entity) -> Vec<Entity> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(entity);
        while let Some(ancestor) = cursor {
            chain.push(ancestor);
            cursor = self.parent(ancestor);
        }
        chain
    }

    /// Every entity below `entity`, depth-first pre-order. Excludes `entity`.
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<Entity> = self.children(entity).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Strict descendant test: `entity` lies somewhere below `ancestor`.
    pub fn is_descendant_of(&self, entity: Entity, ancestor: Entity) -> bool {
        let mut cursor = self.parent(entity);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    // ---- Component management ----

    fn storage_mut<T: 'static + Send + Sync>(&mut self) -> &mut SparseSet<T> {
        self.components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component type mismatch")
    }

    fn storage<T: 'static + Send + Sync>(&self) -> Option<&SparseSet<T>> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Insert a component on an entity. Replaces any existing component of the same type.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) {
        assert!(
            self.is_alive(entity),
            "cannot insert component on dead entity {entity:?}"
        );
        self.storage_mut::<T>().insert(entity.index, component);
    }

    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage::<T>()?.get(entity.index)
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .get_mut(entity.index)
    }

    /// Remove and return a component.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .take(entity.index)
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.is_alive(entity)
            && self
                .storage::<T>()
                .is_some_and(|storage| storage.contains(entity.index))
    }

    /// Every live entity carrying a `T`, ordered by slot index so iteration is
    /// deterministic regardless of insertion and removal history.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        let Some(storage) = self.storage::<T>() else {
            return Vec::new();
        };
        let mut found: Vec<Entity> = storage
            .indices()
            .iter()
            .filter_map(|&index| self.entities.entity_at(index))
            .collect();
        found.sort();
        found
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
