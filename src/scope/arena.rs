//! Arena-backed scope tree with cascading destruction
//!
//! Nodes are addressed by generated [`ScopeId`]s, never by references, so the
//! tree can be mutated while ids are held elsewhere (the dispatcher keeps one
//! id per live history entry). Entering a scope is an explicit
//! [`ScopeArena::build_child`] call; exiting is [`ScopeArena::destroy`],
//! which tears down every descendant before the node itself and drops the
//! registered services so RAII cleanup runs.

use std::any::Any;
use std::collections::HashMap;

use log::{debug, trace};
use thiserror::Error;

/// Errors from scope tree operations
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The referenced scope was already destroyed or never existed
    #[error("scope {0:?} is not alive")]
    NotAlive(ScopeId),

    /// A child with this name already exists under the parent
    #[error("scope {parent:?} already has a child named '{name}'")]
    DuplicateChild { parent: ScopeId, name: String },

    /// A service a screen depends on is missing from the parent scope
    #[error("required service '{name}' is unavailable")]
    ServiceUnavailable { name: String },
}

/// Generated identifier of one scope node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

/// Collects named services for a scope before it is built
#[derive(Default)]
pub struct ScopeBuilder {
    services: HashMap<String, Box<dyn Any>>,
}

impl ScopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service under `name`. A later registration with the same
    /// name replaces the earlier one.
    pub fn with_service<T: Any>(&mut self, name: impl Into<String>, service: T) -> &mut Self {
        self.services.insert(name.into(), Box::new(service));
        self
    }
}

/// Read-only view of one live scope, handed to screens during configuration
#[derive(Clone, Copy)]
pub struct ScopeRef<'a> {
    arena: &'a ScopeArena,
    id: ScopeId,
}

impl<'a> ScopeRef<'a> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Looks up a service by name on this scope, then on its ancestors.
    pub fn service<T: Any>(&self, name: &str) -> Option<&'a T> {
        let mut current = Some(self.id);
        while let Some(id) = current {
            let node = self.arena.nodes.get(&id.0)?;
            if let Some(service) = node.services.get(name) {
                return service.downcast_ref::<T>();
            }
            current = node.parent;
        }
        None
    }

    /// Like [`ScopeRef::service`] but failing the scope configuration when
    /// the service is missing.
    pub fn require<T: Any>(&self, name: &str) -> Result<&'a T, ScopeError> {
        self.service(name).ok_or_else(|| ScopeError::ServiceUnavailable {
            name: name.to_string(),
        })
    }
}

struct ScopeNode {
    name: String,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    services: HashMap<String, Box<dyn Any>>,
}

/// Owns every scope node and the parent/child links between them
#[derive(Default)]
pub struct ScopeArena {
    nodes: HashMap<u64, ScopeNode>,
    next_id: u64,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parentless scope. The navigator uses one of these as the
    /// root of its navigation scope tree.
    pub fn create_root(&mut self, name: impl Into<String>) -> ScopeId {
        let name = name.into();
        debug!("enter root scope '{name}'");
        self.insert(name, None, ScopeBuilder::new())
    }

    /// Builds a child scope under `parent` with the services collected in
    /// `builder`.
    pub fn build_child(
        &mut self,
        parent: ScopeId,
        name: impl Into<String>,
        builder: ScopeBuilder,
    ) -> Result<ScopeId, ScopeError> {
        let name = name.into();
        if !self.is_alive(parent) {
            return Err(ScopeError::NotAlive(parent));
        }
        if self.find_child(parent, &name).is_some() {
            return Err(ScopeError::DuplicateChild { parent, name });
        }

        debug!("enter scope '{name}' under {parent:?}");
        let id = self.insert(name, Some(parent), builder);
        if let Some(node) = self.nodes.get_mut(&parent.0) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Finds a direct child of `parent` by name.
    pub fn find_child(&self, parent: ScopeId, name: &str) -> Option<ScopeId> {
        let node = self.nodes.get(&parent.0)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.nodes.get(&child.0).is_some_and(|n| n.name == name))
    }

    /// Destroys a scope and every descendant, children before parents and
    /// most recently added children first. Services are dropped as each node
    /// is removed.
    pub fn destroy(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        if !self.is_alive(id) {
            return Err(ScopeError::NotAlive(id));
        }

        // Unlink from the parent first so the subtree is unreachable while
        // it is being torn down.
        if let Some(parent) = self.nodes.get(&id.0).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(&parent.0) {
                parent_node.children.retain(|child| *child != id);
            }
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get(&current.0) else {
                continue;
            };
            if node.children.is_empty() {
                let node = self.nodes.remove(&current.0);
                if let Some(node) = node {
                    debug!("exit scope '{}'", node.name);
                }
            } else {
                pending.push(current);
                // LIFO: newest child torn down first
                pending.extend(node.children.iter().rev().copied());
                if let Some(node) = self.nodes.get_mut(&current.0) {
                    node.children.clear();
                }
            }
        }
        Ok(())
    }

    pub fn is_alive(&self, id: ScopeId) -> bool {
        self.nodes.contains_key(&id.0)
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.nodes.get(&id.0).and_then(|n| n.parent)
    }

    pub fn name(&self, id: ScopeId) -> Option<&str> {
        self.nodes.get(&id.0).map(|n| n.name.as_str())
    }

    /// Number of live scopes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read-only handle to a live scope.
    pub fn scope_ref(&self, id: ScopeId) -> Result<ScopeRef<'_>, ScopeError> {
        if !self.is_alive(id) {
            return Err(ScopeError::NotAlive(id));
        }
        Ok(ScopeRef { arena: self, id })
    }

    fn insert(&mut self, name: String, parent: Option<ScopeId>, builder: ScopeBuilder) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;
        trace!("scope {id:?} = '{name}'");
        self.nodes.insert(
            id.0,
            ScopeNode {
                name,
                parent,
                children: Vec::new(),
                services: builder.services,
            },
        );
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Increments a shared counter when dropped, to observe service teardown.
    struct DropCounter(Rc<RefCell<Vec<&'static str>>>, &'static str);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.borrow_mut().push(self.1);
        }
    }

    #[test]
    fn build_and_find_child() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        let child = arena
            .build_child(root, "child", ScopeBuilder::new())
            .unwrap();

        assert!(arena.is_alive(child));
        assert_eq!(arena.find_child(root, "child"), Some(child));
        assert_eq!(arena.parent(child), Some(root));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn duplicate_child_name_rejected() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        arena.build_child(root, "a", ScopeBuilder::new()).unwrap();

        let result = arena.build_child(root, "a", ScopeBuilder::new());
        assert!(matches!(result, Err(ScopeError::DuplicateChild { .. })));
    }

    #[test]
    fn child_of_dead_parent_rejected() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        let child = arena.build_child(root, "a", ScopeBuilder::new()).unwrap();
        arena.destroy(child).unwrap();

        let result = arena.build_child(child, "b", ScopeBuilder::new());
        assert!(matches!(result, Err(ScopeError::NotAlive(_))));
    }

    #[test]
    fn destroy_cascades_to_descendants() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        let a = arena.build_child(root, "a", ScopeBuilder::new()).unwrap();
        let b = arena.build_child(a, "b", ScopeBuilder::new()).unwrap();
        let c = arena.build_child(b, "c", ScopeBuilder::new()).unwrap();

        arena.destroy(a).unwrap();

        assert!(arena.is_alive(root));
        assert!(!arena.is_alive(a));
        assert!(!arena.is_alive(b));
        assert!(!arena.is_alive(c));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.find_child(root, "a"), None);
    }

    #[test]
    fn destroy_drops_services_children_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");

        let mut builder = ScopeBuilder::new();
        builder.with_service("probe", DropCounter(log.clone(), "parent"));
        let parent = arena.build_child(root, "parent", builder).unwrap();

        let mut builder = ScopeBuilder::new();
        builder.with_service("probe", DropCounter(log.clone(), "child"));
        arena.build_child(parent, "child", builder).unwrap();

        arena.destroy(parent).unwrap();
        assert_eq!(*log.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn destroy_dead_scope_is_an_error() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        arena.destroy(root).unwrap();

        assert!(matches!(arena.destroy(root), Err(ScopeError::NotAlive(_))));
    }

    #[test]
    fn service_lookup_walks_ancestors() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");

        let mut builder = ScopeBuilder::new();
        builder.with_service("answer", 42u32);
        let mid = arena.build_child(root, "mid", builder).unwrap();
        let leaf = arena.build_child(mid, "leaf", ScopeBuilder::new()).unwrap();

        let leaf_ref = arena.scope_ref(leaf).unwrap();
        assert_eq!(leaf_ref.service::<u32>("answer"), Some(&42));
        assert_eq!(leaf_ref.service::<u32>("missing"), None);
        assert!(leaf_ref.require::<u32>("answer").is_ok());
        assert!(matches!(
            leaf_ref.require::<u32>("missing"),
            Err(ScopeError::ServiceUnavailable { .. })
        ));
    }

    #[test]
    fn wrong_service_type_is_none() {
        let mut arena = ScopeArena::new();
        let root = arena.create_root("root");
        let mut builder = ScopeBuilder::new();
        builder.with_service("answer", 42u32);
        let child = arena.build_child(root, "c", builder).unwrap();

        let child_ref = arena.scope_ref(child).unwrap();
        assert_eq!(child_ref.service::<String>("answer"), None);
    }
}
