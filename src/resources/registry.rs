//! Arena of shared scene resources addressed by [`ResourceHandle`].
//!
//! Every visual kind (stem, petal, pistil, ground, particle) is allocated
//! exactly once when the scene is built. Entities keep handles, never the
//! resources themselves, so releasing the registry frees everything the
//! scene allocated in one place.

use anyhow::bail;

/// Non-owning index into a [`ResourceRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(usize);

impl ResourceHandle {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stem,
    Petal,
    Pistil,
    Ground,
    Particle,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Stem,
        ResourceKind::Petal,
        ResourceKind::Pistil,
        ResourceKind::Ground,
        ResourceKind::Particle,
    ];
}

/// Anything that describes a resource of a given kind.
pub trait Template {
    fn kind(&self) -> ResourceKind;
}

impl Template for ResourceKind {
    fn kind(&self) -> ResourceKind {
        *self
    }
}

pub struct ResourceRegistry<R> {
    kinds: Vec<ResourceKind>,
    entries: Vec<Option<R>>,
}

impl<R> ResourceRegistry<R> {
    /// Allocates one resource per template, in template order.
    ///
    /// Fails if two templates share a kind or if any allocation fails; the
    /// resources allocated before the failure are dropped.
    pub fn build<T: Template>(
        templates: &[T],
        mut alloc: impl FnMut(&T) -> anyhow::Result<R>,
    ) -> anyhow::Result<Self> {
        let mut kinds = Vec::with_capacity(templates.len());
        for template in templates {
            let kind = template.kind();
            if kinds.contains(&kind) {
                bail!("Resource template for {:?} is defined twice", kind);
            }
            kinds.push(kind);
        }

        let mut entries = Vec::with_capacity(templates.len());
        for template in templates {
            let resource = alloc(template)
                .map_err(|e| e.context(format!("Allocating {:?} failed", template.kind())))?;
            entries.push(Some(resource));
        }
        log::debug!("Allocated {} scene resources", entries.len());
        Ok(Self { kinds, entries })
    }

    pub fn handle(&self, kind: ResourceKind) -> Option<ResourceHandle> {
        self.kinds
            .iter()
            .position(|k| *k == kind)
            .map(ResourceHandle::new)
    }

    /// The resource behind `handle`, `None` once released.
    pub fn get(&self, handle: ResourceHandle) -> Option<&R> {
        self.entries.get(handle.index()).and_then(Option::as_ref)
    }

    pub fn kind(&self, handle: ResourceHandle) -> Option<ResourceKind> {
        self.kinds.get(handle.index()).copied()
    }

    /// Number of resources still held.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hands every held resource to `free` and returns how many were freed.
    /// A second call frees nothing.
    pub fn release(&mut self, mut free: impl FnMut(R)) -> usize {
        let mut freed = 0;
        for entry in self.entries.iter_mut() {
            if let Some(resource) = entry.take() {
                free(resource);
                freed += 1;
            }
        }
        freed
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceHandle, &R)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|r| (ResourceHandle::new(i), r)))
    }
}

/// Handles of the five kinds every garden scene needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneHandles {
    pub stem: ResourceHandle,
    pub petal: ResourceHandle,
    pub pistil: ResourceHandle,
    pub ground: ResourceHandle,
    pub particle: ResourceHandle,
}

impl SceneHandles {
    pub fn from_registry<R>(registry: &ResourceRegistry<R>) -> anyhow::Result<Self> {
        let lookup = |kind| match registry.handle(kind) {
            Some(handle) => Ok(handle),
            None => Err(anyhow::anyhow!("No {:?} resource in the registry", kind)),
        };
        Ok(Self {
            stem: lookup(ResourceKind::Stem)?,
            petal: lookup(ResourceKind::Petal)?,
            pistil: lookup(ResourceKind::Pistil)?,
            ground: lookup(ResourceKind::Ground)?,
            particle: lookup(ResourceKind::Particle)?,
        })
    }

    /// Handles in registry order, for building a registry in tests.
    pub fn sequential() -> Self {
        Self {
            stem: ResourceHandle::new(0),
            petal: ResourceHandle::new(1),
            pistil: ResourceHandle::new(2),
            ground: ResourceHandle::new(3),
            particle: ResourceHandle::new(4),
        }
    }
}
