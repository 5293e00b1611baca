//! The endpoint/pool model: endpoints grouped into redundancy groups,
//! groups ordered inside pools, one pool per purpose (view reads vs
//! transaction broadcast).

use std::{collections::BTreeMap, sync::Arc};

use crate::rpc::Endpoint;

/// A set of interchangeable endpoints raced against each other.
#[derive(Debug, Clone)]
pub struct RedundancyGroup {
    pub key: String,
    pub endpoints: Vec<Arc<Endpoint>>,
}

impl RedundancyGroup {
    #[must_use]
    pub fn new(key: impl Into<String>, endpoints: Vec<Arc<Endpoint>>) -> Self {
        Self { key: key.into(), endpoints }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// An ordered list of redundancy groups for one purpose.
///
/// Groups are consulted in key order (keys are configured as "1", "2", ...);
/// a later group is only tried after the one before it failed in aggregate.
#[derive(Debug, Clone)]
pub struct Pool {
    pub name: String,
    groups: Vec<RedundancyGroup>,
}

impl Pool {
    /// Builds a pool from keyed groups; the `BTreeMap` fixes the fallback
    /// order deterministically.
    #[must_use]
    pub fn new(name: impl Into<String>, groups: BTreeMap<String, Vec<Arc<Endpoint>>>) -> Self {
        let groups = groups
            .into_iter()
            .map(|(key, endpoints)| RedundancyGroup::new(key, endpoints))
            .collect();
        Self { name: name.into(), groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[RedundancyGroup] {
        &self.groups
    }

    /// Every endpoint of every group, in group order.
    pub fn all_endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.groups.iter().flat_map(|g| g.endpoints.iter())
    }

    /// `true` when no group holds a single endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(RedundancyGroup::is_empty)
    }
}

/// The materialized pools the engine operates on after setup.
#[derive(Debug, Clone)]
pub struct Pools {
    pub view: Pool,
    pub transaction: Pool,
}
