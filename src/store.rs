//! Surface store
//!
//! Holds the current forest for every named surface plus the shared data
//! snapshot. Updates are whole replacements, never merges: a surface
//! update swaps that surface's forest, a data update swaps the snapshot
//! and rebuilds every forest against it. Each swap assigns the surface a
//! fresh monotonic sequence number, which is what the layout packer uses
//! for recency ordering and eviction.

use crate::forest::{build, ResolvedNode};
use crate::schema::{parse_components, Component, Message};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
pub struct SurfaceEntry {
    pub name: String,
    pub forest: Vec<ResolvedNode>,
    /// Bumped on every forest replacement; never reset.
    pub seq: u64,
    /// Set by the advisory begin-rendering signal. The forest exists as
    /// soon as components do, with or without this.
    pub rendering: bool,
}

#[derive(Debug, Default)]
pub struct SurfaceStore {
    entries: HashMap<String, SurfaceEntry>,
    /// Raw component lists, kept so a data update can rebuild.
    components: HashMap<String, Vec<Component>>,
    /// First-seen order; this is the natural flow order for stacked mode.
    arrival: Vec<String>,
    data: Value,
    next_seq: u64,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            components: HashMap::new(),
            arrival: Vec::new(),
            data: Value::Null,
            next_seq: 1,
        }
    }

    /// Apply one backend message.
    pub fn apply(&mut self, message: Message) {
        match message {
            Message::SurfaceUpdate { surface, components, .. } => {
                self.apply_surface_update(surface, parse_components(&components));
            }
            Message::DataModelUpdate { data, .. } => {
                self.apply_data_update(data);
            }
            Message::BeginRendering { surface, .. } => {
                self.begin_rendering(&surface);
            }
        }
    }

    /// Full replacement of one surface's flat component list.
    pub fn apply_surface_update(&mut self, name: String, components: Vec<Component>) {
        let forest = build(&components, &self.data);
        let seq = self.bump();
        debug!(
            "Surface {} updated: {} records, {} roots, seq {}",
            name,
            components.len(),
            forest.len(),
            seq
        );
        self.components.insert(name.clone(), components);
        if !self.arrival.contains(&name) {
            self.arrival.push(name.clone());
        }
        let rendering = self.entries.get(&name).map(|e| e.rendering).unwrap_or(false);
        self.entries.insert(
            name.clone(),
            SurfaceEntry { name, forest, seq, rendering },
        );
    }

    /// Full replacement of the shared data snapshot. Every surface is
    /// rebuilt against it, oldest first, so relative recency order among
    /// surfaces survives the mass rebuild.
    pub fn apply_data_update(&mut self, data: Value) {
        self.data = data;
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_by_key(|n| self.entries[n].seq);
        for name in names {
            let forest = match self.components.get(&name) {
                Some(components) => build(components, &self.data),
                None => Vec::new(),
            };
            let seq = self.bump();
            if let Some(entry) = self.entries.get_mut(&name) {
                entry.forest = forest;
                entry.seq = seq;
            }
        }
    }

    /// Advisory readiness signal.
    pub fn begin_rendering(&mut self, name: &str) {
        match self.entries.get_mut(name) {
            Some(entry) => entry.rendering = true,
            None => debug!("beginRendering for unknown surface {}", name),
        }
    }

    /// Current forest for a surface; empty when the surface is unknown.
    pub fn get(&self, name: &str) -> &[ResolvedNode] {
        self.entries.get(name).map(|e| e.forest.as_slice()).unwrap_or(&[])
    }

    pub fn entry(&self, name: &str) -> Option<&SurfaceEntry> {
        self.entries.get(name)
    }

    /// Entries in first-seen order (stacked-mode flow order).
    pub fn entries_in_arrival_order(&self) -> Vec<&SurfaceEntry> {
        self.arrival
            .iter()
            .filter_map(|name| self.entries.get(name))
            .collect()
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
        self.components.remove(name);
        self.arrival.retain(|n| n != name);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
