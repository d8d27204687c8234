//! Vertical stacking of events that share a resource row.

use std::collections::HashMap;

use crate::model::{Event, EventId, ResourceId};

/// Stacking slots and lane counts for every resource.
///
/// Slots and lanes are 1-based. Resources or events that are not in the map
/// sit in lane 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapMap {
    slots: HashMap<ResourceId, HashMap<EventId, u32>>,
    lanes: HashMap<ResourceId, u32>,
}

impl OverlapMap {
    /// Greedy single pass over each resource's events, sorted by start date.
    ///
    /// Every event that starts before its predecessor ends bumps the lane
    /// counter and takes the new lane. The counter never goes back down
    /// within a pass, so a row stays tall once it has grown.
    pub fn resolve(events: &[Event]) -> Self {
        let mut grouped: HashMap<ResourceId, Vec<&Event>> = HashMap::new();
        for event in events {
            grouped.entry(event.resource_id).or_default().push(event);
        }

        let mut map = OverlapMap::default();
        for (resource_id, mut group) in grouped {
            // stable: equal start dates keep insertion order
            group.sort_by_key(|e| e.start_date);

            let mut lane = 1u32;
            let mut slots = HashMap::with_capacity(group.len());
            if let Some(first) = group.first() {
                slots.insert(first.id, 1);
            }
            for pair in group.windows(2) {
                let (previous, current) = (pair[0], pair[1]);
                if current.starts_before_end_of(previous) {
                    lane += 1;
                    slots.insert(current.id, lane);
                } else {
                    slots.insert(current.id, 1);
                }
            }

            map.slots.insert(resource_id, slots);
            map.lanes.insert(resource_id, lane);
        }
        map
    }

    /// Highest lane reached on the resource row.
    pub fn lane_count(&self, resource_id: ResourceId) -> u32 {
        self.lanes.get(&resource_id).copied().unwrap_or(1)
    }

    /// Lane the event is drawn in.
    pub fn slot(&self, resource_id: ResourceId, event_id: EventId) -> u32 {
        self.slots
            .get(&resource_id)
            .and_then(|s| s.get(&event_id))
            .copied()
            .unwrap_or(1)
    }
}
