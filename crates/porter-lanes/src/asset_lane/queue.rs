// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The load scheduler: admission, settlement routing, pairing and completion.
//!
//! Items move through five collections: `pending` (waiting for a slot), the
//! in-flight set held by the [`ConcurrencyGate`], `queue` (fetched or failed,
//! awaiting the processing phase), `failed`, and `storage` (ready for
//! dispatch). Every public method runs on the owner's thread; fetchers only
//! talk back through the settlement channel drained by [`LoadQueueLane::update`].

use super::dispatch::{DispatchLane, DispatchReport, StoredEntry, StoredFile};
use super::gate::ConcurrencyGate;
use super::loading::ProcessingLane;
use porter_core::event::{CycleCompleted, CycleStarted, EventBus, SubscriptionId};
use porter_core::fetch::{CycleToken, FetchRequest, Fetcher, Settlement, SettlementSender};
use porter_core::group::MultiPartGroup;
use porter_core::item::{ItemId, ItemLink, LinkKind, LinkRole, LoadableItem, PairLink};
use porter_core::registry::Registries;
use porter_core::{ItemState, LoaderConfig, LoaderError, LoaderState};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Collection sizes at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    /// Items waiting for a fetch slot.
    pub pending: usize,
    /// Items being fetched.
    pub in_flight: usize,
    /// Items fetched or failed this cycle, awaiting processing.
    pub queued: usize,
    /// Items that failed this cycle.
    pub failed: usize,
    /// Entries ready for dispatch.
    pub stored: usize,
}

/// Schedules fetches for queued items and routes their results to the registries.
pub struct LoadQueueLane {
    config: LoaderConfig,
    state: LoaderState,
    cycle: CycleToken,
    next_id: u64,

    items: HashMap<ItemId, LoadableItem>,
    pending: VecDeque<ItemId>,
    gate: ConcurrencyGate,
    queue: Vec<ItemId>,
    failed: Vec<ItemId>,
    storage: Vec<StoredEntry>,
    groups: Vec<MultiPartGroup>,

    fetcher: Box<dyn Fetcher>,
    settle_tx: flume::Sender<Settlement>,
    settle_rx: flume::Receiver<Settlement>,

    processor: ProcessingLane,
    dispatcher: DispatchLane,
    last_dispatch: DispatchReport,

    started: EventBus<CycleStarted>,
    completed: EventBus<CycleCompleted>,
}

impl LoadQueueLane {
    /// Creates an idle scheduler fetching through `fetcher`.
    pub fn new(config: LoaderConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let (settle_tx, settle_rx) = flume::unbounded();
        let gate = ConcurrencyGate::new(config.max_parallel());
        Self {
            config,
            state: LoaderState::Idle,
            cycle: CycleToken::default(),
            next_id: 0,
            items: HashMap::new(),
            pending: VecDeque::new(),
            gate,
            queue: Vec::new(),
            failed: Vec::new(),
            storage: Vec::new(),
            groups: Vec::new(),
            fetcher,
            settle_tx,
            settle_rx,
            processor: ProcessingLane::new(),
            dispatcher: DispatchLane::new(),
            last_dispatch: DispatchReport::default(),
            started: EventBus::new(),
            completed: EventBus::new(),
        }
    }

    // --- Configuration ---

    /// The active configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Sets the path given to items enqueued from now on.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.config.set_path(path);
    }

    /// Sets the base URL prefixed to relative URLs.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.base_url = base_url.into();
    }

    /// Changes the concurrency limit. Items already in flight are unaffected.
    pub fn set_max_parallel(&mut self, limit: usize) {
        self.config.max_parallel_downloads = limit;
        self.gate.set_limit(self.config.max_parallel());
    }

    // --- Observation ---

    /// The loader state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// The current cycle token.
    pub fn cycle(&self) -> CycleToken {
        self.cycle
    }

    /// Whether the loader accepts new work.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Whether a cycle is fetching.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Current collection sizes.
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            pending: self.pending.len(),
            in_flight: self.gate.len(),
            queued: self.queue.len(),
            failed: self.failed.len(),
            stored: self.storage.len(),
        }
    }

    /// Looks up an item by id. Items leave the arena once dispatched.
    pub fn item(&self, id: ItemId) -> Option<&LoadableItem> {
        self.items.get(&id)
    }

    /// Number of items the scheduler still holds, failed ones included.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items currently in flight.
    pub fn in_flight(&self) -> &[ItemId] {
        self.gate.in_flight()
    }

    /// Items that failed in the last or current cycle.
    pub fn failed(&self) -> impl Iterator<Item = &LoadableItem> {
        self.failed.iter().filter_map(|id| self.items.get(id))
    }

    /// What the most recent dispatch delivered.
    pub fn last_dispatch(&self) -> DispatchReport {
        self.last_dispatch
    }

    // --- Events ---

    /// Subscribes to cycle-start notifications.
    pub fn on_start(&mut self, listener: impl FnMut(&CycleStarted) + Send + 'static) -> SubscriptionId {
        self.started.subscribe(listener)
    }

    /// Subscribes to cycle-completion notifications.
    pub fn on_complete(&mut self, listener: impl FnMut(&CycleCompleted) + Send + 'static) -> SubscriptionId {
        self.completed.subscribe(listener)
    }

    /// Removes a start listener.
    pub fn remove_start_listener(&mut self, id: SubscriptionId) -> bool {
        self.started.unsubscribe(id)
    }

    /// Removes a completion listener.
    pub fn remove_complete_listener(&mut self, id: SubscriptionId) -> bool {
        self.completed.unsubscribe(id)
    }

    // --- Queueing ---

    fn mint_id(&mut self) -> ItemId {
        self.next_id += 1;
        ItemId::from_raw(self.next_id)
    }

    fn check_ready(&self) -> Result<(), LoaderError> {
        if self.state.is_ready() {
            Ok(())
        } else {
            Err(LoaderError::NotReady { state: self.state })
        }
    }

    fn check_enqueue(&self, item: &LoadableItem) -> Result<(), LoaderError> {
        if item.key().is_empty() {
            return Err(LoaderError::MissingKey {
                file_type: item.file_type(),
            });
        }
        if item.state() != ItemState::Pending {
            return Err(LoaderError::NotPending {
                key: item.key().to_string(),
                file_type: item.file_type(),
                state: item.state(),
            });
        }
        let identity = item.item_key();
        let duplicate = self
            .pending
            .iter()
            .filter_map(|id| self.items.get(id))
            .any(|queued| queued.item_key() == identity);
        if duplicate {
            return Err(LoaderError::DuplicateKey {
                key: identity.key,
                file_type: identity.file_type,
            });
        }
        Ok(())
    }

    fn push_pending(&mut self, id: ItemId, mut item: LoadableItem) {
        item.set_path(self.config.path.clone());
        log::debug!("Queued {} as item {}.", item.item_key(), id.raw());
        self.items.insert(id, item);
        self.pending.push_back(id);
    }

    /// Queues a standalone item for the next cycle.
    ///
    /// # Errors
    /// [`LoaderError::NotReady`] while a cycle runs, [`LoaderError::MissingKey`]
    /// for an empty key, [`LoaderError::NotPending`] for an item that already
    /// went through a cycle and [`LoaderError::DuplicateKey`] if the same key
    /// and type are already pending.
    pub fn enqueue(&mut self, item: LoadableItem) -> Result<ItemId, LoaderError> {
        self.check_ready()?;
        self.check_enqueue(&item)?;
        let id = self.mint_id();
        self.push_pending(id, item);
        Ok(id)
    }

    /// Queues two items that only make sense together.
    ///
    /// The halves may be given in either order; their roles follow from their
    /// file types. The pair is stored as a unit only if both halves load.
    pub fn enqueue_pair(
        &mut self,
        kind: LinkKind,
        first: LoadableItem,
        second: LoadableItem,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.check_ready()?;
        self.check_enqueue(&first)?;
        self.check_enqueue(&second)?;
        if first.item_key() == second.item_key() {
            return Err(LoaderError::DuplicateKey {
                key: second.key().to_string(),
                file_type: second.file_type(),
            });
        }

        let (first_id, second_id) = (self.mint_id(), self.mint_id());
        let pair = PairLink::new(
            kind,
            (first_id, first.file_type()),
            (second_id, second.file_type()),
        )?;

        let mut first = first;
        let mut second = second;
        if let (Some(a), Some(b)) = (pair.item_link(first_id), pair.item_link(second_id)) {
            first.set_link(a);
            second.set_link(b);
        }
        self.push_pending(first_id, first);
        self.push_pending(second_id, second);
        Ok((first_id, second_id))
    }

    /// Registers a multi-part group to assemble at dispatch.
    ///
    /// Members are enqueued separately as plain items. Groups are forgotten
    /// once a cycle dispatches.
    pub fn add_group(&mut self, group: MultiPartGroup) -> Result<(), LoaderError> {
        self.check_ready()?;
        log::debug!("Registered group '{}' ({} members).", group.name(), group.expected_len());
        self.groups.push(group);
        Ok(())
    }

    /// Queues the members of a multi-part group and registers the group.
    ///
    /// Every member is validated first, so either all of them are queued or
    /// none is.
    pub fn enqueue_group(
        &mut self,
        group: MultiPartGroup,
        members: Vec<LoadableItem>,
    ) -> Result<Vec<ItemId>, LoaderError> {
        self.check_ready()?;
        for (index, item) in members.iter().enumerate() {
            self.check_enqueue(item)?;
            let identity = item.item_key();
            if members[..index].iter().any(|other| other.item_key() == identity) {
                return Err(LoaderError::DuplicateKey {
                    key: identity.key,
                    file_type: identity.file_type,
                });
            }
        }

        let ids = members
            .into_iter()
            .map(|item| {
                let id = self.mint_id();
                self.push_pending(id, item);
                id
            })
            .collect();
        self.add_group(group)?;
        Ok(ids)
    }

    // --- Cycle ---

    /// Starts a cycle over every pending item.
    ///
    /// An empty queue completes immediately with zero counts. Calling `start`
    /// while a cycle runs is rejected.
    pub fn start(&mut self, registries: &mut Registries<'_>) -> Result<(), LoaderError> {
        self.check_ready()?;

        self.cycle = self.cycle.next();
        for id in self.failed.drain(..) {
            self.items.remove(&id);
        }
        self.gate.clear();
        self.queue.clear();
        self.storage.clear();

        let queued = self.pending.len();
        log::info!("Load cycle {} starting with {} item(s).", self.cycle.raw(), queued);
        self.state = LoaderState::Loading;
        self.started.publish(&CycleStarted {
            cycle: self.cycle,
            queued,
        });

        if self.pending.is_empty() {
            self.process_complete(registries);
        } else {
            self.admit(registries);
        }
        Ok(())
    }

    fn admit(&mut self, registries: &mut Registries<'_>) {
        while self.gate.has_capacity() {
            let Some(id) = self.pending.pop_front() else {
                break;
            };
            let Some(item) = self.items.get_mut(&id) else {
                log::error!("Pending item {} is missing from the arena.", id.raw());
                continue;
            };
            if !self.gate.admit(id) {
                log::error!("Item {} is already in flight, skipping.", id.raw());
                continue;
            }
            if let Err(err) = item.begin_fetch() {
                log::error!("Cannot fetch {}: {}", item.item_key(), err);
                self.gate.release(id);
                self.failed.push(id);
                continue;
            }
            item.inherit_settings(&self.config.fetch, self.config.cross_origin.as_deref());

            let request = FetchRequest {
                item: id,
                key: item.key().to_string(),
                file_type: item.file_type(),
                url: item.resolved_url(&self.config.base_url),
                settings: item.settings().cloned().unwrap_or_default(),
                cross_origin: item.cross_origin().map(str::to_owned),
            };
            log::debug!(
                "Fetching {} from '{}' ({}/{} in flight).",
                item.item_key(),
                request.url,
                self.gate.len(),
                self.gate.limit()
            );
            let settle = SettlementSender::new(id, self.cycle, self.settle_tx.clone());
            self.fetcher.fetch(request, settle);
        }

        // Every remaining item was skipped: nothing will settle.
        if self.pending.is_empty() && self.gate.is_empty() {
            self.finish_loading(registries);
        }
    }

    /// Drains every settlement that has arrived and returns how many were handled.
    pub fn update(&mut self, registries: &mut Registries<'_>) -> usize {
        let mut handled = 0;
        while let Ok(settlement) = self.settle_rx.try_recv() {
            self.on_item_settled(settlement, registries);
            handled += 1;
        }
        handled
    }

    /// Blocks up to `timeout` for one settlement, then drains the rest.
    ///
    /// Returns `false` if nothing arrived in time.
    pub fn update_blocking(&mut self, registries: &mut Registries<'_>, timeout: Duration) -> bool {
        match self.settle_rx.recv_timeout(timeout) {
            Ok(settlement) => {
                self.on_item_settled(settlement, registries);
                self.update(registries);
                true
            }
            Err(_) => false,
        }
    }

    /// Routes one settlement. Settlements from an earlier cycle, or for items
    /// no longer in flight, are ignored.
    pub fn on_item_settled(&mut self, settlement: Settlement, registries: &mut Registries<'_>) {
        let id = settlement.item;
        if settlement.cycle != self.cycle || !self.gate.contains(id) {
            log::debug!(
                "Ignoring stale settlement for item {} (cycle {}, now {}).",
                id.raw(),
                settlement.cycle.raw(),
                self.cycle.raw()
            );
            return;
        }
        self.gate.release(id);

        if let Some(item) = self.items.get_mut(&id) {
            let transition = match settlement.outcome {
                Ok(bytes) => item.finish_fetch(bytes),
                Err(err) => {
                    log::warn!("Failed to fetch {}: {}", item.item_key(), err);
                    item.fail()
                }
            };
            if let Err(err) = transition {
                log::error!("Item {} settled out of order: {}", item.item_key(), err);
                // Loaded never reached, so the bytes are gone either way.
                let _ = item.fail();
            }
            self.queue.push(id);
        } else {
            log::error!("Settled item {} is missing from the arena.", id.raw());
        }

        if !self.pending.is_empty() {
            self.admit(registries);
        } else if self.gate.is_empty() {
            self.finish_loading(registries);
        }
    }

    /// Runs the processing phase. Guarded so it happens once per cycle.
    fn finish_loading(&mut self, registries: &mut Registries<'_>) {
        if self.state != LoaderState::Loading {
            return;
        }
        self.state = LoaderState::Processing;
        log::debug!("Processing {} fetched item(s).", self.queue.len());

        let staged = self.queue.clone();
        for id in staged {
            self.process_item(id);
        }

        if !self.queue.is_empty() {
            log::warn!("{} item(s) never resolved, dropping them.", self.queue.len());
            for id in std::mem::take(&mut self.queue) {
                self.items.remove(&id);
            }
        }
        self.process_complete(registries);
    }

    fn remove_from_queue(&mut self, id: ItemId) -> bool {
        match self.queue.iter().position(|&queued| queued == id) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    /// Runs the post-fetch hook of one queued item, then resolves it.
    fn process_item(&mut self, id: ItemId) {
        if !self.queue.contains(&id) {
            return;
        }
        let Some(item) = self.items.get_mut(&id) else {
            self.remove_from_queue(id);
            return;
        };
        if item.state() == ItemState::Loaded {
            let bytes = item.take_raw().unwrap_or_default();
            let outcome = self.processor.process(item, bytes);
            let transition = match outcome {
                Ok(payload) => item.complete(payload),
                Err(err) => {
                    log::warn!("Failed to process {}: {}", item.item_key(), err);
                    item.fail()
                }
            };
            if let Err(err) = transition {
                log::error!("{}", err);
            }
        }
        self.process_update(id);
    }

    /// Moves a processed item to storage or `failed`, pairing it if linked.
    fn process_update(&mut self, id: ItemId) {
        let Some((state, link)) = self.items.get(&id).map(|i| (i.state(), i.link().copied())) else {
            self.remove_from_queue(id);
            return;
        };

        match state {
            ItemState::Errored => {
                self.remove_from_queue(id);
                self.failed.push(id);
                if let Some(link) = link {
                    self.exclude_partner(link.partner);
                }
            }
            ItemState::Complete => match link {
                None => {
                    self.remove_from_queue(id);
                    if let Some(file) = self.take_stored(id) {
                        self.storage.push(StoredEntry::Single(file));
                    }
                }
                Some(link) => self.link_file(id, link),
            },
            other => {
                log::error!("Item {} reached processing while {:?}.", id.raw(), other);
                self.remove_from_queue(id);
                self.items.remove(&id);
            }
        }
    }

    /// Stores a pair once both halves are complete.
    fn link_file(&mut self, id: ItemId, link: ItemLink) {
        let partner_state = self
            .items
            .get(&link.partner)
            .filter(|_| self.queue.contains(&link.partner))
            .map(LoadableItem::state);

        match partner_state {
            // The partner resolves this pair when its own turn comes.
            Some(ItemState::Loaded) => {}
            Some(ItemState::Complete) => {
                self.remove_from_queue(id);
                self.remove_from_queue(link.partner);
                let (binary, descriptor) = match link.role {
                    LinkRole::Binary => (id, link.partner),
                    LinkRole::Descriptor => (link.partner, id),
                };
                if let (Some(binary), Some(descriptor)) =
                    (self.take_stored(binary), self.take_stored(descriptor))
                {
                    self.storage.push(StoredEntry::Pair {
                        kind: link.kind,
                        binary,
                        descriptor,
                    });
                }
            }
            _ => {
                log::debug!("Excluding item {}: its {} partner did not load.", id.raw(), link.kind);
                self.remove_from_queue(id);
                self.items.remove(&id);
            }
        }
    }

    /// Drops the healthy half of a pair whose other half failed.
    ///
    /// The partner is neither stored nor counted as failed.
    fn exclude_partner(&mut self, partner: ItemId) {
        let ready = self
            .items
            .get(&partner)
            .is_some_and(|p| p.state() == ItemState::Complete);
        if ready && self.remove_from_queue(partner) {
            log::debug!("Excluding item {}: its pair partner failed.", partner.raw());
            self.items.remove(&partner);
        }
    }

    fn take_stored(&mut self, id: ItemId) -> Option<StoredFile> {
        let mut item = self.items.remove(&id)?;
        let Some(payload) = item.take_payload() else {
            log::error!("Completed item {} has no payload.", item.item_key());
            return None;
        };
        Some(StoredFile {
            id,
            file_type: item.file_type(),
            key: item.key().to_string(),
            payload,
        })
    }

    /// Dispatches storage and announces completion.
    fn process_complete(&mut self, registries: &mut Registries<'_>) {
        let succeeded = self.storage.len();
        let failed = self.failed.len();

        self.pending.clear();
        self.gate.clear();
        self.queue.clear();

        let storage = std::mem::take(&mut self.storage);
        let groups = std::mem::take(&mut self.groups);
        self.last_dispatch = self.dispatcher.dispatch(storage, &groups, registries);

        self.state = if failed > 0 && succeeded == 0 {
            LoaderState::Failed
        } else {
            LoaderState::Complete
        };
        log::info!(
            "Load cycle {} finished: {} stored, {} failed.",
            self.cycle.raw(),
            succeeded,
            failed
        );
        self.completed.publish(&CycleCompleted {
            cycle: self.cycle,
            succeeded,
            failed,
        });
    }

    // --- Teardown ---

    /// Abandons all work, drops every listener and restores the path and base URL.
    ///
    /// Fetches still running settle into the void: the cycle token moves on.
    pub fn reset(&mut self) {
        self.items.clear();
        self.pending.clear();
        self.gate.clear();
        self.queue.clear();
        self.failed.clear();
        self.storage.clear();
        self.groups.clear();
        self.started.clear();
        self.completed.clear();

        let defaults = LoaderConfig::default();
        self.config.path = defaults.path;
        self.config.base_url = defaults.base_url;

        self.cycle = self.cycle.next();
        self.state = LoaderState::Idle;
        while self.settle_rx.try_recv().is_ok() {}
        log::debug!("Loader reset.");
    }

    /// Resets and permanently refuses further work.
    pub fn destroy(&mut self) {
        self.reset();
        self.state = LoaderState::Destroyed;
    }
}
