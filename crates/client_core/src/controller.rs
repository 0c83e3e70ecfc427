use std::sync::Arc;

use shared::{
    domain::ItemId,
    protocol::{Item, ItemPage, ItemPayload},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::GatewayError,
    filter::ItemFilter,
    messages::{Message, MessageCenter},
    store::{ListStore, PageRequest},
    ClientEvent, ConfirmationPrompt, ControllerOptions, ItemGateway, NeverConfirm,
};

pub const ITEM_CREATED_TEXT: &str = "Item created successfully.";
pub const ITEM_UPDATED_TEXT: &str = "Item updated successfully.";
pub const ITEM_DELETED_TEXT: &str = "Item deleted successfully.";

/// Working copy bound to the edit form. Saved as a create while `id` is
/// `None`, as an update otherwise.
pub type Draft = Item;

/// How a command ended. Failures have already been reported through the
/// message slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    Failed,
    /// Nothing to do: boundary page, missing id, or a superseded response.
    Skipped,
    /// The user declined the confirmation prompt.
    Declined,
}

#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub page: ItemPage,
    pub draft: Draft,
    pub message: Option<Message>,
    pub lookup: Option<Item>,
    pub filter_text: String,
}

impl ViewSnapshot {
    pub fn visible_items(&self) -> Vec<&Item> {
        ItemFilter::new(&self.filter_text).apply(&self.page.items)
    }
}

enum PageFetch {
    Applied,
    Superseded,
    Failed(GatewayError),
}

struct ControllerState {
    list: ListStore,
    draft: Draft,
    lookup: Option<Item>,
    filter_text: String,
}

pub struct ItemController {
    gateway: Arc<dyn ItemGateway>,
    confirmation: Arc<dyn ConfirmationPrompt>,
    messages: MessageCenter,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ClientEvent>,
}

impl ItemController {
    /// Controller that refuses every deletion until a prompt is supplied.
    pub fn new(gateway: Arc<dyn ItemGateway>) -> Arc<Self> {
        Self::new_with_dependencies(gateway, Arc::new(NeverConfirm), ControllerOptions::default())
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn ItemGateway>,
        confirmation: Arc<dyn ConfirmationPrompt>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            confirmation,
            messages: MessageCenter::new(options.message_ttl, events.clone()),
            inner: Mutex::new(ControllerState {
                list: ListStore::new(options.page_size),
                draft: Draft::default(),
                lookup: None,
                filter_text: String::new(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let message = self.messages.current().await;
        let guard = self.inner.lock().await;
        ViewSnapshot {
            page: guard.list.page().clone(),
            draft: guard.draft.clone(),
            message,
            lookup: guard.lookup.clone(),
            filter_text: guard.filter_text.clone(),
        }
    }

    pub async fn page(&self) -> ItemPage {
        self.inner.lock().await.list.page().clone()
    }

    pub async fn draft(&self) -> Draft {
        self.inner.lock().await.draft.clone()
    }

    pub async fn lookup(&self) -> Option<Item> {
        self.inner.lock().await.lookup.clone()
    }

    pub async fn message(&self) -> Option<Message> {
        self.messages.current().await
    }

    pub async fn filter_text(&self) -> String {
        self.inner.lock().await.filter_text.clone()
    }

    pub async fn set_filter(&self, text: impl Into<String>) {
        self.inner.lock().await.filter_text = text.into();
    }

    /// Items of the loaded page that pass the current filter text.
    pub async fn visible_items(&self) -> Vec<Item> {
        let guard = self.inner.lock().await;
        ItemFilter::new(&guard.filter_text)
            .apply(&guard.list.page().items)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn load_page(&self, page: u32) -> CommandOutcome {
        self.messages.clear().await;
        match self.fetch_page(page).await {
            PageFetch::Applied => CommandOutcome::Completed,
            PageFetch::Superseded => CommandOutcome::Skipped,
            PageFetch::Failed(err) => self.report_failure("load_page", err).await,
        }
    }

    pub async fn prev_page(&self) -> CommandOutcome {
        let target = self.inner.lock().await.list.prev_target();
        match target {
            Some(page) => self.load_page(page).await,
            None => CommandOutcome::Skipped,
        }
    }

    pub async fn next_page(&self) -> CommandOutcome {
        let target = self.inner.lock().await.list.next_target();
        match target {
            Some(page) => self.load_page(page).await,
            None => CommandOutcome::Skipped,
        }
    }

    pub async fn reload(&self) -> CommandOutcome {
        let current = self.inner.lock().await.list.current_page();
        self.load_page(current).await
    }

    /// Starts editing a copy of `item`.
    pub async fn edit(&self, item: &Item) {
        self.messages.clear().await;
        let mut guard = self.inner.lock().await;
        guard.draft = item.clone();
        let _ = self.events.send(ClientEvent::DraftChanged(guard.draft.clone()));
    }

    pub async fn update_draft(&self, change: impl FnOnce(&mut Draft)) {
        let mut guard = self.inner.lock().await;
        change(&mut guard.draft);
        let _ = self.events.send(ClientEvent::DraftChanged(guard.draft.clone()));
    }

    pub async fn reset_form(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.draft = Draft::default();
            guard.lookup = None;
            let _ = self.events.send(ClientEvent::DraftChanged(guard.draft.clone()));
            let _ = self.events.send(ClientEvent::LookupChanged(None));
        }
        self.messages.clear().await;
    }

    pub async fn save(&self) -> CommandOutcome {
        self.messages.clear().await;
        let draft = self.inner.lock().await.draft.clone();
        let payload = draft.payload();
        match draft.id {
            Some(id) => self.update_item(id, payload).await,
            None => self.create_item(payload).await,
        }
    }

    pub async fn remove(&self, item: &Item) -> CommandOutcome {
        let Some(id) = item.id else {
            return CommandOutcome::Skipped;
        };

        let prompt = format!("Confirm deletion of item #{id}?");
        if !self.confirmation.confirm(&prompt) {
            info!(item_id = id.0, "items: deletion declined");
            return CommandOutcome::Declined;
        }

        if let Err(err) = self.gateway.delete(id).await {
            return self.report_failure("delete", err).await;
        }
        info!(item_id = id.0, "items: deleted");

        let current = {
            let mut guard = self.inner.lock().await;
            guard.list.remove(id);
            let _ = self.events.send(ClientEvent::PageChanged(guard.list.page().clone()));
            guard.list.current_page()
        };
        self.reconcile(current, ITEM_DELETED_TEXT).await
    }

    /// Looks one item up without touching the loaded page.
    pub async fn fetch_by_id(&self, id: Option<ItemId>) -> CommandOutcome {
        let Some(id) = id else {
            return CommandOutcome::Skipped;
        };

        self.messages.clear().await;
        self.set_lookup(None).await;

        match self.gateway.get(id).await {
            Ok(item) => {
                self.set_lookup(Some(item)).await;
                CommandOutcome::Completed
            }
            Err(err) => self.report_failure("fetch_by_id", err).await,
        }
    }

    async fn create_item(&self, payload: ItemPayload) -> CommandOutcome {
        let created = match self.gateway.create(&payload).await {
            Ok(item) => item,
            Err(err) => return self.report_failure("create", err).await,
        };
        info!(item_id = ?created.id, "items: created");

        {
            let mut guard = self.inner.lock().await;
            guard.list.prepend(created);
            guard.draft = Draft::default();
            let _ = self.events.send(ClientEvent::PageChanged(guard.list.page().clone()));
            let _ = self.events.send(ClientEvent::DraftChanged(guard.draft.clone()));
        }
        self.reconcile(0, ITEM_CREATED_TEXT).await
    }

    async fn update_item(&self, id: ItemId, payload: ItemPayload) -> CommandOutcome {
        let updated = match self.gateway.update(id, &payload).await {
            Ok(item) => item,
            Err(err) => return self.report_failure("update", err).await,
        };
        info!(item_id = id.0, "items: updated");

        let current = {
            let mut guard = self.inner.lock().await;
            guard.list.replace(updated);
            let _ = self.events.send(ClientEvent::PageChanged(guard.list.page().clone()));
            guard.list.current_page()
        };
        self.reconcile(current, ITEM_UPDATED_TEXT).await
    }

    /// Re-fetches `page` after a successful mutation; the fetched page replaces
    /// any local patch.
    async fn reconcile(&self, page: u32, success_text: &str) -> CommandOutcome {
        match self.fetch_page(page).await {
            PageFetch::Applied | PageFetch::Superseded => {
                self.messages.success(success_text).await;
                CommandOutcome::Completed
            }
            PageFetch::Failed(err) => self.report_failure("reconcile", err).await,
        }
    }

    async fn fetch_page(&self, page: u32) -> PageFetch {
        let request = self.inner.lock().await.list.begin_request(page);
        let result = self.gateway.list(request.page, request.size).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(response) => {
                if guard.list.apply(&request, response) {
                    let applied = guard.list.page();
                    debug!(
                        sequence = request.sequence,
                        page = applied.page,
                        items = applied.items.len(),
                        total_items = applied.total_items,
                        "items: page applied"
                    );
                    let _ = self.events.send(ClientEvent::PageChanged(applied.clone()));
                    PageFetch::Applied
                } else {
                    self.log_superseded(&request, guard.list.last_applied_sequence());
                    PageFetch::Superseded
                }
            }
            Err(err) if guard.list.is_current(&request) => PageFetch::Failed(err),
            Err(err) => {
                debug!(error = %err, "items: failure of superseded page request dropped");
                self.log_superseded(&request, guard.list.last_applied_sequence());
                PageFetch::Superseded
            }
        }
    }

    fn log_superseded(&self, request: &PageRequest, last_applied: u64) {
        debug!(
            sequence = request.sequence,
            last_applied,
            page = request.page,
            "items: discarded response older than applied state"
        );
    }

    async fn set_lookup(&self, item: Option<Item>) {
        let mut guard = self.inner.lock().await;
        guard.lookup = item;
        let _ = self.events.send(ClientEvent::LookupChanged(guard.lookup.clone()));
    }

    async fn report_failure(&self, operation: &'static str, err: GatewayError) -> CommandOutcome {
        warn!(operation, status = ?err.status(), error = %err, "items: operation failed");
        self.messages.error(err.user_message()).await;
        CommandOutcome::Failed
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
