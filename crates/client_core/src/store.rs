//! Loaded page plus pagination bookkeeping.

use shared::{
    domain::ItemId,
    protocol::{Item, ItemPage},
};

/// A list request tagged with its issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub sequence: u64,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone)]
pub struct ListStore {
    page: ItemPage,
    next_sequence: u64,
    last_applied: u64,
}

impl ListStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: ItemPage::empty(page_size.max(1)),
            next_sequence: 0,
            last_applied: 0,
        }
    }

    pub fn page(&self) -> &ItemPage {
        &self.page
    }

    pub fn current_page(&self) -> u32 {
        self.page.page
    }

    pub fn last_applied_sequence(&self) -> u64 {
        self.last_applied
    }

    pub fn begin_request(&mut self, page: u32) -> PageRequest {
        self.next_sequence += 1;
        PageRequest {
            sequence: self.next_sequence,
            page,
            size: self.page.size,
        }
    }

    /// True while no response to a later request has been applied.
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.sequence > self.last_applied
    }

    /// Replaces the whole page with the server's response. Returns false and
    /// leaves state alone when a newer response was already applied.
    pub fn apply(&mut self, request: &PageRequest, mut response: ItemPage) -> bool {
        if !self.is_current(request) {
            return false;
        }
        if response.size == 0 {
            response.size = request.size;
        }
        self.page = response;
        self.last_applied = request.sequence;
        true
    }

    pub fn prev_target(&self) -> Option<u32> {
        if self.page.is_first() {
            None
        } else {
            Some(self.page.page - 1)
        }
    }

    pub fn next_target(&self) -> Option<u32> {
        if self.page.is_last() {
            None
        } else {
            Some(self.page.page + 1)
        }
    }

    /// Optimistic insert of a freshly created item at the top of the page.
    pub fn prepend(&mut self, item: Item) {
        self.page.items.insert(0, item);
        self.page.total_items += 1;
        let size = self.page.size as usize;
        if size > 0 && self.page.items.len() > size {
            self.page.items.truncate(size);
        }
    }

    pub fn replace(&mut self, updated: Item) -> bool {
        let Some(id) = updated.id else {
            return false;
        };
        match self.page.items.iter_mut().find(|item| item.id == Some(id)) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.page.items.len();
        self.page.items.retain(|item| item.id != Some(id));
        before != self.page.items.len()
    }
}
