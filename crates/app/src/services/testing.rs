//! In-memory repository fakes shared by service tests.
//!
//! Transactions work on a snapshot of the committed store: writes through a
//! transaction land in the snapshot, `commit` swaps it in and `rollback`
//! drops it. Failures can be injected per operation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use quotebook_domain::error::{QuotebookError, ValidationError};
use quotebook_domain::id::{AuthorId, QuoteId, TagId};
use quotebook_domain::query::{ListOptions, Page, QuoteFilters, Sort};
use quotebook_domain::quote::{NewQuote, Quote, QuoteChanges};
use quotebook_domain::time::now;

use crate::ports::{QuoteRepository, Transactional};

#[derive(Debug, Clone)]
pub(crate) struct Store {
    pub quotes: BTreeMap<QuoteId, Quote>,
    pub links: BTreeSet<(QuoteId, TagId)>,
    pub authors: BTreeSet<AuthorId>,
    pub tags: BTreeSet<TagId>,
    next_id: i64,
}

/// Starts with author 1 and tags 1 to 3.
impl Default for Store {
    fn default() -> Self {
        Self {
            quotes: BTreeMap::new(),
            links: BTreeSet::new(),
            authors: BTreeSet::from([AuthorId::new(1)]),
            tags: (1..=3).map(TagId::new).collect(),
            next_id: 0,
        }
    }
}

impl Store {
    fn live(&self) -> impl DoubleEndedIterator<Item = &Quote> {
        self.quotes.values().filter(|q| !q.is_deleted())
    }

    fn live_quote(&self, id: QuoteId) -> Option<Quote> {
        self.quotes.get(&id).filter(|q| !q.is_deleted()).cloned()
    }

    fn insert(&mut self, quote: NewQuote) -> Quote {
        self.next_id += 1;
        let ts = now();
        let stored = Quote {
            id: QuoteId::new(self.next_id),
            content: quote.content,
            author_id: quote.author_id,
            author: format!("Author {}", quote.author_id),
            author_slug: format!("author-{}", quote.author_id),
            tags: vec![],
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        self.quotes.insert(stored.id, stored.clone());
        stored
    }

    pub fn tags_of(&self, id: QuoteId) -> Vec<TagId> {
        self.links
            .iter()
            .filter(|(quote_id, _)| *quote_id == id)
            .map(|(_, tag_id)| *tag_id)
            .collect()
    }
}

/// Open transaction of [`InMemoryQuoteRepo`].
pub(crate) struct MemoryTx {
    store: Store,
}

#[derive(Default)]
pub(crate) struct InMemoryQuoteRepo {
    pub store: Mutex<Store>,
    pub fail_detach: AtomicBool,
    pub fail_attach: AtomicBool,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl InMemoryQuoteRepo {
    pub fn seed(&self, content: &str) -> Quote {
        self.store.lock().unwrap().insert(NewQuote {
            content: content.to_string(),
            author_id: AuthorId::new(1),
        })
    }

    pub fn link(&self, id: QuoteId, tag_id: TagId) {
        self.store.lock().unwrap().links.insert((id, tag_id));
    }

    pub fn committed(&self) -> Store {
        self.store.lock().unwrap().clone()
    }

    fn write<T>(&self, tx: Option<&mut MemoryTx>, f: impl FnOnce(&mut Store) -> T) -> T {
        match tx {
            Some(tx) => f(&mut tx.store),
            None => f(&mut self.store.lock().unwrap()),
        }
    }
}

fn injected(operation: &str) -> QuotebookError {
    QuotebookError::Storage(format!("injected {operation} failure").into())
}

impl Transactional for InMemoryQuoteRepo {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, QuotebookError> {
        Ok(MemoryTx {
            store: self.committed(),
        })
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), QuotebookError> {
        *self.store.lock().unwrap() = tx.store;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self, _tx: MemoryTx) -> Result<(), QuotebookError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl QuoteRepository for InMemoryQuoteRepo {
    async fn index(
        &self,
        _filters: &QuoteFilters,
        options: ListOptions,
    ) -> Result<Page<Quote>, QuotebookError> {
        let store = self.committed();
        let mut items: Vec<Quote> = store.live().cloned().collect();
        let total_count = items.len() as u64;
        options.sort.apply(&mut items);
        let offset = usize::try_from(options.offset()).unwrap();
        let limit = options.limit() as usize;
        Ok(Page {
            items: items.into_iter().skip(offset).take(limit).collect(),
            page: options.page(),
            limit: options.limit(),
            total_count,
        })
    }

    async fn random(&self, _filters: &QuoteFilters) -> Result<Option<Quote>, QuotebookError> {
        Ok(self.committed().live().next().cloned())
    }

    async fn random_many(
        &self,
        _filters: &QuoteFilters,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let mut items: Vec<Quote> = self
            .committed()
            .live()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect();
        sort.apply(&mut items);
        Ok(items)
    }

    async fn get_by_id(&self, id: QuoteId) -> Result<Option<Quote>, QuotebookError> {
        Ok(self.committed().live_quote(id))
    }

    async fn get_by_ids(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, QuotebookError> {
        let store = self.committed();
        Ok(ids.iter().filter_map(|id| store.live_quote(*id)).collect())
    }

    async fn get_by_contents(&self, contents: &[String]) -> Result<Vec<Quote>, QuotebookError> {
        Ok(self
            .committed()
            .live()
            .filter(|q| contents.contains(&q.content))
            .cloned()
            .collect())
    }

    async fn known_authors(&self, ids: &[AuthorId]) -> Result<Vec<AuthorId>, QuotebookError> {
        let store = self.committed();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| store.authors.contains(id))
            .collect())
    }

    async fn live_tags(&self, ids: &[TagId]) -> Result<Vec<TagId>, QuotebookError> {
        let store = self.committed();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| store.tags.contains(id))
            .collect())
    }

    async fn create(
        &self,
        quote: NewQuote,
        tx: Option<&mut MemoryTx>,
    ) -> Result<Quote, QuotebookError> {
        Ok(self.write(tx, |store| store.insert(quote)))
    }

    async fn create_many(
        &self,
        quotes: Vec<NewQuote>,
        tx: Option<&mut MemoryTx>,
    ) -> Result<Vec<Quote>, QuotebookError> {
        Ok(self.write(tx, |store| {
            quotes.into_iter().map(|q| store.insert(q)).collect()
        }))
    }

    async fn update(
        &self,
        id: QuoteId,
        changes: QuoteChanges,
        tx: Option<&mut MemoryTx>,
    ) -> Result<Option<Quote>, QuotebookError> {
        Ok(self.write(tx, |store| {
            let mut quote = store.live_quote(id)?;
            if changes.apply_to(&mut quote) {
                quote.updated_at = now();
                store.quotes.insert(id, quote.clone());
            }
            Some(quote)
        }))
    }

    async fn delete(
        &self,
        id: QuoteId,
        tx: Option<&mut MemoryTx>,
    ) -> Result<Option<Quote>, QuotebookError> {
        Ok(self.write(tx, |store| {
            let mut quote = store.live_quote(id)?;
            quote.deleted_at = Some(now());
            store.quotes.insert(id, quote.clone());
            Some(quote)
        }))
    }

    async fn attach_tags(
        &self,
        id: QuoteId,
        tag_ids: &[TagId],
        tx: Option<&mut MemoryTx>,
    ) -> Result<u64, QuotebookError> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(injected("attach"));
        }
        Ok(self.write(tx, |store| {
            tag_ids
                .iter()
                .filter(|tag_id| store.links.insert((id, **tag_id)))
                .count() as u64
        }))
    }

    async fn detach_tags(
        &self,
        id: QuoteId,
        tx: Option<&mut MemoryTx>,
    ) -> Result<u64, QuotebookError> {
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(injected("detach"));
        }
        Ok(self.write(tx, |store| {
            let before = store.links.len();
            store.links.retain(|(quote_id, _)| *quote_id != id);
            (before - store.links.len()) as u64
        }))
    }
}

/// Shorthand for asserting on validation failures.
pub(crate) fn is_validation(
    result: &Result<impl Sized, QuotebookError>,
) -> Option<&ValidationError> {
    match result {
        Err(QuotebookError::Validation(err)) => Some(err),
        _ => None,
    }
}
