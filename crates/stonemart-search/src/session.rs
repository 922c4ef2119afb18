//! One browsing context's selection, sort, and cached outcome.
//!
//! The session is the only writer of its [`FacetSelection`]. Every surface
//! that needs results reads them through [`SearchSession::outcome`], which
//! recomputes only when the selection snapshot, sort key, or engine changed
//! since the last call.
//!
//! Typed free text can be routed through a [`Debouncer`] owned by the
//! session. Any other selection change cancels the pending text, and a value
//! that settled before the change is discarded when it is applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::debounce::Debouncer;

use crate::engine::{FilterEngine, SearchOutcome};
use crate::error::SearchError;
use crate::facet::Facet;
use crate::selection::FacetSelection;
use crate::sort::SortKey;
use crate::url_sync::UrlCodec;

#[derive(Debug, Clone)]
struct Cached {
    selection: FacetSelection,
    sort: Option<SortKey>,
    outcome: Arc<SearchOutcome>,
}

/// Free text that survived the debounce window, tagged with the selection
/// generation it was typed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledText {
    generation: u64,
    text: String,
}

impl SettledText {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug)]
pub struct SearchSession {
    engine: Arc<FilterEngine>,
    codec: UrlCodec,
    selection: FacetSelection,
    sort: Option<SortKey>,
    cached: Option<Cached>,
    recomputations: u64,
    text_debouncer: Option<Debouncer<SettledText>>,
    generation: u64,
}

impl SearchSession {
    #[must_use]
    pub fn new(engine: Arc<FilterEngine>) -> Self {
        let codec = UrlCodec::with_vocabulary(engine.vocabulary().clone());
        Self {
            engine,
            codec,
            selection: FacetSelection::new(),
            sort: None,
            cached: None,
            recomputations: 0,
            text_debouncer: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<FilterEngine> {
        &self.engine
    }

    #[must_use]
    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    #[must_use]
    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    /// Number of times the outcome has actually been recomputed.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn set_sort(&mut self, sort: Option<SortKey>) {
        self.sort = sort;
    }

    /// Swaps in an engine built over a new catalog and drops the cache.
    pub fn replace_engine(&mut self, engine: Arc<FilterEngine>) {
        self.codec = UrlCodec::with_vocabulary(engine.vocabulary().clone());
        self.engine = engine;
        self.cached = None;
    }

    /// Replaces the selection with the one encoded in `query`. A `sort`
    /// parameter, if present, replaces the sort key.
    pub fn hydrate(&mut self, query: &str) {
        let params = crate::url_sync::parse_query(query);
        self.selection = self
            .codec
            .hydrate(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.cancel_pending_text();
        if let Some(sort) = crate::url_sync::extra_param(&params, "sort") {
            self.sort = SortKey::parse(sort);
        }
    }

    /// Canonical query string for the current selection and sort.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut query = self.codec.serialize(&self.selection);
        if let Some(sort) = self.sort {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str("sort=");
            query.push_str(sort.slug());
        }
        query
    }

    /// # Errors
    ///
    /// Returns [`SearchError::WrongFacetKind`] when `facet` is multi-select.
    pub fn set_single(&mut self, facet: Facet, value: &str) -> Result<(), SearchError> {
        self.selection = self.selection.set_single(facet, value)?;
        self.cancel_pending_text();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SearchError::WrongFacetKind`] when `facet` is single-select.
    pub fn toggle_multi(&mut self, facet: Facet, value: &str) -> Result<(), SearchError> {
        self.selection = self.selection.toggle_multi(facet, value)?;
        self.cancel_pending_text();
        Ok(())
    }

    /// Mutates a facet addressed by name, as UI event handlers do.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownFacet`] for an unrecognized name and
    /// [`SearchError::WrongFacetKind`] for a kind mismatch.
    pub fn toggle_named(&mut self, name: &str, value: &str) -> Result<(), SearchError> {
        let facet: Facet = name.parse()?;
        self.toggle_multi(facet, value)
    }

    /// # Errors
    ///
    /// Same as [`SearchSession::toggle_named`].
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<(), SearchError> {
        let facet: Facet = name.parse()?;
        self.set_single(facet, value)
    }

    /// Applies free text immediately, dropping any pending typed text.
    pub fn set_search_text(&mut self, text: &str) {
        self.selection = with_search_text(&self.selection, text);
        self.cancel_pending_text();
    }

    pub fn clear(&mut self, facet: Facet) {
        self.selection = self.selection.clear(facet);
        self.cancel_pending_text();
    }

    pub fn clear_all(&mut self) {
        self.selection = self.selection.clear_all();
        self.cancel_pending_text();
    }

    /// Routes [`SearchSession::type_text`] through a debouncer with `delay`
    /// and returns the receiver settled text arrives on. Feed each value back
    /// through [`SearchSession::apply_settled`]. Replaces any earlier
    /// debouncer, dropping its pending text.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn debounce_text(&mut self, delay: Duration) -> mpsc::UnboundedReceiver<SettledText> {
        let (debouncer, settled) = Debouncer::new(delay);
        self.text_debouncer = Some(debouncer);
        self.generation += 1;
        settled
    }

    /// Records a keystroke's worth of free text. Without a debouncer the
    /// text applies at once.
    pub fn type_text(&mut self, text: &str) {
        match &self.text_debouncer {
            Some(debouncer) => debouncer.push(SettledText {
                generation: self.generation,
                text: text.to_string(),
            }),
            None => self.selection = with_search_text(&self.selection, text),
        }
    }

    /// Settles pending text now, e.g. on Enter.
    pub fn flush_text(&self) {
        if let Some(debouncer) = &self.text_debouncer {
            debouncer.flush();
        }
    }

    /// Settles pending text and shuts the debouncer down; the receiver
    /// closes once drained.
    pub async fn finish_text(&mut self) {
        if let Some(debouncer) = self.text_debouncer.take() {
            debouncer.finish().await;
        }
    }

    /// Applies settled text unless the selection changed after it was typed.
    /// Returns whether the text was applied.
    pub fn apply_settled(&mut self, settled: &SettledText) -> bool {
        if settled.generation != self.generation {
            tracing::debug!(text = %settled.text, "discarding stale search text");
            return false;
        }
        self.selection = with_search_text(&self.selection, &settled.text);
        true
    }

    fn cancel_pending_text(&mut self) {
        self.generation += 1;
        if let Some(debouncer) = &self.text_debouncer {
            debouncer.cancel();
        }
    }

    /// The filtered, sorted outcome for the current state, recomputed only
    /// when something it depends on changed.
    pub fn outcome(&mut self) -> Arc<SearchOutcome> {
        if let Some(cached) = &self.cached {
            if cached.selection.same_snapshot(&self.selection) && cached.sort == self.sort {
                return Arc::clone(&cached.outcome);
            }
        }

        let outcome = Arc::new(self.engine.search(&self.selection, self.sort));
        self.recomputations += 1;
        self.cached = Some(Cached {
            selection: self.selection.clone(),
            sort: self.sort,
            outcome: Arc::clone(&outcome),
        });
        outcome
    }

    /// Result count for a not-yet-settled free-text value against the
    /// current selection. Leaves the cached outcome untouched.
    #[must_use]
    pub fn preview_count(&self, pending_text: &str) -> usize {
        self.engine
            .count_matches(&with_search_text(&self.selection, pending_text))
    }
}

fn with_search_text(selection: &FacetSelection, text: &str) -> FacetSelection {
    // Search is single-select, so set_single cannot fail here.
    selection
        .set_single(Facet::Search, text)
        .unwrap_or_else(|_| selection.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::LocationTaxonomy;
    use rust_decimal::Decimal;
    use std::time::Duration;
    use stonemart_core::{Category, DetailEntry, Listing, ProductDetails};

    fn listing(id: &str, title: &str, stone: &str, price: i64) -> Listing {
        Listing {
            id: id.to_string(),
            title: title.to_string(),
            price: Some(Decimal::from(price)),
            created_at: None,
            company: None,
            listing_category: None,
            product_details: Some(ProductDetails {
                stone_type: vec![DetailEntry {
                    value: Some(stone.to_string()),
                }],
                ..ProductDetails::default()
            }),
            branches: vec![],
            branch_listings: vec![],
        }
    }

    fn session() -> SearchSession {
        let engine = FilterEngine::new(
            vec![
                listing("1", "Angel headstone", "Granite", 9_000),
                listing("2", "Cross", "Marble", 4_000),
                listing("3", "Angel wings", "Granite", 6_000),
            ],
            vec![Category {
                name: "Headstones".to_string(),
            }],
            LocationTaxonomy::south_africa(),
        );
        SearchSession::new(Arc::new(engine))
    }

    #[test]
    fn outcome_is_cached_until_selection_changes() {
        let mut session = session();
        let first = session.outcome();
        let second = session.outcome();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.recomputations(), 1);

        session.toggle_multi(Facet::StoneType, "Granite").unwrap();
        assert_eq!(session.outcome().total(), 2);
        assert_eq!(session.recomputations(), 2);
    }

    #[test]
    fn no_op_mutation_does_not_recompute() {
        let mut session = session();
        session.set_single(Facet::Category, "Headstones").unwrap();
        let _ = session.outcome();
        session.set_single(Facet::Category, "Headstones").unwrap();
        session.clear(Facet::Style);
        let _ = session.outcome();
        assert_eq!(session.recomputations(), 1);
    }

    #[test]
    fn sort_change_recomputes() {
        let mut session = session();
        let _ = session.outcome();
        session.set_sort(Some(SortKey::Price));
        let outcome = session.outcome();
        assert_eq!(outcome.indices, vec![1, 2, 0]);
        assert_eq!(session.recomputations(), 2);
    }

    #[test]
    fn preview_count_does_not_touch_cache() {
        let mut session = session();
        let _ = session.outcome();
        assert_eq!(session.preview_count("angel"), 2);
        assert_eq!(session.preview_count(""), 3);
        let _ = session.outcome();
        assert_eq!(session.recomputations(), 1);
    }

    #[test]
    fn named_mutators_reject_misuse() {
        let mut session = session();
        assert_eq!(
            session.toggle_named("engraving", "x"),
            Err(SearchError::UnknownFacet("engraving".to_string()))
        );
        assert!(matches!(
            session.set_named("style", "Upright"),
            Err(SearchError::WrongFacetKind { .. })
        ));
        session.toggle_named("material", "Marble").unwrap();
        assert_eq!(session.outcome().total(), 1);
    }

    #[test]
    fn hydrate_and_query_string_round_trip() {
        let mut session = session();
        session.hydrate("?material=granite&search=angel&sort=price");
        assert_eq!(session.sort(), Some(SortKey::Price));
        assert_eq!(session.query_string(), "search=angel&material=Granite&sort=price");
        assert_eq!(session.outcome().indices, vec![2, 0]);
    }

    #[test]
    fn replacing_engine_invalidates_cache() {
        let mut session = session();
        let _ = session.outcome();
        let smaller = FilterEngine::new(
            vec![listing("9", "Plaque", "Brass", 500)],
            vec![],
            LocationTaxonomy::south_africa(),
        );
        session.replace_engine(Arc::new(smaller));
        assert_eq!(session.outcome().total(), 1);
        assert_eq!(session.recomputations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_typing_recomputes_once_with_last_value() {
        let mut session = session();
        let mut settled = session.debounce_text(Duration::from_millis(500));

        for text in ["a", "an", "angel w"] {
            session.type_text(text);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let text = settled.recv().await.unwrap();
        assert!(session.apply_settled(&text));
        let _ = session.outcome();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(settled.try_recv().is_err());

        assert_eq!(session.recomputations(), 1);
        assert_eq!(session.selection().single(Facet::Search), Some("angel w"));
        assert_eq!(session.outcome().total(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_cancels_pending_text() {
        let mut session = session();
        let mut settled = session.debounce_text(Duration::from_millis(500));

        session.type_text("marble");
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.clear_all();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(settled.try_recv().is_err(), "cancelled text must not settle");
        assert!(session.selection().is_unconstrained());
        assert_eq!(session.outcome().total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn facet_change_discards_text_that_already_settled() {
        let mut session = session();
        let mut settled = session.debounce_text(Duration::from_millis(500));

        session.type_text("cross");
        let stale = settled.recv().await.unwrap();
        session.toggle_multi(Facet::StoneType, "Granite").unwrap();

        assert!(!session.apply_settled(&stale));
        assert_eq!(session.selection().single(Facet::Search), None);
        assert_eq!(session.outcome().total(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn every_mutator_cancels_pending_text() {
        let mut session = session();
        let mut settled = session.debounce_text(Duration::from_millis(500));
        let mutations: [fn(&mut SearchSession); 5] = [
            |s| s.set_single(Facet::Category, "Headstones").unwrap(),
            |s| s.toggle_multi(Facet::StoneType, "Marble").unwrap(),
            |s| s.clear(Facet::StoneType),
            |s| s.hydrate("material=Granite"),
            |s| s.set_search_text("wings"),
        ];

        for mutate in mutations {
            session.type_text("angel");
            tokio::time::sleep(Duration::from_millis(100)).await;
            mutate(&mut session);
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert!(settled.try_recv().is_err());
        }
        assert_eq!(session.query_string(), "search=wings&material=Granite");
    }

    #[tokio::test(start_paused = true)]
    async fn finish_text_settles_pending_value() {
        let mut session = session();
        let mut settled = session.debounce_text(Duration::from_millis(500));

        session.type_text("angel");
        session.finish_text().await;
        let text = settled.recv().await.unwrap();
        assert_eq!(text.text(), "angel");
        assert!(session.apply_settled(&text));
        assert_eq!(settled.recv().await, None);
        assert_eq!(session.outcome().total(), 2);
    }

    #[test]
    fn type_text_without_debouncer_applies_immediately() {
        let mut session = session();
        session.type_text("cross");
        assert_eq!(session.outcome().total(), 1);
    }
}
