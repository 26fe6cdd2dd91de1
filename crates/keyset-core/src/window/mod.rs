//! Page windows: resolving a request into one bounded read.
//!
//! A request names a window (rows strictly between the `after` and `before`
//! cursors) and an end to take rows from. Taking the last `n` rows runs the
//! same head-first read over the reversed ordering, then flips the result,
//! so every request executes as a single "first `n + 1`" query. The extra
//! probe row tells whether more rows lie beyond the page without a second
//! query.

mod page;
mod request;

use std::borrow::Cow;

pub use self::page::{Edge, PageInfo, Window};
pub use self::request::{Anchor, WindowRequest};
use crate::TRACING_TARGET_WINDOW;
use crate::config::KeysetConfig;
use crate::cursor::CursorCodec;
use crate::error::{Error, Result};
use crate::ordering::{KeysetOrdering, OrderExtractor};
use crate::predicate::{Condition, Direction, PredicateBuilder};
use crate::source::{OrderedSource, SliceQuery};

/// Serves keyset pages over one ordered source.
///
/// The ordering is extracted and validated once, when the paginator is
/// created; every request afterwards reuses it.
#[derive(Debug)]
pub struct Paginator<S> {
    source: S,
    codec: CursorCodec,
    config: KeysetConfig,
}

impl<S: OrderedSource> Paginator<S> {
    /// Creates a paginator, validating the source's declared ordering.
    ///
    /// Fails with [`Error::Configuration`] if the ordering cannot be paged
    /// over.
    pub fn new(source: S, config: KeysetConfig) -> Result<Self> {
        let config = config.validate();
        let ordering = {
            let extractor =
                OrderExtractor::new(source.schema()).with_strict(config.strict_ordering);
            let declared = if config.append_tie_breaker {
                Cow::Owned(extractor.with_tie_breaker(source.declared_order()))
            } else {
                Cow::Borrowed(source.declared_order())
            };
            extractor.extract(&declared)?
        };

        let codec = CursorCodec::new(ordering).with_fingerprint_check(config.verify_fingerprint);
        Ok(Self {
            source,
            codec,
            config,
        })
    }

    /// Returns the underlying source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the validated ordering.
    #[inline]
    pub fn ordering(&self) -> &KeysetOrdering {
        self.codec.ordering()
    }

    /// Returns the cursor codec of this paginator.
    #[inline]
    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    /// Returns the active configuration.
    #[inline]
    pub fn config(&self) -> &KeysetConfig {
        &self.config
    }

    /// Fetches one page.
    ///
    /// Conflicting arguments and invalid cursors are rejected before the
    /// source is queried. Storage failures surface as [`Error::Source`].
    #[tracing::instrument(skip_all, target = TRACING_TARGET_WINDOW)]
    pub async fn paginate(&self, request: &WindowRequest) -> Result<Window<S::Item>> {
        let (anchor, count) = request.resolve(self.config.max_page_size)?;
        let query = self.slice_query(request, anchor, count)?;

        let mut rows = self.source.fetch(&query).await.map_err(|error| {
            tracing::error!(target: TRACING_TARGET_WINDOW, error = %error, "Source query failed");
            Error::from_source(error)
        })?;

        let probe = rows.len() > count as usize;
        rows.truncate(count as usize);
        if anchor == Anchor::Tail {
            rows.reverse();
        }

        let has_previous_page = request.after.is_some() || (anchor == Anchor::Tail && probe);
        let has_next_page = request.before.is_some() || (anchor == Anchor::Head && probe);

        tracing::debug!(
            target: TRACING_TARGET_WINDOW,
            ?anchor,
            count,
            returned = rows.len(),
            has_previous_page,
            has_next_page,
            "Resolved window"
        );

        Ok(Window::new(
            rows,
            has_previous_page,
            has_next_page,
            self.codec.clone(),
        ))
    }

    /// Builds the single read that serves a request.
    ///
    /// The limit is always `count + 1`: for `count == 0` the one fetched row
    /// only answers whether anything lies beyond, and is discarded.
    fn slice_query(
        &self,
        request: &WindowRequest,
        anchor: Anchor,
        count: u32,
    ) -> Result<SliceQuery> {
        let builder = PredicateBuilder::new(self.ordering());

        let mut bounds = Vec::with_capacity(2);
        if let Some(token) = &request.after {
            let values = self.codec.decode(token)?;
            bounds.push(builder.build(&values, Direction::After)?);
        }
        if let Some(token) = &request.before {
            let values = self.codec.decode(token)?;
            bounds.push(builder.build(&values, Direction::Before)?);
        }

        let condition = match Condition::and(bounds) {
            Condition::Const(true) => None,
            condition => Some(condition),
        };

        let ordering = match anchor {
            Anchor::Head => self.ordering().clone(),
            Anchor::Tail => self.ordering().reversed(),
        };

        Ok(SliceQuery {
            ordering,
            condition,
            limit: count as usize + 1,
        })
    }
}
