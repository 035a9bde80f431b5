//! Lazy cursors over the SCAN command family.
//!
//! A [`ScanCursor`] mutably borrows its [`RedisConnection`] for as long as it
//! lives. Paging never releases the connection; closing the cursor (or
//! dropping it while open) releases it exactly once.

use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::core::types::ScoredMember;
use crate::core::RedisConnection;
use crate::native::{NativeClient, ScanPage};
use crate::{Error, Result};

/// `MATCH` / `COUNT` hints sent with every page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    count: Option<u64>,
    pattern: Option<Bytes>,
}

impl ScanOptions {
    /// Options with no hints; the server picks the page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `COUNT` hint.
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the `MATCH` glob pattern.
    pub fn pattern(mut self, pattern: impl Into<Bytes>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// The configured `COUNT` hint.
    pub fn get_count(&self) -> Option<u64> {
        self.count
    }

    /// The configured `MATCH` pattern.
    pub fn get_pattern(&self) -> Option<&Bytes> {
        self.pattern.as_ref()
    }

    /// Arguments to append after the cursor token.
    pub fn to_args(&self) -> Vec<Bytes> {
        let mut args = Vec::with_capacity(4);
        if let Some(pattern) = &self.pattern {
            args.push(Bytes::from_static(b"MATCH"));
            args.push(pattern.clone());
        }
        if let Some(count) = self.count {
            args.push(Bytes::from_static(b"COUNT"));
            args.push(Bytes::from(count.to_string()));
        }
        args
    }
}

/// Page fetcher bound to one of the native scan methods.
pub(crate) type Fetch<C, T> = fn(&mut C, &[u8], &str, &ScanOptions) -> Result<ScanPage<T>>;

pub(crate) fn fetch_keys<C: NativeClient>(
    client: &mut C,
    _key: &[u8],
    cursor: &str,
    options: &ScanOptions,
) -> Result<ScanPage<Bytes>> {
    client.scan(cursor, options)
}

pub(crate) fn fetch_set_members<C: NativeClient>(
    client: &mut C,
    key: &[u8],
    cursor: &str,
    options: &ScanOptions,
) -> Result<ScanPage<Bytes>> {
    client.sscan(key, cursor, options)
}

pub(crate) fn fetch_hash_entries<C: NativeClient>(
    client: &mut C,
    key: &[u8],
    cursor: &str,
    options: &ScanOptions,
) -> Result<ScanPage<(Bytes, Bytes)>> {
    client.hscan(key, cursor, options)
}

pub(crate) fn fetch_scored_members<C: NativeClient>(
    client: &mut C,
    key: &[u8],
    cursor: &str,
    options: &ScanOptions,
) -> Result<ScanPage<ScoredMember>> {
    client.zscan(key, cursor, options)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Open,
    Closed,
}

/// Iterator over one SCAN-family traversal.
///
/// Created by [`RedisConnection::scan`], [`RedisConnection::s_scan`],
/// [`RedisConnection::h_scan`] and [`RedisConnection::z_scan`]. Nothing is
/// sent until the first call to [`has_next`](ScanCursor::has_next) or
/// [`next`](Iterator::next).
///
/// Items are yielded as `Result<T>`. A failed page request is yielded once
/// and ends the iteration; the cursor can still be closed afterwards.
///
/// The cursor owns the rest of the connection's life. Closing it, or
/// dropping it unclosed, quits the underlying client and leaves the
/// [`RedisConnection`] closed, so `for key in conn.scan(options)? { .. }`
/// is the last thing that connection does. Open a separate connection for a
/// traversal when the original must stay usable.
///
/// # Example
///
/// ```no_run
/// use redbridge::{ConnectionBuilder, ScanOptions};
///
/// # fn main() -> redbridge::Result<()> {
/// let mut conn = ConnectionBuilder::new().address("redis://127.0.0.1").connect()?;
/// let mut cursor = conn.scan(ScanOptions::new().pattern("session:*").count(500))?;
/// for key in cursor.by_ref() {
///     println!("{:?}", key?);
/// }
/// cursor.close()?;
/// # Ok(())
/// # }
/// ```
pub struct ScanCursor<'c, C: NativeClient, T> {
    connection: &'c mut RedisConnection<C>,
    fetch: Fetch<C, T>,
    key: Bytes,
    options: ScanOptions,
    cursor_id: String,
    fetched: bool,
    buffer: VecDeque<T>,
    position: u64,
    state: CursorState,
    failed: bool,
}

impl<'c, C: NativeClient, T> ScanCursor<'c, C, T> {
    pub(crate) fn new(
        connection: &'c mut RedisConnection<C>,
        fetch: Fetch<C, T>,
        key: Bytes,
        options: ScanOptions,
    ) -> Self {
        Self {
            connection,
            fetch,
            key,
            options,
            cursor_id: "0".to_string(),
            fetched: false,
            buffer: VecDeque::new(),
            position: 0,
            state: CursorState::Open,
            failed: false,
        }
    }

    /// Returns true if another item is available, fetching pages as needed.
    pub fn has_next(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.failed {
            return Ok(false);
        }
        while self.buffer.is_empty() && !self.is_exhausted() {
            self.fetch_page()?;
        }
        Ok(!self.buffer.is_empty())
    }

    /// Releases the connection. Closing an already closed cursor is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.state = CursorState::Closed;
        self.buffer.clear();
        debug!(position = self.position, cursor = %self.cursor_id, "closing scan cursor");
        self.connection.close()
    }

    /// Last cursor token reported by the server (`"0"` before the first page).
    pub fn cursor_id(&self) -> &str {
        &self.cursor_id
    }

    /// Number of items delivered so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns true once [`close`](ScanCursor::close) has run.
    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    fn is_exhausted(&self) -> bool {
        self.fetched && self.cursor_id == "0"
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            CursorState::Open => Ok(()),
            CursorState::Closed => Err(Error::InvalidApiUsage {
                message: "cannot access closed cursor".to_string(),
            }),
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let fetch = self.fetch;
        let page = self
            .connection
            .native()
            .and_then(|client| fetch(client, &self.key, &self.cursor_id, &self.options));

        match page {
            Ok(page) => {
                debug!(cursor = %page.cursor, items = page.items.len(), "fetched scan page");
                self.cursor_id = page.cursor;
                self.buffer.extend(page.items);
                self.fetched = true;
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }
}

impl<C: NativeClient, T> Iterator for ScanCursor<'_, C, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => {
                self.position += 1;
                self.buffer.pop_front().map(Ok)
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<C: NativeClient, T> Drop for ScanCursor<'_, C, T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to release connection held by scan cursor");
        }
    }
}

impl<C: NativeClient, T> fmt::Debug for ScanCursor<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanCursor")
            .field("cursor_id", &self.cursor_id)
            .field("position", &self.position)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_args_order() {
        let options = ScanOptions::new().count(10).pattern("a*");
        let args: Vec<Bytes> = options.to_args();
        assert_eq!(
            args,
            vec![
                Bytes::from("MATCH"),
                Bytes::from("a*"),
                Bytes::from("COUNT"),
                Bytes::from("10"),
            ]
        );
    }

    #[test]
    fn test_default_options_are_empty() {
        let options = ScanOptions::default();
        assert!(options.to_args().is_empty());
        assert_eq!(options.get_count(), None);
        assert_eq!(options.get_pattern(), None);
    }
}
