//! Lazy decompression cache for compressed in-memory kernel text.
//!
//! # Responsibility
//! - Remember which raw buffers are compressed.
//! - Decompress each registered buffer at most once and memoize the result.
//!
//! # Invariants
//! - Check, decompress and store happen under one lock acquisition.
//! - A memoized entry never changes and is never evicted.
//! - Unregistered buffers miss the cache and are served raw by callers.
//! - The built-in routine aborts instead of returning unverified bytes.

use log::{debug, error};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

const LENGTH_PREFIX_BYTES: usize = std::mem::size_of::<u64>();

/// Decompression routine for compressed kernel text.
///
/// Receives the raw registered buffer (framing included) and returns the
/// decompressed text bytes. Implementations must abort rather than return
/// garbage: there is no recoverable error path.
pub trait TextDecompressor: Send + Sync {
    fn decompress(&self, raw: &[u8]) -> Vec<u8>;
}

impl<F> TextDecompressor for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn decompress(&self, raw: &[u8]) -> Vec<u8> {
        self(raw)
    }
}

/// Built-in routine: validates the length-prefixed framing, then aborts.
///
/// No compression codec ships with the core; callers that store compressed
/// text must inject their own [`TextDecompressor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDecompressor;

impl TextDecompressor for UnsupportedDecompressor {
    fn decompress(&self, raw: &[u8]) -> Vec<u8> {
        match split_length_prefixed(raw) {
            Ok(payload) => {
                error!(
                    "event=text_decompress module=cache status=error error_code=codec_unsupported payload_bytes={}",
                    payload.len()
                );
                panic!(
                    "bzip2 decompression of kernel text is not supported ({} byte payload)",
                    payload.len()
                );
            }
            Err(err) => {
                error!(
                    "event=text_decompress module=cache status=error error_code=invalid_framing error={}",
                    err
                );
                panic!("compressed kernel text has invalid framing: {err}");
            }
        }
    }
}

/// Splits a compressed block into its payload.
///
/// Layout: 8-byte little-endian payload length, then the payload. Trailing
/// bytes after the declared payload are ignored.
pub fn split_length_prefixed(raw: &[u8]) -> Result<&[u8], FramingError> {
    let Some((prefix, rest)) = raw.split_first_chunk::<LENGTH_PREFIX_BYTES>() else {
        return Err(FramingError::MissingLengthPrefix { len: raw.len() });
    };
    let declared = u64::from_le_bytes(*prefix);
    match usize::try_from(declared) {
        Ok(len) if len <= rest.len() => Ok(&rest[..len]),
        _ => Err(FramingError::TruncatedPayload {
            declared,
            available: rest.len(),
        }),
    }
}

/// Errors in the length-prefixed compressed block layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    MissingLengthPrefix { len: usize },
    TruncatedPayload { declared: u64, available: usize },
}

impl Display for FramingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLengthPrefix { len } => write!(
                f,
                "buffer of {len} bytes is shorter than the {LENGTH_PREFIX_BYTES}-byte length prefix"
            ),
            Self::TruncatedPayload {
                declared,
                available,
            } => write!(
                f,
                "declared payload of {declared} bytes exceeds the {available} available"
            ),
        }
    }
}

impl Error for FramingError {}

/// Identity of a raw buffer: its address and length.
///
/// Two table entries that point at the same buffer share one cache entry,
/// so shared compressed text is decompressed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey {
    addr: usize,
    len: usize,
}

impl ContentKey {
    pub fn of(raw: &[u8]) -> Self {
        Self {
            addr: raw.as_ptr() as usize,
            len: raw.len(),
        }
    }
}

/// Memoizing map from raw compressed buffer to its decompressed form.
///
/// Queries go through `&self`; the map sits behind a mutex so concurrent
/// readers of one descriptor can resolve safely.
pub struct DecompressionCache {
    entries: Mutex<HashMap<ContentKey, Option<Arc<[u8]>>>>,
    decompressor: Arc<dyn TextDecompressor>,
}

impl DecompressionCache {
    pub fn new(decompressor: Arc<dyn TextDecompressor>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            decompressor,
        }
    }

    /// Swaps the routine used for entries that are still pending.
    pub fn set_decompressor(&mut self, decompressor: Arc<dyn TextDecompressor>) {
        self.decompressor = decompressor;
    }

    /// Registers `raw` as compressed with a pending placeholder.
    ///
    /// Re-registering a buffer keeps any memoized value.
    pub fn register(&mut self, raw: &[u8]) {
        self.entries
            .get_mut()
            .entry(ContentKey::of(raw))
            .or_insert(None);
    }

    /// Returns the decompressed form of `raw`, or `None` if `raw` was never
    /// registered as compressed.
    pub fn resolve(&self, raw: &[u8]) -> Option<Arc<[u8]>> {
        let mut entries = self.entries.lock();
        let slot = entries.get_mut(&ContentKey::of(raw))?;
        if let Some(text) = slot.as_ref() {
            return Some(Arc::clone(text));
        }

        let text: Arc<[u8]> = self.decompressor.decompress(raw).into();
        debug!(
            "event=text_decompress module=cache status=ok raw_bytes={} text_bytes={}",
            raw.len(),
            text.len()
        );
        *slot = Some(Arc::clone(&text));
        Some(text)
    }

    /// Whether `raw` was registered as compressed.
    pub fn is_registered(&self, raw: &[u8]) -> bool {
        self.entries.lock().contains_key(&ContentKey::of(raw))
    }

    /// Whether `raw` has already been decompressed and memoized.
    pub fn is_memoized(&self, raw: &[u8]) -> bool {
        matches!(self.entries.lock().get(&ContentKey::of(raw)), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for DecompressionCache {
    fn default() -> Self {
        Self::new(Arc::new(UnsupportedDecompressor))
    }
}

impl Debug for DecompressionCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        let memoized = entries.values().filter(|value| value.is_some()).count();
        f.debug_struct("DecompressionCache")
            .field("registered", &entries.len())
            .field("memoized", &memoized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        split_length_prefixed, ContentKey, DecompressionCache, FramingError, TextDecompressor,
        UnsupportedDecompressor,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut raw = (payload.len() as u64).to_le_bytes().to_vec();
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn split_length_prefixed_returns_declared_payload() {
        let mut raw = framed(b"abc");
        raw.extend_from_slice(b"trailing");
        assert_eq!(split_length_prefixed(&raw).expect("valid framing"), b"abc");
    }

    #[test]
    fn split_length_prefixed_rejects_short_and_truncated_buffers() {
        assert_eq!(
            split_length_prefixed(b"abc").expect_err("short prefix must fail"),
            FramingError::MissingLengthPrefix { len: 3 }
        );

        let mut raw = 10u64.to_le_bytes().to_vec();
        raw.extend_from_slice(b"abc");
        assert_eq!(
            split_length_prefixed(&raw).expect_err("truncated payload must fail"),
            FramingError::TruncatedPayload {
                declared: 10,
                available: 3,
            }
        );
    }

    #[test]
    fn unregistered_buffers_miss() {
        let cache = DecompressionCache::default();
        assert!(cache.resolve(b"plain").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn resolve_memoizes_after_first_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut cache = DecompressionCache::new(Arc::new(move |raw: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
            raw.to_ascii_uppercase()
        }));
        let raw = b"ptx".to_vec();
        cache.register(&raw);
        assert!(!cache.is_memoized(&raw));

        let first = cache.resolve(&raw).expect("registered buffer resolves");
        let second = cache.resolve(&raw).expect("registered buffer resolves");
        assert_eq!(&*first, b"PTX");
        assert_eq!(first, second);
        assert!(cache.is_memoized(&raw));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn identity_not_content_selects_entry() {
        let mut cache = DecompressionCache::new(Arc::new(|raw: &[u8]| raw.to_vec()));
        let registered = b"same".to_vec();
        let lookalike = b"same".to_vec();
        cache.register(&registered);

        assert_ne!(ContentKey::of(&registered), ContentKey::of(&lookalike));
        assert!(cache.resolve(&lookalike).is_none());
        assert!(cache.resolve(&registered).is_some());
    }

    #[test]
    #[should_panic(expected = "not supported")]
    fn built_in_routine_aborts_on_valid_framing() {
        UnsupportedDecompressor.decompress(&framed(b"BZh91AY&SY"));
    }

    #[test]
    #[should_panic(expected = "invalid framing")]
    fn built_in_routine_aborts_on_invalid_framing() {
        UnsupportedDecompressor.decompress(b"xx");
    }
}
