//! In-memory text keyed by compute capability.
//!
//! # Responsibility
//! - Keep one kernel text per capability, sorted by capability.
//! - Serve raw text, or decompressed text through the owned cache.
//!
//! # Invariants
//! - Lookups are exact: a missing capability is `None`, never a neighbour.
//! - The default text is the one stored under the smallest capability.
//! - When built compressed, every stored buffer is registered in the cache
//!   before the descriptor is handed out.

use super::KernelLoaderSpec;
use crate::capability::ComputeCapability;
use crate::decompress::{DecompressionCache, TextDecompressor};
use log::warn;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::str::Utf8Error;
use std::sync::Arc;

/// One `(major, minor, text)` entry of an explicit version list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpec<'a> {
    pub capability: ComputeCapability,
    pub text: Cow<'a, [u8]>,
}

impl<'a> TextSpec<'a> {
    pub fn new(major: i32, minor: i32, text: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            capability: ComputeCapability::new(major, minor),
            text: text.into(),
        }
    }
}

impl<'a> From<(i32, i32, &'a str)> for TextSpec<'a> {
    fn from((major, minor, text): (i32, i32, &'a str)) -> Self {
        Self::new(major, minor, text.as_bytes())
    }
}

impl<'a> From<(i32, i32, &'a [u8])> for TextSpec<'a> {
    fn from((major, minor, text): (i32, i32, &'a [u8])) -> Self {
        Self::new(major, minor, text)
    }
}

/// Text returned by a table lookup: either the stored buffer itself or the
/// memoized decompressed form.
#[derive(Debug, Clone)]
pub enum KernelText<'t> {
    Raw(&'t [u8]),
    Decompressed(Arc<[u8]>),
}

impl KernelText<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Raw(bytes) => bytes,
            Self::Decompressed(bytes) => bytes,
        }
    }

    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    pub fn is_decompressed(&self) -> bool {
        matches!(self, Self::Decompressed(_))
    }
}

impl Deref for KernelText<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for KernelText<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for KernelText<'_> {}

/// Multi-version in-memory kernel text (e.g. PTX per target).
#[derive(Debug)]
pub struct InMemoryMultiVersionText<'a> {
    header: KernelLoaderSpec,
    by_capability: BTreeMap<ComputeCapability, Cow<'a, [u8]>>,
    compressed: bool,
    cache: DecompressionCache,
}

impl<'a> InMemoryMultiVersionText<'a> {
    /// Builds a table with a single text stored under
    /// [`ComputeCapability::MINIMUM`], which makes it the default.
    pub fn new(
        text: impl Into<Cow<'a, [u8]>>,
        kernel_name: impl Into<String>,
        compressed: bool,
    ) -> Self {
        let mut by_capability = BTreeMap::new();
        by_capability.insert(ComputeCapability::MINIMUM, text.into());
        Self::from_table(KernelLoaderSpec::new(kernel_name), by_capability, compressed)
    }

    /// Builds a table from an explicit version list.
    ///
    /// A repeated capability replaces the earlier entry.
    pub fn from_specs<I, S>(specs: I, kernel_name: impl Into<String>, compressed: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TextSpec<'a>>,
    {
        let header = KernelLoaderSpec::new(kernel_name);
        let mut by_capability = BTreeMap::new();
        for spec in specs {
            let TextSpec { capability, text } = spec.into();
            if by_capability.insert(capability, text).is_some() {
                warn!(
                    "event=capability_overwrite module=spec status=warn kernel={} capability={}",
                    header.kernel_name(),
                    capability
                );
            }
        }
        Self::from_table(header, by_capability, compressed)
    }

    fn from_table(
        header: KernelLoaderSpec,
        by_capability: BTreeMap<ComputeCapability, Cow<'a, [u8]>>,
        compressed: bool,
    ) -> Self {
        let mut cache = DecompressionCache::default();
        if compressed {
            for text in by_capability.values() {
                cache.register(text);
            }
        }
        Self {
            header,
            by_capability,
            compressed,
            cache,
        }
    }

    /// Replaces the routine used to decompress registered text.
    pub fn with_decompressor(mut self, decompressor: Arc<dyn TextDecompressor>) -> Self {
        self.cache.set_decompressor(decompressor);
        self
    }

    /// Decompressed text for exactly `capability`.
    pub fn text(&self, capability: impl Into<ComputeCapability>) -> Option<KernelText<'_>> {
        let raw = self.by_capability.get(&capability.into())?;
        Some(self.resolve(raw))
    }

    /// Decompressed text stored under the smallest capability.
    pub fn default_text(&self) -> Option<KernelText<'_>> {
        let (_, raw) = self.by_capability.first_key_value()?;
        Some(self.resolve(raw))
    }

    /// Stored buffer for exactly `capability`, never decompressed.
    pub fn original_text(&self, capability: impl Into<ComputeCapability>) -> Option<&[u8]> {
        self.by_capability
            .get(&capability.into())
            .map(|raw| raw.as_ref())
    }

    /// Stored buffer under the smallest capability, never decompressed.
    pub fn original_default_text(&self) -> Option<&[u8]> {
        self.by_capability
            .first_key_value()
            .map(|(_, raw)| raw.as_ref())
    }

    /// Capabilities present in the table, ascending.
    pub fn capabilities(&self) -> impl Iterator<Item = ComputeCapability> + '_ {
        self.by_capability.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_capability.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_capability.is_empty()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn kernel_name(&self) -> &str {
        self.header.kernel_name()
    }

    pub fn cache(&self) -> &DecompressionCache {
        &self.cache
    }

    pub(crate) fn header(&self) -> &KernelLoaderSpec {
        &self.header
    }

    fn resolve<'t>(&'t self, raw: &'t [u8]) -> KernelText<'t> {
        match self.cache.resolve(raw) {
            Some(text) => KernelText::Decompressed(text),
            None => KernelText::Raw(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryMultiVersionText, TextSpec};
    use crate::capability::ComputeCapability;

    #[test]
    fn single_buffer_lands_under_minimum_capability() {
        let table = InMemoryMultiVersionText::new("ptx".as_bytes(), "k", false);
        assert_eq!(
            table.capabilities().collect::<Vec<_>>(),
            vec![ComputeCapability::MINIMUM]
        );
        assert_eq!(table.original_text(ComputeCapability::MINIMUM), Some(&b"ptx"[..]));
    }

    #[test]
    fn later_duplicate_capability_wins() {
        let table = InMemoryMultiVersionText::from_specs(
            [(7, 0, "first"), (7, 0, "second")],
            "k",
            false,
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.original_text((7, 0)), Some(&b"second"[..]));
    }

    #[test]
    fn empty_table_has_no_default() {
        let table = InMemoryMultiVersionText::from_specs(Vec::<TextSpec<'_>>::new(), "k", false);
        assert!(table.is_empty());
        assert!(table.default_text().is_none());
        assert!(table.original_default_text().is_none());
    }

    #[test]
    fn uncompressed_lookups_return_raw_buffer() {
        let ptx = String::from("ptx body");
        let table = InMemoryMultiVersionText::from_specs([(8, 0, ptx.as_str())], "k", false);
        let text = table.text((8, 0)).expect("present capability");
        assert!(!text.is_decompressed());
        assert_eq!(text.as_ptr(), ptx.as_ptr());
        assert_eq!(text.to_str().expect("utf8"), "ptx body");
        assert!(table.cache().is_empty());
    }

    #[test]
    fn compressed_table_registers_every_buffer() {
        let table = InMemoryMultiVersionText::from_specs(
            [(5, 0, "a"), (6, 0, "bb"), (7, 0, "ccc")],
            "k",
            true,
        );
        assert!(table.is_compressed());
        assert_eq!(table.cache().len(), 3);
    }
}
