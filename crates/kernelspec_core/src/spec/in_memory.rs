//! In-memory binary descriptor.

use super::KernelLoaderSpec;
use std::borrow::Cow;

/// Binary kernel image (e.g. cubin) held in memory.
///
/// Passing `&'a [u8]` borrows the caller's buffer without copying; the
/// buffer must outlive the descriptor, which the lifetime enforces.
/// Passing `Vec<u8>` transfers ownership instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryBinaryBlob<'a> {
    header: KernelLoaderSpec,
    bytes: Cow<'a, [u8]>,
}

impl<'a> InMemoryBinaryBlob<'a> {
    pub fn new(bytes: impl Into<Cow<'a, [u8]>>, kernel_name: impl Into<String>) -> Self {
        Self {
            header: KernelLoaderSpec::new(kernel_name),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the descriptor borrows the caller's buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    pub fn kernel_name(&self) -> &str {
        self.header.kernel_name()
    }

    pub(crate) fn header(&self) -> &KernelLoaderSpec {
        &self.header
    }
}
