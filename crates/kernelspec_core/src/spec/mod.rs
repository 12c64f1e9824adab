//! Kernel source descriptors.
//!
//! # Responsibility
//! - Record where one named kernel's code lives, one descriptor per kind.
//! - Offer a closed, borrowed sum type over the five descriptor kinds.
//!
//! # Invariants
//! - Every descriptor carries the kernel name it was constructed with.
//! - Descriptors are immutable after construction; the only interior
//!   mutability is the decompression cache of multi-version text.
//! - Descriptors never read files or launch anything.

mod in_memory;
mod multi_version;
mod on_disk;
mod symbol;

pub use in_memory::InMemoryBinaryBlob;
pub use multi_version::{InMemoryMultiVersionText, KernelText, TextSpec};
pub use on_disk::{OnDiskBinaryImage, OnDiskTextImage};
pub use symbol::{InProcessSymbol, SymbolAddress};

use std::fmt::{Display, Formatter};

/// Named identity shared by every descriptor kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelLoaderSpec {
    kernel_name: String,
}

impl KernelLoaderSpec {
    pub fn new(kernel_name: impl Into<String>) -> Self {
        Self {
            kernel_name: kernel_name.into(),
        }
    }

    pub fn kernel_name(&self) -> &str {
        &self.kernel_name
    }
}

/// The five mutually exclusive descriptor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KernelSourceKind {
    InProcessSymbol,
    OnDiskText,
    OnDiskBinary,
    InMemoryBinary,
    InMemoryMultiVersionText,
}

impl KernelSourceKind {
    pub const ALL: [Self; 5] = [
        Self::InProcessSymbol,
        Self::OnDiskText,
        Self::OnDiskBinary,
        Self::InMemoryBinary,
        Self::InMemoryMultiVersionText,
    ];

    /// Stable label used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProcessSymbol => "in_process_symbol",
            Self::OnDiskText => "on_disk_text",
            Self::OnDiskBinary => "on_disk_binary",
            Self::InMemoryBinary => "in_memory_binary",
            Self::InMemoryMultiVersionText => "in_memory_multi_version_text",
        }
    }
}

impl Display for KernelSourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one populated descriptor.
#[derive(Debug, Clone, Copy)]
pub enum KernelSource<'r, 'a> {
    InProcessSymbol(&'r InProcessSymbol),
    OnDiskText(&'r OnDiskTextImage),
    OnDiskBinary(&'r OnDiskBinaryImage),
    InMemoryBinary(&'r InMemoryBinaryBlob<'a>),
    InMemoryMultiVersionText(&'r InMemoryMultiVersionText<'a>),
}

impl<'r, 'a> KernelSource<'r, 'a> {
    pub fn kind(&self) -> KernelSourceKind {
        match self {
            Self::InProcessSymbol(_) => KernelSourceKind::InProcessSymbol,
            Self::OnDiskText(_) => KernelSourceKind::OnDiskText,
            Self::OnDiskBinary(_) => KernelSourceKind::OnDiskBinary,
            Self::InMemoryBinary(_) => KernelSourceKind::InMemoryBinary,
            Self::InMemoryMultiVersionText(_) => KernelSourceKind::InMemoryMultiVersionText,
        }
    }

    pub fn kernel_name(&self) -> &'r str {
        self.header().kernel_name()
    }

    fn header(&self) -> &'r KernelLoaderSpec {
        match *self {
            Self::InProcessSymbol(spec) => spec.header(),
            Self::OnDiskText(spec) => spec.header(),
            Self::OnDiskBinary(spec) => spec.header(),
            Self::InMemoryBinary(spec) => spec.header(),
            Self::InMemoryMultiVersionText(spec) => spec.header(),
        }
    }
}
