//! Hand-off contract between a loader spec and the device loading layer.
//!
//! The device layer owns file reads, module loading and launch; the core
//! only tells it which image to use.

use crate::spec::{KernelSourceKind, KernelText, SymbolAddress};
use std::path::Path;

/// Image chosen for one kernel.
#[derive(Debug, Clone)]
pub enum ResolvedKernelImage<'r> {
    /// Binary image bytes held in memory.
    Binary(&'r [u8]),
    /// Text image, already decompressed when it was stored compressed.
    Text(KernelText<'r>),
    /// Binary image the device layer still has to read.
    BinaryFile(&'r Path),
    /// Text image the device layer still has to read.
    TextFile(&'r Path),
    /// Code already linked into the process.
    Symbol(SymbolAddress),
}

/// Result of [`crate::MultiKernelLoaderSpec::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedKernel<'r> {
    pub kernel_name: &'r str,
    pub kind: KernelSourceKind,
    /// Expected number of call arguments.
    pub arity: usize,
    pub image: ResolvedKernelImage<'r>,
}

/// Implemented by the device layer that turns an image into a loaded kernel.
pub trait KernelImageLoader {
    type Kernel;
    type Error;

    fn load(&self, kernel: ResolvedKernel<'_>) -> Result<Self::Kernel, Self::Error>;
}
