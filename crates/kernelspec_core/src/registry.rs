//! Per-kernel aggregate of source descriptors.
//!
//! # Responsibility
//! - Hold at most one descriptor of each kind for one kernel slot.
//! - Record the expected call arity for the external loading layer.
//! - Pick the image a device layer should load for a capability.
//!
//! # Invariants
//! - Every slot is assigned at most once; reassignment aborts.
//! - Arity is fixed at construction and never affects source selection.
//! - The registry performs no I/O and no eager decompression.

use crate::capability::ComputeCapability;
use crate::decompress::TextDecompressor;
use crate::resolve::{KernelImageLoader, ResolvedKernel, ResolvedKernelImage};
use crate::spec::{
    InMemoryBinaryBlob, InMemoryMultiVersionText, InProcessSymbol, KernelSource, KernelSourceKind,
    OnDiskBinaryImage, OnDiskTextImage, SymbolAddress, TextSpec,
};
use log::{debug, error};
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Loader spec aggregate for one kernel.
///
/// Setters chain:
///
/// ```
/// use kernelspec_core::MultiKernelLoaderSpec;
///
/// let mut spec = MultiKernelLoaderSpec::new(2);
/// spec.add_on_disk_binary("saxpy.cubin", "saxpy")
///     .add_in_memory_text("// ptx".as_bytes(), "saxpy");
/// assert!(spec.has_on_disk_binary() && spec.has_in_memory_text());
/// ```
pub struct MultiKernelLoaderSpec<'a> {
    arity: usize,
    decompressor: Option<Arc<dyn TextDecompressor>>,
    in_process_symbol: Option<InProcessSymbol>,
    on_disk_text: Option<OnDiskTextImage>,
    on_disk_binary: Option<OnDiskBinaryImage>,
    in_memory_binary: Option<InMemoryBinaryBlob<'a>>,
    in_memory_text: Option<InMemoryMultiVersionText<'a>>,
}

impl<'a> MultiKernelLoaderSpec<'a> {
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            decompressor: None,
            in_process_symbol: None,
            on_disk_text: None,
            on_disk_binary: None,
            in_memory_binary: None,
            in_memory_text: None,
        }
    }

    /// Routine used by the text slot, whether it is already populated or
    /// added afterwards.
    ///
    /// Without one, reading compressed text aborts.
    pub fn with_decompressor(mut self, decompressor: Arc<dyn TextDecompressor>) -> Self {
        self.in_memory_text = self
            .in_memory_text
            .take()
            .map(|text| text.with_decompressor(Arc::clone(&decompressor)));
        self.decompressor = Some(decompressor);
        self
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn add_in_process_symbol(
        &mut self,
        symbol: SymbolAddress,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        let kernel_name = kernel_name.into();
        claim_slot(&self.in_process_symbol, KernelSourceKind::InProcessSymbol, &kernel_name);
        log_added(KernelSourceKind::InProcessSymbol, &kernel_name);
        self.in_process_symbol = Some(InProcessSymbol::new(symbol, kernel_name));
        self
    }

    pub fn add_on_disk_text(
        &mut self,
        filename: impl Into<String>,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        let kernel_name = kernel_name.into();
        claim_slot(&self.on_disk_text, KernelSourceKind::OnDiskText, &kernel_name);
        log_added(KernelSourceKind::OnDiskText, &kernel_name);
        self.on_disk_text = Some(OnDiskTextImage::new(filename, kernel_name));
        self
    }

    pub fn add_on_disk_binary(
        &mut self,
        filename: impl Into<String>,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        let kernel_name = kernel_name.into();
        claim_slot(&self.on_disk_binary, KernelSourceKind::OnDiskBinary, &kernel_name);
        log_added(KernelSourceKind::OnDiskBinary, &kernel_name);
        self.on_disk_binary = Some(OnDiskBinaryImage::new(filename, kernel_name));
        self
    }

    /// Borrows (`&'a [u8]`) or takes (`Vec<u8>`) a binary image.
    pub fn add_in_memory_binary(
        &mut self,
        bytes: impl Into<Cow<'a, [u8]>>,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        let kernel_name = kernel_name.into();
        claim_slot(&self.in_memory_binary, KernelSourceKind::InMemoryBinary, &kernel_name);
        log_added(KernelSourceKind::InMemoryBinary, &kernel_name);
        self.in_memory_binary = Some(InMemoryBinaryBlob::new(bytes, kernel_name));
        self
    }

    /// Single text used as the default for every capability.
    pub fn add_in_memory_text(
        &mut self,
        text: impl Into<Cow<'a, [u8]>>,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        self.put_in_memory_text(kernel_name.into(), false, |name| {
            InMemoryMultiVersionText::new(text, name, false)
        })
    }

    /// Single compressed text, decompressed on first read.
    pub fn add_compressed_in_memory_text(
        &mut self,
        text: impl Into<Cow<'a, [u8]>>,
        kernel_name: impl Into<String>,
    ) -> &mut Self {
        self.put_in_memory_text(kernel_name.into(), true, |name| {
            InMemoryMultiVersionText::new(text, name, true)
        })
    }

    /// One text per capability.
    pub fn add_in_memory_text_versions<I, S>(
        &mut self,
        specs: I,
        kernel_name: impl Into<String>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TextSpec<'a>>,
    {
        self.put_in_memory_text(kernel_name.into(), false, |name| {
            InMemoryMultiVersionText::from_specs(specs, name, false)
        })
    }

    /// One compressed text per capability, each decompressed on first read.
    pub fn add_compressed_in_memory_text_versions<I, S>(
        &mut self,
        specs: I,
        kernel_name: impl Into<String>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TextSpec<'a>>,
    {
        self.put_in_memory_text(kernel_name.into(), true, |name| {
            InMemoryMultiVersionText::from_specs(specs, name, true)
        })
    }

    fn put_in_memory_text(
        &mut self,
        kernel_name: String,
        compressed: bool,
        build: impl FnOnce(String) -> InMemoryMultiVersionText<'a>,
    ) -> &mut Self {
        claim_slot(
            &self.in_memory_text,
            KernelSourceKind::InMemoryMultiVersionText,
            &kernel_name,
        );
        debug!(
            "event=spec_add module=registry status=ok kind={} kernel={} compressed={}",
            KernelSourceKind::InMemoryMultiVersionText,
            kernel_name,
            compressed
        );
        let mut text = build(kernel_name);
        if let Some(decompressor) = &self.decompressor {
            text = text.with_decompressor(Arc::clone(decompressor));
        }
        self.in_memory_text = Some(text);
        self
    }

    pub fn has_in_process_symbol(&self) -> bool {
        self.in_process_symbol.is_some()
    }

    pub fn has_on_disk_text(&self) -> bool {
        self.on_disk_text.is_some()
    }

    pub fn has_on_disk_binary(&self) -> bool {
        self.on_disk_binary.is_some()
    }

    pub fn has_in_memory_binary(&self) -> bool {
        self.in_memory_binary.is_some()
    }

    pub fn has_in_memory_text(&self) -> bool {
        self.in_memory_text.is_some()
    }

    pub fn in_process_symbol(&self) -> Option<&InProcessSymbol> {
        self.in_process_symbol.as_ref()
    }

    pub fn on_disk_text(&self) -> Option<&OnDiskTextImage> {
        self.on_disk_text.as_ref()
    }

    pub fn on_disk_binary(&self) -> Option<&OnDiskBinaryImage> {
        self.on_disk_binary.as_ref()
    }

    pub fn in_memory_binary(&self) -> Option<&InMemoryBinaryBlob<'a>> {
        self.in_memory_binary.as_ref()
    }

    pub fn in_memory_text(&self) -> Option<&InMemoryMultiVersionText<'a>> {
        self.in_memory_text.as_ref()
    }

    /// Populated descriptors in [`KernelSourceKind::ALL`] order.
    pub fn sources(&self) -> impl Iterator<Item = KernelSource<'_, 'a>> + '_ {
        [
            self.in_process_symbol.as_ref().map(KernelSource::InProcessSymbol),
            self.on_disk_text.as_ref().map(KernelSource::OnDiskText),
            self.on_disk_binary.as_ref().map(KernelSource::OnDiskBinary),
            self.in_memory_binary.as_ref().map(KernelSource::InMemoryBinary),
            self.in_memory_text
                .as_ref()
                .map(KernelSource::InMemoryMultiVersionText),
        ]
        .into_iter()
        .flatten()
    }

    pub fn source(&self, kind: KernelSourceKind) -> Option<KernelSource<'_, 'a>> {
        self.sources().find(|source| source.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.sources().next().is_none()
    }

    /// Picks the image a device layer should load.
    ///
    /// Preference: in-memory binary, in-memory text (exact `capability`,
    /// else the table default), on-disk binary, on-disk text, in-process
    /// symbol. With `capability = None` the text table default is used.
    pub fn resolve(&self, capability: Option<ComputeCapability>) -> Option<ResolvedKernel<'_>> {
        let resolved = self.pick_image(capability);
        match &resolved {
            Some(kernel) => debug!(
                "event=spec_resolve module=registry status=ok kind={} kernel={} capability={}",
                kernel.kind,
                kernel.kernel_name,
                capability.map_or_else(|| "default".to_string(), |value| value.to_string())
            ),
            None => debug!("event=spec_resolve module=registry status=miss"),
        }
        resolved
    }

    /// Resolves an image and hands it to `loader`.
    ///
    /// Returns `None` when no descriptor can provide an image.
    pub fn load_with<L: KernelImageLoader>(
        &self,
        loader: &L,
        capability: Option<ComputeCapability>,
    ) -> Option<Result<L::Kernel, L::Error>> {
        self.resolve(capability).map(|kernel| loader.load(kernel))
    }

    fn pick_image(&self, capability: Option<ComputeCapability>) -> Option<ResolvedKernel<'_>> {
        if let Some(blob) = &self.in_memory_binary {
            return Some(self.resolved(
                KernelSourceKind::InMemoryBinary,
                blob.kernel_name(),
                ResolvedKernelImage::Binary(blob.bytes()),
            ));
        }

        if let Some(table) = &self.in_memory_text {
            let text = match capability {
                Some(capability) => table.text(capability).or_else(|| table.default_text()),
                None => table.default_text(),
            };
            if let Some(text) = text {
                return Some(self.resolved(
                    KernelSourceKind::InMemoryMultiVersionText,
                    table.kernel_name(),
                    ResolvedKernelImage::Text(text),
                ));
            }
        }

        if let Some(image) = &self.on_disk_binary {
            return Some(self.resolved(
                KernelSourceKind::OnDiskBinary,
                image.kernel_name(),
                ResolvedKernelImage::BinaryFile(image.path()),
            ));
        }

        if let Some(image) = &self.on_disk_text {
            return Some(self.resolved(
                KernelSourceKind::OnDiskText,
                image.kernel_name(),
                ResolvedKernelImage::TextFile(image.path()),
            ));
        }

        self.in_process_symbol.as_ref().map(|symbol| {
            self.resolved(
                KernelSourceKind::InProcessSymbol,
                symbol.kernel_name(),
                ResolvedKernelImage::Symbol(symbol.symbol()),
            )
        })
    }

    fn resolved<'r>(
        &self,
        kind: KernelSourceKind,
        kernel_name: &'r str,
        image: ResolvedKernelImage<'r>,
    ) -> ResolvedKernel<'r> {
        ResolvedKernel {
            kernel_name,
            kind,
            arity: self.arity,
            image,
        }
    }
}

impl Debug for MultiKernelLoaderSpec<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiKernelLoaderSpec")
            .field("arity", &self.arity)
            .field("custom_decompressor", &self.decompressor.is_some())
            .field("in_process_symbol", &self.in_process_symbol)
            .field("on_disk_text", &self.on_disk_text)
            .field("on_disk_binary", &self.on_disk_binary)
            .field("in_memory_binary", &self.in_memory_binary)
            .field("in_memory_text", &self.in_memory_text)
            .finish()
    }
}

fn claim_slot<T>(slot: &Option<T>, kind: KernelSourceKind, kernel_name: &str) {
    if slot.is_some() {
        error!(
            "event=slot_reassign module=registry status=error kind={} kernel={}",
            kind, kernel_name
        );
        panic!("loader spec slot `{kind}` is already populated (kernel `{kernel_name}`)");
    }
}

fn log_added(kind: KernelSourceKind, kernel_name: &str) {
    debug!(
        "event=spec_add module=registry status=ok kind={} kernel={}",
        kind, kernel_name
    );
}
