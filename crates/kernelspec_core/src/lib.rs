//! Kernel loader spec registry.
//! Records where a named kernel's code lives and hands the right image to
//! a device loading layer; nothing here launches or loads kernels.

pub mod capability;
pub mod decompress;
pub mod function_library;
pub mod logging;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod spec;

pub use capability::{CapabilityParseError, ComputeCapability};
pub use decompress::{
    split_length_prefixed, DecompressionCache, FramingError, TextDecompressor,
    UnsupportedDecompressor,
};
pub use function_library::{
    assign_ids_to_custom_aggregator_ops, custom_aggregator_ids, FnFunctionLibrary,
    FunctionLibrary, UuidFunctionLibrary, AGGREGATOR_ID_ATTR, CUSTOM_AGGREGATOR_OP,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::exported_model::{ExportedModel, FunctionDef, GraphDef, NodeDef};
pub use registry::MultiKernelLoaderSpec;
pub use resolve::{KernelImageLoader, ResolvedKernel, ResolvedKernelImage};
pub use spec::{
    InMemoryBinaryBlob, InMemoryMultiVersionText, InProcessSymbol, KernelLoaderSpec, KernelSource,
    KernelSourceKind, KernelText, OnDiskBinaryImage, OnDiskTextImage, SymbolAddress, TextSpec,
};

/// Minimal health-check API for host integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
