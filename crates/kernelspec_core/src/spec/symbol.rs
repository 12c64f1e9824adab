//! In-process symbol descriptor.

use super::KernelLoaderSpec;
use std::ffi::c_void;

/// Opaque address of kernel code already linked into the process.
///
/// Stored as an integer: the core never dereferences it, it only hands it
/// back to the device layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolAddress(usize);

impl SymbolAddress {
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    pub const fn from_raw(addr: usize) -> Self {
        Self(addr)
    }

    pub fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }

    pub fn addr(self) -> usize {
        self.0
    }
}

/// Kernel code available as a symbol in the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InProcessSymbol {
    header: KernelLoaderSpec,
    symbol: SymbolAddress,
}

impl InProcessSymbol {
    pub fn new(symbol: SymbolAddress, kernel_name: impl Into<String>) -> Self {
        Self {
            header: KernelLoaderSpec::new(kernel_name),
            symbol,
        }
    }

    pub fn symbol(&self) -> SymbolAddress {
        self.symbol
    }

    pub fn kernel_name(&self) -> &str {
        self.header.kernel_name()
    }

    pub(crate) fn header(&self) -> &KernelLoaderSpec {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::{InProcessSymbol, SymbolAddress};

    #[test]
    fn symbol_address_round_trips_pointer() {
        let value = 42u32;
        let address = SymbolAddress::from_ptr(&value as *const u32);
        assert_eq!(address.as_ptr() as *const u32, &value as *const u32);

        let spec = InProcessSymbol::new(address, "add_one");
        assert_eq!(spec.symbol(), address);
        assert_eq!(spec.kernel_name(), "add_one");
    }
}
