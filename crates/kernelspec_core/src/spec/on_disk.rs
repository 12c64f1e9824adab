//! On-disk image descriptors.
//!
//! Filenames are passed through untouched; reading the file belongs to the
//! device loading layer.

use super::KernelLoaderSpec;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
struct OnDiskImage {
    header: KernelLoaderSpec,
    filename: String,
}

impl OnDiskImage {
    fn new(filename: impl Into<String>, kernel_name: impl Into<String>) -> Self {
        Self {
            header: KernelLoaderSpec::new(kernel_name),
            filename: filename.into(),
        }
    }
}

/// Text image (e.g. PTX) stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnDiskTextImage(OnDiskImage);

impl OnDiskTextImage {
    pub fn new(filename: impl Into<String>, kernel_name: impl Into<String>) -> Self {
        Self(OnDiskImage::new(filename, kernel_name))
    }

    pub fn filename(&self) -> &str {
        &self.0.filename
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0.filename)
    }

    pub fn kernel_name(&self) -> &str {
        self.0.header.kernel_name()
    }

    pub(crate) fn header(&self) -> &KernelLoaderSpec {
        &self.0.header
    }
}

/// Binary image (e.g. cubin) stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnDiskBinaryImage(OnDiskImage);

impl OnDiskBinaryImage {
    pub fn new(filename: impl Into<String>, kernel_name: impl Into<String>) -> Self {
        Self(OnDiskImage::new(filename, kernel_name))
    }

    pub fn filename(&self) -> &str {
        &self.0.filename
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0.filename)
    }

    pub fn kernel_name(&self) -> &str {
        self.0.header.kernel_name()
    }

    pub(crate) fn header(&self) -> &KernelLoaderSpec {
        &self.0.header
    }
}
