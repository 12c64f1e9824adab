//! Host-language bindings for the loader-spec core.

pub mod api;
