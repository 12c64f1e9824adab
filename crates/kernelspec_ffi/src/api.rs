//! FFI API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose core health, logging and the function-library hook to Dart via FRB.
//! - Translate JSON model payloads at the boundary.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported in response envelopes, never thrown.

use kernelspec_core::{
    assign_ids_to_custom_aggregator_ops, core_version as core_version_inner,
    custom_aggregator_ids, init_logging as init_logging_inner, ping as ping_inner, ExportedModel,
    FunctionLibrary, UuidFunctionLibrary,
};
use log::warn;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes the core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory; empty falls back to `KERNELSPEC_LOG_DIR`.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Response envelope for aggregator id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignIdsResponse {
    /// Whether the model was decoded and processed.
    pub ok: bool,
    /// Updated model as JSON; empty on failure.
    pub model_json: String,
    /// Assigned ids in node order (graph first, then function bodies).
    pub aggregator_ids: Vec<String>,
    /// Human-readable diagnostics.
    pub message: String,
}

impl AssignIdsResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            model_json: String::new(),
            aggregator_ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// Assigns fresh ids to every `CustomAggregator` op of a JSON-encoded model.
///
/// # FFI contract
/// - Sync call, CPU only.
/// - Never panics; malformed JSON yields `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn assign_custom_aggregator_ids(model_json: String) -> AssignIdsResponse {
    assign_ids_with(&UuidFunctionLibrary, model_json.as_str())
}

fn assign_ids_with(library: &dyn FunctionLibrary, model_json: &str) -> AssignIdsResponse {
    let model: ExportedModel = match serde_json::from_str(model_json) {
        Ok(model) => model,
        Err(err) => {
            warn!(
                "event=assign_ids module=ffi status=error error_code=invalid_model_json error={}",
                err
            );
            return AssignIdsResponse::failure(format!(
                "assign_custom_aggregator_ids failed: invalid model JSON: {err}"
            ));
        }
    };

    let updated = assign_ids_to_custom_aggregator_ops(library, &model);
    let aggregator_ids = custom_aggregator_ids(&updated)
        .into_iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    match serde_json::to_string(&updated) {
        Ok(model_json) => AssignIdsResponse {
            ok: true,
            message: format!("Assigned {} aggregator id(s).", aggregator_ids.len()),
            model_json,
            aggregator_ids,
        },
        Err(err) => AssignIdsResponse::failure(format!(
            "assign_custom_aggregator_ids failed: cannot encode model: {err}"
        )),
    }
}
