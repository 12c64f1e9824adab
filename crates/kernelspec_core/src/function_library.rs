//! Host-overridable function library.
//!
//! # Responsibility
//! - Declare the hook a host runtime overrides (`FunctionLibrary`).
//! - Invoke it polymorphically without knowing the implementation.
//! - Ship a native default that tags aggregator ops with fresh UUIDs.
//!
//! # Invariants
//! - Implementations are pure: input model in, new model out, no state.
//! - The input model is never mutated.

use crate::model::exported_model::ExportedModel;
use log::info;
use uuid::Uuid;

/// Op name of calibration statistics collectors.
pub const CUSTOM_AGGREGATOR_OP: &str = "CustomAggregator";
/// Attribute holding the aggregator identity.
pub const AGGREGATOR_ID_ATTR: &str = "id";

/// Functions a host-side library provides to native code.
pub trait FunctionLibrary: Send + Sync {
    /// Returns a copy of `exported_model` where every `CustomAggregator` op,
    /// in the graph and in every function body, carries a unique `id`.
    fn assign_ids_to_custom_aggregator_ops(&self, exported_model: &ExportedModel)
        -> ExportedModel;
}

/// Native implementation backed by random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidFunctionLibrary;

impl FunctionLibrary for UuidFunctionLibrary {
    fn assign_ids_to_custom_aggregator_ops(
        &self,
        exported_model: &ExportedModel,
    ) -> ExportedModel {
        let mut model = exported_model.clone();
        for node in model
            .nodes_mut()
            .filter(|node| node.op == CUSTOM_AGGREGATOR_OP)
        {
            node.attrs.insert(
                AGGREGATOR_ID_ATTR.to_string(),
                Uuid::new_v4().to_string(),
            );
        }
        model
    }
}

/// Adapts a host callback into a [`FunctionLibrary`].
pub struct FnFunctionLibrary<F>(F);

impl<F> FnFunctionLibrary<F>
where
    F: Fn(&ExportedModel) -> ExportedModel + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> FunctionLibrary for FnFunctionLibrary<F>
where
    F: Fn(&ExportedModel) -> ExportedModel + Send + Sync,
{
    fn assign_ids_to_custom_aggregator_ops(
        &self,
        exported_model: &ExportedModel,
    ) -> ExportedModel {
        (self.0)(exported_model)
    }
}

/// Calls `library` and logs the aggregator count it returned.
pub fn assign_ids_to_custom_aggregator_ops(
    library: &dyn FunctionLibrary,
    exported_model: &ExportedModel,
) -> ExportedModel {
    let model = library.assign_ids_to_custom_aggregator_ops(exported_model);
    let aggregators = custom_aggregator_ids(&model).len();
    info!(
        "event=assign_ids module=function_library status=ok aggregators={}",
        aggregators
    );
    model
}

/// `id` attributes of all `CustomAggregator` ops, in node order.
///
/// Aggregators without an id are reported as empty strings.
pub fn custom_aggregator_ids(model: &ExportedModel) -> Vec<&str> {
    model
        .nodes()
        .filter(|node| node.op == CUSTOM_AGGREGATOR_OP)
        .map(|node| node.attr(AGGREGATOR_ID_ATTR).unwrap_or_default())
        .collect()
}
