// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition types, statuses and reasons for `NamespaceLabel` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. Each condition type appears at most once in
//! `status.conditions`; a later observation of the same type replaces the earlier one.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   appliedLabels:
//!     env: test
//!     team: dev
//!   conditions:
//!     - type: LabelsApplied
//!       status: "True"
//!       reason: Success
//!       message: "Namespace labels have been successfully updated"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// More than one `NamespaceLabel` exists in the namespace; nothing was applied.
pub const CONDITION_TYPE_CONFLICT: &str = "NamespaceLabelsConflict";

/// Computing or applying the label delta failed.
pub const CONDITION_TYPE_UPDATE_FAILED: &str = "UpdateLabelsFailed";

/// The namespace labels match the desired spec.
pub const CONDITION_TYPE_LABELS_APPLIED: &str = "LabelsApplied";

// ============================================================================
// Condition Statuses
// ============================================================================

pub const STATUS_TRUE: &str = "True";
pub const STATUS_FALSE: &str = "False";

// ============================================================================
// Condition Reasons
// ============================================================================

/// Single-owner check failed.
pub const REASON_CONFLICT: &str = "Conflict";

/// Diff or namespace update failed.
pub const REASON_UPDATE_ERROR: &str = "UpdateError";

/// Labels applied.
pub const REASON_SUCCESS: &str = "Success";

/// The desired spec names a protected management label.
///
/// Used as the metric label for policy rejections; the status condition keeps
/// `UpdateError` so clients keyed on the condition reason see one value.
pub const REASON_PROTECTED_LABEL: &str = "ProtectedLabel";

/// A write lost an optimistic-concurrency race and will be retried.
pub const REASON_WRITE_CONFLICT: &str = "WriteConflict";

// ============================================================================
// Condition Messages
// ============================================================================

/// Message attached to a successful `LabelsApplied` condition.
pub const MESSAGE_LABELS_APPLIED: &str = "Namespace labels have been successfully updated";

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
