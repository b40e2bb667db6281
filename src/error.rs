use thiserror::Error;

/// Non-fatal failures surfaced by picker construction and interaction.
///
/// None of these abort the host: construction errors drop the one instance,
/// interaction errors leave the picker state untouched.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum PickerError {
    #[error("{kind} input \"{id}\" not found")]
    MissingElement { kind: &'static str, id: String },

    #[error("{kind} element must have an id (label: {label})")]
    MissingIdentifier { kind: &'static str, label: String },

    #[error("picker for \"{0}\" is already registered")]
    DuplicatePicker(String),

    #[error("Please select a \"From Date\" first!")]
    InvalidRangeSelection,
}
