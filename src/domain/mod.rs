pub mod errors;
pub mod order;
pub mod page;
pub mod ports;
pub mod product;
pub mod shipping;
pub mod status;
pub mod validation;

/// Overwrites `slot` only when an update value is present.
pub(crate) fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
