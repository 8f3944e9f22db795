use thiserror::Error;

use crate::classify::Rejection;

/// A mutation the observed tree does not allow.
///
/// Raised before anything is committed or reported: the tree is left as it
/// was and no [`ChangeRecord`](crate::ChangeRecord) is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("setting prototype disallowed")]
    SettingPrototype,
    #[error("defining property disallowed")]
    DefiningProperty,
    #[error("setting {0} disallowed")]
    SettingValue(Rejection),
    /// A sequence's `length` was set to something other than a whole number
    /// in range, or deleted.
    #[error("invalid array length")]
    InvalidArrayLength,
    /// The root handed to [`observe_tree`](crate::observe_tree) was refused.
    #[error("observing {0} disallowed")]
    ObservingValue(Rejection),
    #[error("observing a leaf value disallowed")]
    ObservingLeaf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::WrappedKind;

    #[test]
    fn messages_name_the_disallowed_action() {
        assert_eq!(
            PolicyViolation::SettingPrototype.to_string(),
            "setting prototype disallowed"
        );
        assert_eq!(
            PolicyViolation::DefiningProperty.to_string(),
            "defining property disallowed"
        );
        assert_eq!(
            PolicyViolation::SettingValue(Rejection::Undefined).to_string(),
            "setting undefined disallowed"
        );
        assert_eq!(
            PolicyViolation::SettingValue(Rejection::Wrapped(WrappedKind::Number)).to_string(),
            "setting wrapped number disallowed"
        );
        assert_eq!(
            PolicyViolation::SettingValue(Rejection::ObjectOfClass("Map".into())).to_string(),
            "setting object of class Map disallowed"
        );
        assert_eq!(
            PolicyViolation::InvalidArrayLength.to_string(),
            "invalid array length"
        );
    }
}
