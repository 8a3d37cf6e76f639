use std::fmt;

use ecow::EcoString;

use crate::{
    error::{AplError, AplResult},
    value::Value,
    Apl,
};

/// A host-provided opaque object reachable through `pkg→name`
///
/// Keys use the user-visible convention: the first rune of a key is
/// upper-cased on access, method names are lower-cased.
pub trait PackageValue: fmt::Debug {
    /// The display name
    fn name(&self) -> &str;
    /// Field names, if the object is record-like
    fn keys(&self) -> Option<Vec<EcoString>> {
        None
    }
    /// Read a field
    fn at(&self, key: &str) -> Option<Value> {
        let _ = key;
        None
    }
    /// Write a field
    fn set(&self, key: &str, v: Value) -> AplResult<()> {
        let _ = v;
        Err(AplError::domain(format!(
            "{}: cannot set field {key}",
            self.name()
        )))
    }
    /// Method names
    fn methods(&self) -> Vec<EcoString> {
        Vec::new()
    }
    /// Invoke the object as a function
    fn call(&self, apl: &mut Apl, l: Option<Value>, r: Value) -> AplResult<Value> {
        let _ = (apl, l, r);
        Err(AplError::domain(format!("{} is not callable", self.name())))
    }
}

/// Fold the first rune of a key with the given function
pub fn fold_first_rune(s: &str, f: impl Fn(char) -> char) -> EcoString {
    let mut out = EcoString::new();
    for (i, c) in s.chars().enumerate() {
        if i == 0 {
            out.push(f(c));
        } else {
            out.push(c);
        }
    }
    out
}

/// The user-visible form of a field key
pub fn upper_key(s: &str) -> EcoString {
    fold_first_rune(s, |c| c.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rune_folding() {
        assert_eq!(upper_key("inc"), "Inc");
        assert_eq!(upper_key("V"), "V");
        assert_eq!(upper_key(""), "");
    }
}
