use super::Falsy;
use crate::truth;
use crate::types::Value;
use std::hash::{Hash, Hasher};

// The equality relation, in the order the checks must run:
//
//   1. against a literal bool        -> the falsy-equivalence rule
//   2. against another wrapper       -> class against class
//   3. Null-like  == Null-like only  (never a falsy-equivalent value)
//   4. Falsy-Equivalent values are all mutually equal: false == 0 == ""
//   5. NaN        == nothing, other NaNs included
//   6. otherwise  -> the wrapped value's own equality
//
// Falsy-Equivalent and Null-like are both falsy yet unequal across the
// class line, so this is deliberately not a transitive equivalence over
// all falsy values. Do not merge the classes.
impl Falsy {
    /// Equality against a literal boolean.
    ///
    /// `true` matches anything outside the Falsy-Equivalent class and
    /// `false` matches anything inside it. Truthiness alone would put
    /// NaN and null wrappers equal to `false`, which rules 3 and 5
    /// forbid.
    pub(crate) fn bool_eq(&self, other: bool) -> bool {
        let falsy_equivalent = self.is_falsy_equivalent();
        if other { !falsy_equivalent } else { falsy_equivalent }
    }

    /// Equality against another wrapper, class against class.
    ///
    /// The final two steps are the legacy rule: once both operands have
    /// escaped the three falsy classes, only their boolean values are
    /// compared — so any two truthy wrappers are equal regardless of
    /// their wrapped values.
    pub(crate) fn wrapper_eq(&self, other: &Falsy) -> bool {
        if self.is_falsy_null() {
            return other.is_falsy_null();
        }
        if self.is_falsy_equivalent() {
            return other.is_falsy_equivalent();
        }
        if self.is_falsy_nan() {
            return false;
        }
        if self.is_false() == other.truthy() {
            return false;
        }
        !other.is_falsy_null() && !other.is_falsy_nan()
    }

    /// Equality against a raw, unwrapped value.
    pub(crate) fn value_eq(&self, other: &Value) -> bool {
        match other {
            Value::Null => self.is_falsy_null(),
            Value::Bool(b) => self.bool_eq(*b),
            _ => {
                if self.is_falsy_null() {
                    // null and undefined equal nothing but themselves,
                    // and `other` is neither
                    return false;
                }
                if self.is_falsy_equivalent() {
                    return truth::falsy_equivalent(other);
                }
                if self.is_falsy_nan() || truth::falsy_nan(other) {
                    return false;
                }
                self.native_eq(other)
            }
        }
    }

    // Same-shape operands fall back to the wrapped type's own equality;
    // across shapes only falsy-equivalence could have matched, and it
    // was ruled out above.
    fn native_eq(&self, other: &Value) -> bool {
        if self.inner.value.shape() == other.shape() {
            return self.inner.value == *other;
        }
        if truth::falsy_equivalent(other) {
            return self.is_false();
        }
        false
    }
}

impl PartialEq for Falsy {
    fn eq(&self, other: &Falsy) -> bool {
        self.wrapper_eq(other)
    }
}

// NaN-class wrappers are unequal to themselves, the same contract bend
// the wrapped semantics demand everywhere else; keeping `Eq` is what
// makes wrappers usable as map and set keys.
impl Eq for Falsy {}

impl PartialEq<bool> for Falsy {
    fn eq(&self, other: &bool) -> bool {
        self.bool_eq(*other)
    }
}

impl PartialEq<Falsy> for bool {
    fn eq(&self, other: &Falsy) -> bool {
        other.bool_eq(*self)
    }
}

impl PartialEq<Value> for Falsy {
    fn eq(&self, other: &Value) -> bool {
        self.value_eq(other)
    }
}

impl PartialEq<Falsy> for Value {
    fn eq(&self, other: &Falsy) -> bool {
        other.value_eq(self)
    }
}

impl PartialEq<i64> for Falsy {
    fn eq(&self, other: &i64) -> bool {
        self.value_eq(&Value::Int(*other))
    }
}

impl PartialEq<Falsy> for i64 {
    fn eq(&self, other: &Falsy) -> bool {
        other.value_eq(&Value::Int(*self))
    }
}

impl PartialEq<f64> for Falsy {
    fn eq(&self, other: &f64) -> bool {
        self.value_eq(&Value::Float(*other))
    }
}

impl PartialEq<Falsy> for f64 {
    fn eq(&self, other: &Falsy) -> bool {
        other.value_eq(&Value::Float(*self))
    }
}

impl PartialEq<&str> for Falsy {
    fn eq(&self, other: &&str) -> bool {
        self.value_eq(&Value::Str((*other).to_string()))
    }
}

impl PartialEq<Falsy> for &str {
    fn eq(&self, other: &Falsy) -> bool {
        other.value_eq(&Value::Str((*self).to_string()))
    }
}

// All wrappers intentionally collide: the equality relation maps many
// distinct values onto one another, so a single fixed hash is the only
// hash consistent with it.
impl Hash for Falsy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(1);
    }
}
