use super::{Falsy, Inner};
use crate::truth::FalsyClass;
use crate::types::{Shape, Value};
use std::cell::OnceCell;

thread_local! {
    // One sentinel per thread: the value model is Rc-based and
    // single-threaded, so per-thread is process-wide in practice. The
    // cell is initialized before first use and never written again.
    static UNDEFINED: Falsy = Falsy::from_inner(Inner {
        value: Value::Null,
        shape: Shape::Undefined,
        predicate: |_| true,
        is_false: OnceCell::from(true),
        class: OnceCell::from(FalsyClass::NullLike),
    });
}

impl Falsy {
    /// The "no such member" sentinel.
    ///
    /// Falsy, null-equivalent, never NaN-class, iterates zero times, and
    /// unwraps to null. Every absent-member lookup hands out the same
    /// instance, so identity comparisons behave predictably.
    pub fn undefined() -> Falsy {
        UNDEFINED.with(Falsy::clone)
    }

    pub fn is_undefined(&self) -> bool {
        self.inner.shape == Shape::Undefined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::Falsify;

    #[test]
    fn there_is_exactly_one_sentinel() {
        let a = Falsy::undefined();
        let b = Falsy::undefined();
        assert!(a.ptr_eq(&b));

        // absent-member lookups return that same instance
        let missing = Value::map(vec![]).falsify().get("nothing").unwrap();
        assert!(missing.ptr_eq(&a));
    }

    #[test]
    fn sentinel_is_falsy_and_null_like() {
        let undefined = Falsy::undefined();
        assert!(undefined.is_false());
        assert!(!undefined.truthy());
        assert!(undefined.is_falsy_null());
        assert!(!undefined.is_falsy_equivalent());
        assert!(!undefined.is_falsy_nan());
    }

    #[test]
    fn sentinel_unwraps_to_null() {
        assert!(Falsy::undefined().as_value().is_null());
    }

    #[test]
    fn sentinel_iterates_zero_times() {
        let mut iter = Falsy::undefined().iter().unwrap();
        assert!(iter.next().is_none());
    }
}
