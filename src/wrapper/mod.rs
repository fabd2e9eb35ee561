use crate::error::FalsyError;
use crate::truth::{self, FalsyClass};
use crate::types::{Shape, Value};
use num_bigint::BigInt;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

mod undefined;
mod equality;
mod iter;
pub use iter::FalsyIter;
mod members;
mod ops;

/// A truthiness-aware wrapper around a [`Value`].
///
/// Wrapping does not copy or alter the value; the wrapper holds it for its
/// lifetime and routes every interaction — member access, indexing,
/// invocation, iteration, conversion, operators, equality — through the
/// falsy rules. Values obtained through a wrapper are themselves wrapped,
/// so access chains stay uniformly falsy-aware; a missing member reads as
/// the undefined sentinel instead of failing.
///
/// Cloning a `Falsy` is cheap and shares the underlying instance, which is
/// observable: truthy-selection and sentinel lookups hand back the same
/// instance, not an equal copy.
#[derive(Clone)]
pub struct Falsy {
    inner: Rc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) value: Value,
    pub(crate) shape: Shape,
    // falsiness dispatch entry, resolved once at wrap time
    predicate: fn(&Value) -> bool,
    is_false: OnceCell<bool>,
    class: OnceCell<FalsyClass>,
}

/// The wrap operation.
///
/// Blanket-implemented for everything convertible into [`Value`], and as
/// the identity for [`Falsy`] itself, so wrapping is idempotent: an
/// already-wrapped value passes through unchanged.
pub trait Falsify {
    fn falsify(self) -> Falsy;
}

impl<T: Into<Value>> Falsify for T {
    fn falsify(self) -> Falsy {
        Falsy::wrap(self.into())
    }
}

impl Falsify for Falsy {
    fn falsify(self) -> Falsy {
        self
    }
}

impl Falsify for &Falsy {
    fn falsify(self) -> Falsy {
        self.clone()
    }
}

impl Falsy {
    /// Wraps a value. Null wraps to the undefined sentinel rather than
    /// allocating anything.
    pub fn wrap(value: Value) -> Falsy {
        if value.is_null() {
            return Falsy::undefined();
        }
        let shape = value.shape();
        Falsy {
            inner: Rc::new(Inner {
                value,
                shape,
                predicate: truth::predicate_for(shape),
                is_false: OnceCell::new(),
                class: OnceCell::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Inner) -> Falsy {
        Falsy {
            inner: Rc::new(inner),
        }
    }

    pub fn shape(&self) -> Shape {
        self.inner.shape
    }

    pub fn type_name(&self) -> &'static str {
        if self.is_undefined() {
            "undefined"
        } else {
            self.inner.value.type_name()
        }
    }

    /// True when `self` and `other` are the same wrapper instance.
    pub fn ptr_eq(&self, other: &Falsy) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The cached falsiness verdict. Computed once per wrapper through
    /// the predicate resolved at wrap time, never re-derived and never
    /// delegated to the wrapped value's own notion of truth.
    pub fn is_false(&self) -> bool {
        *self
            .inner
            .is_false
            .get_or_init(|| (self.inner.predicate)(&self.inner.value))
    }

    pub fn truthy(&self) -> bool {
        !self.is_false()
    }

    /// Boolean conversion: the truthiness verdict.
    pub fn to_bool(&self) -> bool {
        self.truthy()
    }

    pub(crate) fn class(&self) -> FalsyClass {
        *self
            .inner
            .class
            .get_or_init(|| truth::classify(&self.inner.value))
    }

    pub fn is_falsy_equivalent(&self) -> bool {
        self.class() == FalsyClass::FalsyEquivalent
    }

    pub fn is_falsy_null(&self) -> bool {
        self.class() == FalsyClass::NullLike
    }

    pub fn is_falsy_nan(&self) -> bool {
        self.class() == FalsyClass::Nan
    }

    /// The wrapped value. The sentinel unwraps to null.
    pub fn as_value(&self) -> &Value {
        &self.inner.value
    }

    /// Clones the wrapped value out of the wrapper, e.g. to pass it as a
    /// call argument.
    pub fn to_value(&self) -> Value {
        self.inner.value.clone()
    }

    /// Member read.
    ///
    /// Map entries shadow every other member of the same name; host
    /// objects resolve through their own member table; built-in members
    /// of the string/sequence/map shapes come last. A missing member
    /// yields the undefined sentinel — but reading a member *of* the
    /// sentinel is a binding error, so a chain of lookups fails exactly
    /// one level past the first missing member.
    pub fn get(&self, name: &str) -> Result<Falsy, FalsyError> {
        if self.is_undefined() {
            return Err(FalsyError::UndefinedAccess {
                member: name.to_string(),
            });
        }

        if let Value::Map(entries) = &self.inner.value
            && let Some(value) = entries.borrow().get(name)
        {
            // a stored null entry reads as undefined
            return Ok(Falsy::wrap(value.clone()));
        }

        if let Value::Object(object) = &self.inner.value {
            return Ok(match object.get_member(name) {
                Some(value) => Falsy::wrap(value),
                None => Falsy::undefined(),
            });
        }

        match members::lookup_property(self.inner.shape, name) {
            Some(property) => Ok(Falsy::wrap((property.read)(&self.inner.value))),
            None => Ok(Falsy::undefined()),
        }
    }

    /// Member write. Map-shaped values take the entry unconditionally
    /// (creating it if absent); host objects decide for themselves;
    /// everything else has no writable members.
    pub fn set(&self, name: &str, value: Value) -> Result<(), FalsyError> {
        if self.is_undefined() {
            return Err(FalsyError::UndefinedAccess {
                member: name.to_string(),
            });
        }

        match &self.inner.value {
            Value::Map(entries) => {
                entries.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Object(object) => {
                if object.set_member(name, value) {
                    Ok(())
                } else {
                    Err(FalsyError::NoSuchMember {
                        type_name: self.type_name(),
                        member: name.to_string(),
                    })
                }
            }
            _ => Err(FalsyError::NoSuchMember {
                type_name: self.type_name(),
                member: name.to_string(),
            }),
        }
    }

    /// Invokes a named callable member with positional arguments.
    ///
    /// A void result yields the undefined sentinel, never null; a value
    /// result is re-wrapped. Calls on a map go to the map itself — entries
    /// do not shadow callables.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Falsy, FalsyError> {
        if self.is_undefined() {
            return Err(FalsyError::UndefinedAccess {
                member: name.to_string(),
            });
        }

        if let Value::Object(object) = &self.inner.value {
            use crate::object::CallOutcome;
            return match object.invoke_member(name, args) {
                CallOutcome::Value(value) => Ok(Falsy::wrap(value)),
                CallOutcome::Void => Ok(Falsy::undefined()),
                CallOutcome::NoSuchMethod => Err(FalsyError::NoOverload {
                    type_name: self.type_name(),
                    method: name.to_string(),
                    args: args.len(),
                }),
            };
        }

        match members::invoke(self.inner.shape, &self.inner.value, name, args)? {
            Some(value) => Ok(Falsy::wrap(value)),
            None => Ok(Falsy::undefined()),
        }
    }

    /// Indexed read, delegating to the wrapped value's native indexer.
    /// Shapes without an indexer read as undefined.
    pub fn index(&self, key: &Value) -> Result<Falsy, FalsyError> {
        if self.is_undefined() {
            return Err(FalsyError::NoIndexer {
                type_name: "undefined",
            });
        }

        match &self.inner.value {
            Value::Seq(items) => {
                let items = items.borrow();
                let index = Self::seq_index(key, items.len())?;
                Ok(Falsy::wrap(items[index].clone()))
            }
            Value::Str(s) => {
                let index = Self::seq_index(key, s.chars().count())?;
                match s.chars().nth(index) {
                    Some(ch) => Ok(Falsy::wrap(Value::Str(ch.to_string()))),
                    None => unreachable!(),
                }
            }
            Value::Map(entries) => {
                let key = Self::map_key(key)?;
                match entries.borrow().get(key) {
                    Some(value) => Ok(Falsy::wrap(value.clone())),
                    None => Err(FalsyError::KeyNotFound {
                        key: key.to_string(),
                    }),
                }
            }
            Value::Object(object) => Ok(match object.index_get(key) {
                Some(value) => Falsy::wrap(value),
                None => Falsy::undefined(),
            }),
            _ => Ok(Falsy::undefined()),
        }
    }

    /// Indexed write. Strings are immutable; scalar shapes and the
    /// sentinel have no indexer at all.
    pub fn index_set(&self, key: &Value, value: Value) -> Result<(), FalsyError> {
        if self.is_undefined() {
            return Err(FalsyError::NoIndexer {
                type_name: "undefined",
            });
        }

        match &self.inner.value {
            Value::Seq(items) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                let index = Self::seq_index(key, len)?;
                items[index] = value;
                Ok(())
            }
            Value::Map(entries) => {
                let key = Self::map_key(key)?;
                entries.borrow_mut().insert(key.to_string(), value);
                Ok(())
            }
            Value::Object(object) => {
                if object.index_set(key, value) {
                    Ok(())
                } else {
                    Err(FalsyError::NoIndexer {
                        type_name: self.type_name(),
                    })
                }
            }
            _ => Err(FalsyError::NoIndexer {
                type_name: self.type_name(),
            }),
        }
    }

    fn seq_index(key: &Value, len: usize) -> Result<usize, FalsyError> {
        let index = key.as_int().ok_or(FalsyError::Conversion {
            expected: "integer index",
            found: key.type_name(),
        })?;
        if index < 0 || index as usize >= len {
            return Err(FalsyError::IndexOutOfBounds { index, len });
        }
        Ok(index as usize)
    }

    fn map_key(key: &Value) -> Result<&str, FalsyError> {
        key.as_str().ok_or(FalsyError::Conversion {
            expected: "string key",
            found: key.type_name(),
        })
    }

    /// Forced conversion back to text; the round trip returns the exact
    /// wrapped string.
    pub fn try_str(&self) -> Result<&str, FalsyError> {
        self.inner.value.as_str().ok_or(FalsyError::Conversion {
            expected: "string",
            found: self.type_name(),
        })
    }

    pub fn try_int(&self) -> Result<i64, FalsyError> {
        self.inner.value.as_int().ok_or(FalsyError::Conversion {
            expected: "int",
            found: self.type_name(),
        })
    }

    pub fn try_float(&self) -> Result<f64, FalsyError> {
        self.inner.value.as_float().ok_or(FalsyError::Conversion {
            expected: "float",
            found: self.type_name(),
        })
    }

    pub fn try_bigint(&self) -> Result<&BigInt, FalsyError> {
        match &self.inner.value {
            Value::BigInt(n) => Ok(n),
            _ => Err(FalsyError::Conversion {
                expected: "bigint",
                found: self.type_name(),
            }),
        }
    }
}

impl fmt::Display for Falsy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "undefined")
        } else {
            write!(f, "{}", self.inner.value)
        }
    }
}

impl fmt::Debug for Falsy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "Falsy(undefined)")
        } else {
            write!(f, "Falsy({} == {})", self.inner.value, self.truthy())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CallOutcome, HostObject};
    use std::cell::RefCell;

    // A plain host object with one field, one void method and one
    // value-returning method, in the spirit of a reflective record.
    struct Toggle {
        toggled: RefCell<bool>,
        label: RefCell<String>,
    }

    impl Toggle {
        fn new() -> Rc<Toggle> {
            Rc::new(Toggle {
                toggled: RefCell::new(false),
                label: RefCell::new("off".to_string()),
            })
        }
    }

    impl HostObject for Toggle {
        fn type_name(&self) -> &'static str {
            "toggle"
        }

        fn member_names(&self) -> Vec<String> {
            vec!["toggled".to_string(), "label".to_string()]
        }

        fn get_member(&self, name: &str) -> Option<Value> {
            match name {
                "toggled" => Some(Value::Bool(*self.toggled.borrow())),
                "label" => Some(Value::Str(self.label.borrow().clone())),
                _ => None,
            }
        }

        fn set_member(&self, name: &str, value: Value) -> bool {
            match (name, value) {
                ("label", Value::Str(s)) => {
                    *self.label.borrow_mut() = s;
                    true
                }
                _ => false,
            }
        }

        fn invoke_member(&self, name: &str, args: &[Value]) -> CallOutcome {
            match (name, args) {
                ("run", []) => {
                    let flipped = !*self.toggled.borrow();
                    *self.toggled.borrow_mut() = flipped;
                    CallOutcome::Void
                }
                ("echo", [message]) => CallOutcome::Value(message.clone()),
                _ => CallOutcome::NoSuchMethod,
            }
        }
    }

    #[test]
    fn wrapping_null_yields_the_sentinel() {
        let wrapped = Value::Null.falsify();
        assert!(wrapped.is_undefined());
        assert!(wrapped.ptr_eq(&Falsy::undefined()));
        assert!(None::<i64>.falsify().is_undefined());
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = 5.falsify();
        let twice = once.clone().falsify();
        assert!(once.ptr_eq(&twice));
    }

    #[test]
    fn missing_member_reads_as_undefined() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle).falsify();

        let missing = wrapped.get("missing").unwrap();
        assert!(missing.is_undefined());
        assert!(missing.is_false());
        assert!(missing == Value::Null);
    }

    #[test]
    fn member_of_undefined_is_a_binding_error() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle).falsify();

        let missing = wrapped.get("missing").unwrap();
        let err = missing.get("missing").unwrap_err();
        assert_eq!(
            err,
            FalsyError::UndefinedAccess {
                member: "missing".to_string()
            }
        );
    }

    #[test]
    fn member_reads_are_rewrapped() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle).falsify();

        let label = wrapped.get("label").unwrap();
        assert!(label.truthy());
        assert_eq!(label.try_str().unwrap(), "off");

        // false field wraps falsy
        let toggled = wrapped.get("toggled").unwrap();
        assert!(toggled.is_false());
    }

    #[test]
    fn member_writes_forward_to_the_object() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle.clone()).falsify();

        wrapped.set("label", Value::from("on")).unwrap();
        assert_eq!(*toggle.label.borrow(), "on");

        let err = wrapped.set("toggled", Value::from(true)).unwrap_err();
        assert_eq!(
            err,
            FalsyError::NoSuchMember {
                type_name: "toggle",
                member: "toggled".to_string()
            }
        );
    }

    #[test]
    fn void_calls_yield_undefined() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle.clone()).falsify();

        let result = wrapped.call("run", &[]).unwrap();
        assert!(result.is_undefined());
        assert!(*toggle.toggled.borrow());
    }

    #[test]
    fn call_results_are_rewrapped() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle).falsify();

        let echoed = wrapped.call("echo", &[Value::from("hi")]).unwrap();
        assert_eq!(echoed.try_str().unwrap(), "hi");

        let err = wrapped.call("absent", &[]).unwrap_err();
        assert_eq!(
            err,
            FalsyError::NoOverload {
                type_name: "toggle",
                method: "absent".to_string(),
                args: 0
            }
        );
    }

    #[test]
    fn wrapped_values_are_valid_arguments() {
        let toggle = Toggle::new();
        let wrapped = Value::object(toggle).falsify();

        let arg = "carried through".falsify();
        let echoed = wrapped.call("echo", &[arg.to_value()]).unwrap();
        assert_eq!(echoed.try_str().unwrap(), "carried through");
    }

    #[test]
    fn builtin_members_resolve_per_shape() {
        let s = "enumerable".falsify();
        assert_eq!(s.get("len").unwrap().try_int().unwrap(), 10);
        assert_eq!(s.call("upper", &[]).unwrap().try_str().unwrap(), "ENUMERABLE");

        let seq = vec![Value::from(1), Value::from(2)].falsify();
        assert_eq!(seq.get("len").unwrap().try_int().unwrap(), 2);
    }

    #[test]
    fn map_entries_are_accessible_as_members() {
        let map = Value::map(vec![("test".to_string(), Value::from(5))]).falsify();
        assert_eq!(map.get("test").unwrap().try_int().unwrap(), 5);
    }

    #[test]
    fn map_entries_shadow_builtin_members() {
        let map = Value::map(vec![("len".to_string(), Value::from(5))]).falsify();
        // the entry named "len" hides the map's own length member
        assert_eq!(map.get("len").unwrap().try_int().unwrap(), 5);

        let plain = Value::map(vec![("test".to_string(), Value::from(5))]).falsify();
        assert_eq!(plain.get("len").unwrap().try_int().unwrap(), 1);
    }

    #[test]
    fn stored_null_entry_reads_as_undefined() {
        let map = Value::map(vec![("gone".to_string(), Value::Null)]).falsify();
        let entry = map.get("gone").unwrap();
        assert!(entry.is_undefined());
    }

    #[test]
    fn map_member_writes_always_take_the_entry() {
        let map = Value::map(vec![]).falsify();
        map.set("test", Value::from(5)).unwrap();
        map.set("test2", Value::from("10")).unwrap();

        assert_eq!(map.get("test").unwrap().try_int().unwrap(), 5);
        assert_eq!(map.get("test2").unwrap().try_str().unwrap(), "10");
        // even a name colliding with a built-in member becomes an entry
        map.set("len", Value::from(99)).unwrap();
        assert_eq!(map.get("len").unwrap().try_int().unwrap(), 99);
    }

    #[test]
    fn map_methods_are_callable() {
        let map = Value::map(vec![("count".to_string(), Value::from(5))]).falsify();
        let result = map.call("clear", &[]).unwrap();
        assert!(result.is_undefined());
        assert_eq!(map.get("len").unwrap().try_int().unwrap(), 0);
    }

    #[test]
    fn indexed_access() {
        let map = Value::map(vec![("test".to_string(), Value::from(5))]).falsify();
        assert_eq!(map.index(&Value::from("test")).unwrap().try_int().unwrap(), 5);
        map.index_set(&Value::from("other"), Value::from(7)).unwrap();
        assert_eq!(map.get("other").unwrap().try_int().unwrap(), 7);

        let missing = map.index(&Value::from("nope")).unwrap_err();
        assert_eq!(
            missing,
            FalsyError::KeyNotFound {
                key: "nope".to_string()
            }
        );

        let seq = vec![Value::from(10), Value::from(20)].falsify();
        assert_eq!(seq.index(&Value::from(1)).unwrap().try_int().unwrap(), 20);
        seq.index_set(&Value::from(0), Value::from(11)).unwrap();
        assert_eq!(seq.index(&Value::from(0)).unwrap().try_int().unwrap(), 11);
        assert_eq!(
            seq.index(&Value::from(9)).unwrap_err(),
            FalsyError::IndexOutOfBounds { index: 9, len: 2 }
        );

        let s = "abc".falsify();
        assert_eq!(s.index(&Value::from(1)).unwrap().try_str().unwrap(), "b");
        assert!(s.index_set(&Value::from(1), Value::from("z")).is_err());

        // scalars have no indexer: reads are undefined, writes fail
        let n = 5.falsify();
        assert!(n.index(&Value::from(0)).unwrap().is_undefined());
        assert!(n.index_set(&Value::from(0), Value::Null).is_err());
    }

    #[test]
    fn round_trip_returns_the_wrapped_value() {
        let s = "Test".falsify();
        assert_eq!(s.try_str().unwrap(), "Test");

        let n = 5.falsify();
        assert_eq!(n.try_int().unwrap(), 5);

        let zero = 0.falsify();
        assert_eq!(zero.try_int().unwrap(), 0);

        let f = 2.5.falsify();
        assert_eq!(f.try_float().unwrap(), 2.5);

        // conversion to the wrong type is an error
        assert_eq!(
            s.try_int().unwrap_err(),
            FalsyError::Conversion {
                expected: "int",
                found: "string"
            }
        );
    }

    #[test]
    fn boolean_conversion_is_truthiness() {
        assert!(!0.falsify().to_bool());
        assert!("0".falsify().to_bool());
        assert!(!"".falsify().to_bool());
        assert!(!Falsy::undefined().to_bool());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(format!("{}", Falsy::undefined()), "undefined");
        assert_eq!(format!("{}", 5.falsify()), "5");
        assert_eq!(format!("{:?}", 5.falsify()), "Falsy(5 == true)");
        assert_eq!(format!("{:?}", 0.falsify()), "Falsy(0 == false)");
        assert_eq!(format!("{:?}", Falsy::undefined()), "Falsy(undefined)");
    }
}
