use crate::error::FalsyError;
use crate::types::{Shape, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

// Built-in members of the string, sequence and map shapes: the native
// member surface the wrapper resolves against when the wrapped value has
// no say of its own. Host objects bring their own members instead.

pub(crate) struct PropertyDef {
    pub(crate) name: &'static str,
    pub(crate) read: fn(&Value) -> Value,
}

pub(crate) struct MethodDef {
    pub(crate) name: &'static str,
    pub(crate) arity: usize,
    // Ok(None) is a void return
    pub(crate) invoke: fn(&Value, &[Value]) -> Result<Option<Value>, FalsyError>,
}

struct ShapeMembers {
    properties: FxHashMap<&'static str, &'static PropertyDef>,
    methods: FxHashMap<&'static str, &'static MethodDef>,
}

thread_local! {
    // Lookup index per shape, built on first use of that shape and only
    // read afterwards.
    static MEMBER_CACHE: RefCell<FxHashMap<Shape, Rc<ShapeMembers>>> =
        RefCell::new(FxHashMap::default());
}

fn members_for(shape: Shape) -> Rc<ShapeMembers> {
    MEMBER_CACHE.with(|cache| {
        if let Some(members) = cache.borrow().get(&shape) {
            return members.clone();
        }
        let built = Rc::new(build_members(shape));
        cache.borrow_mut().insert(shape, built.clone());
        built
    })
}

fn build_members(shape: Shape) -> ShapeMembers {
    let (properties, methods): (&[PropertyDef], &[MethodDef]) = match shape {
        Shape::Str => (STR_PROPERTIES, STR_METHODS),
        Shape::Seq => (SEQ_PROPERTIES, SEQ_METHODS),
        Shape::Map => (MAP_PROPERTIES, MAP_METHODS),
        _ => (&[], &[]),
    };
    ShapeMembers {
        properties: properties.iter().map(|p| (p.name, p)).collect(),
        methods: methods.iter().map(|m| (m.name, m)).collect(),
    }
}

pub(crate) fn lookup_property(shape: Shape, name: &str) -> Option<&'static PropertyDef> {
    members_for(shape).properties.get(name).copied()
}

pub(crate) fn invoke(
    shape: Shape,
    value: &Value,
    name: &str,
    args: &[Value],
) -> Result<Option<Value>, FalsyError> {
    let members = members_for(shape);
    match members.methods.get(name) {
        Some(method) if method.arity == args.len() => (method.invoke)(value, args),
        _ => Err(no_overload(value, name, args)),
    }
}

fn no_overload(value: &Value, method: &str, args: &[Value]) -> FalsyError {
    FalsyError::NoOverload {
        type_name: value.type_name(),
        method: method.to_string(),
        args: args.len(),
    }
}

fn str_arg<'a>(value: &Value, method: &str, args: &'a [Value], at: usize) -> Result<&'a str, FalsyError> {
    args[at].as_str().ok_or_else(|| no_overload(value, method, args))
}

// ---- string ----

static STR_PROPERTIES: &[PropertyDef] = &[PropertyDef {
    name: "len",
    read: |v| match v {
        Value::Str(s) => Value::Int(s.chars().count() as i64),
        _ => unreachable!(),
    },
}];

static STR_METHODS: &[MethodDef] = &[
    MethodDef {
        name: "upper",
        arity: 0,
        invoke: |v, _| match v {
            Value::Str(s) => Ok(Some(Value::Str(s.to_uppercase()))),
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "lower",
        arity: 0,
        invoke: |v, _| match v {
            Value::Str(s) => Ok(Some(Value::Str(s.to_lowercase()))),
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "trim",
        arity: 0,
        invoke: |v, _| match v {
            Value::Str(s) => Ok(Some(Value::Str(s.trim().to_string()))),
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "contains",
        arity: 1,
        invoke: |v, args| match v {
            Value::Str(s) => {
                let needle = str_arg(v, "contains", args, 0)?;
                Ok(Some(Value::Bool(s.contains(needle))))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "starts_with",
        arity: 1,
        invoke: |v, args| match v {
            Value::Str(s) => {
                let prefix = str_arg(v, "starts_with", args, 0)?;
                Ok(Some(Value::Bool(s.starts_with(prefix))))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "ends_with",
        arity: 1,
        invoke: |v, args| match v {
            Value::Str(s) => {
                let suffix = str_arg(v, "ends_with", args, 0)?;
                Ok(Some(Value::Bool(s.ends_with(suffix))))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "split",
        arity: 1,
        invoke: |v, args| match v {
            Value::Str(s) => {
                let separator = str_arg(v, "split", args, 0)?;
                let parts = s
                    .split(separator)
                    .map(|part| Value::Str(part.to_string()))
                    .collect();
                Ok(Some(Value::seq(parts)))
            }
            _ => unreachable!(),
        },
    },
];

// ---- sequence ----

static SEQ_PROPERTIES: &[PropertyDef] = &[PropertyDef {
    name: "len",
    read: |v| match v {
        Value::Seq(items) => Value::Int(items.borrow().len() as i64),
        _ => unreachable!(),
    },
}];

static SEQ_METHODS: &[MethodDef] = &[
    MethodDef {
        name: "contains",
        arity: 1,
        invoke: |v, args| match v {
            Value::Seq(items) => {
                let found = items.borrow().iter().any(|item| *item == args[0]);
                Ok(Some(Value::Bool(found)))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "first",
        arity: 0,
        invoke: |v, _| match v {
            Value::Seq(items) => Ok(Some(items.borrow().first().cloned().unwrap_or(Value::Null))),
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "last",
        arity: 0,
        invoke: |v, _| match v {
            Value::Seq(items) => Ok(Some(items.borrow().last().cloned().unwrap_or(Value::Null))),
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "push",
        arity: 1,
        invoke: |v, args| match v {
            Value::Seq(items) => {
                items.borrow_mut().push(args[0].clone());
                Ok(None)
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "clear",
        arity: 0,
        invoke: |v, _| match v {
            Value::Seq(items) => {
                items.borrow_mut().clear();
                Ok(None)
            }
            _ => unreachable!(),
        },
    },
];

// ---- map ----

static MAP_PROPERTIES: &[PropertyDef] = &[PropertyDef {
    name: "len",
    read: |v| match v {
        Value::Map(entries) => Value::Int(entries.borrow().len() as i64),
        _ => unreachable!(),
    },
}];

static MAP_METHODS: &[MethodDef] = &[
    MethodDef {
        name: "contains_key",
        arity: 1,
        invoke: |v, args| match v {
            Value::Map(entries) => {
                let key = str_arg(v, "contains_key", args, 0)?;
                Ok(Some(Value::Bool(entries.borrow().contains_key(key))))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "insert",
        arity: 2,
        invoke: |v, args| match v {
            Value::Map(entries) => {
                let key = str_arg(v, "insert", args, 0)?;
                entries.borrow_mut().insert(key.to_string(), args[1].clone());
                Ok(None)
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "remove",
        arity: 1,
        invoke: |v, args| match v {
            Value::Map(entries) => {
                let key = str_arg(v, "remove", args, 0)?;
                // absent key removes nothing and reads back as undefined
                Ok(Some(
                    entries.borrow_mut().shift_remove(key).unwrap_or(Value::Null),
                ))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "keys",
        arity: 0,
        invoke: |v, _| match v {
            Value::Map(entries) => {
                let keys = entries
                    .borrow()
                    .keys()
                    .map(|key| Value::Str(key.clone()))
                    .collect();
                Ok(Some(Value::seq(keys)))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "values",
        arity: 0,
        invoke: |v, _| match v {
            Value::Map(entries) => {
                Ok(Some(Value::seq(entries.borrow().values().cloned().collect())))
            }
            _ => unreachable!(),
        },
    },
    MethodDef {
        name: "clear",
        arity: 0,
        invoke: |v, _| match v {
            Value::Map(entries) => {
                entries.borrow_mut().clear();
                Ok(None)
            }
            _ => unreachable!(),
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_per_shape() {
        assert!(lookup_property(Shape::Str, "len").is_some());
        assert!(lookup_property(Shape::Seq, "len").is_some());
        assert!(lookup_property(Shape::Map, "len").is_some());
        assert!(lookup_property(Shape::Int, "len").is_none());
        assert!(lookup_property(Shape::Str, "unheard_of").is_none());
    }

    #[test]
    fn string_methods() {
        let s = Value::from("  Mixed Case  ");
        let trimmed = invoke(Shape::Str, &s, "trim", &[]).unwrap().unwrap();
        assert_eq!(trimmed.as_str(), Some("Mixed Case"));

        let s = Value::from("prefix-body-suffix");
        let hit = invoke(Shape::Str, &s, "contains", &[Value::from("body")])
            .unwrap()
            .unwrap();
        assert_eq!(hit, Value::Bool(true));

        let parts = invoke(Shape::Str, &s, "split", &[Value::from("-")])
            .unwrap()
            .unwrap();
        let Value::Seq(parts) = parts else {
            panic!("split should build a sequence")
        };
        assert_eq!(parts.borrow().len(), 3);
    }

    #[test]
    fn arity_mismatch_is_no_overload() {
        let s = Value::from("x");
        let err = invoke(Shape::Str, &s, "upper", &[Value::from(1)]).unwrap_err();
        assert_eq!(
            err,
            FalsyError::NoOverload {
                type_name: "string",
                method: "upper".to_string(),
                args: 1
            }
        );
    }

    #[test]
    fn argument_shape_mismatch_is_no_overload() {
        let s = Value::from("x");
        let err = invoke(Shape::Str, &s, "contains", &[Value::from(7)]).unwrap_err();
        assert!(matches!(err, FalsyError::NoOverload { .. }));
    }

    #[test]
    fn unknown_method_is_no_overload() {
        let err = invoke(Shape::Seq, &Value::seq(vec![]), "mystery", &[]).unwrap_err();
        assert!(matches!(err, FalsyError::NoOverload { .. }));
    }

    #[test]
    fn void_methods_return_none() {
        let seq = Value::seq(vec![]);
        let result = invoke(Shape::Seq, &seq, "push", &[Value::from(1)]).unwrap();
        assert!(result.is_none());
        let Value::Seq(items) = &seq else { unreachable!() };
        assert_eq!(items.borrow().len(), 1);
    }

    #[test]
    fn map_remove_returns_the_removed_value() {
        let map = Value::map(vec![("k".to_string(), Value::from(3))]);
        let removed = invoke(Shape::Map, &map, "remove", &[Value::from("k")])
            .unwrap()
            .unwrap();
        assert_eq!(removed, Value::Int(3));

        // removing an absent key yields null, which wraps as undefined
        let removed = invoke(Shape::Map, &map, "remove", &[Value::from("k")])
            .unwrap()
            .unwrap();
        assert!(removed.is_null());
    }
}
