use crate::types::Value;

/// Outcome of invoking a named callable member on a host object.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The member was called and produced a value.
    Value(Value),
    /// The member was called and returned nothing.
    Void,
    /// No callable member with that name and argument shape exists.
    NoSuchMethod,
}

/// The object-model boundary the wrapper layer delegates to.
///
/// A wrapped value of arbitrary shape implements this to expose its named
/// members to the wrapper: member reads fall back to [`get_member`], writes
/// go through [`set_member`], calls through [`invoke_member`], and indexed
/// access through [`index_get`]/[`index_set`]. Every capability defaults to
/// "not supported"; implementors override the ones their object carries.
///
/// How members are resolved behind this trait (reflection, a field table,
/// generated code) is the implementor's business; the wrapper only relies
/// on the contract that a missing member reports itself as missing rather
/// than failing.
///
/// [`get_member`]: HostObject::get_member
/// [`set_member`]: HostObject::set_member
/// [`invoke_member`]: HostObject::invoke_member
/// [`index_get`]: HostObject::index_get
/// [`index_set`]: HostObject::index_set
pub trait HostObject {
    fn type_name(&self) -> &'static str {
        "object"
    }

    /// Names of the readable members, in no particular order.
    fn member_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Reads a named member. `None` means the member does not exist.
    fn get_member(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Writes a named member. Returns `false` if no such writable member
    /// exists; the wrapper turns that into a binding error.
    fn set_member(&self, _name: &str, _value: Value) -> bool {
        false
    }

    /// Invokes a named callable member with positional arguments.
    fn invoke_member(&self, _name: &str, _args: &[Value]) -> CallOutcome {
        CallOutcome::NoSuchMethod
    }

    /// Reads by index/key. `None` means no matching indexer.
    fn index_get(&self, _key: &Value) -> Option<Value> {
        None
    }

    /// Writes by index/key. Returns `false` if unsupported.
    fn index_set(&self, _key: &Value, _value: Value) -> bool {
        false
    }
}
