use super::Falsy;
use crate::error::FalsyError;
use crate::types::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Lazy iterator over a wrapped sequence-like value.
///
/// Each yielded element is wrapped on the way out; nothing is buffered, so
/// the iteration cost is one wrapper per element actually consumed.
/// Restartable by asking the wrapper for a fresh iterator.
pub struct FalsyIter {
    state: IterState,
}

enum IterState {
    Empty,
    Seq {
        items: Rc<RefCell<Vec<Value>>>,
        index: usize,
    },
    Str {
        text: String,
        // byte offset of the next character
        pos: usize,
    },
    Map {
        entries: Rc<RefCell<IndexMap<String, Value>>>,
        index: usize,
    },
}

impl Falsy {
    /// Iterates the wrapped value: sequence elements in order, string
    /// characters as one-character strings, map entries as `[key, value]`
    /// pairs in insertion order. The undefined sentinel iterates zero
    /// times. Scalar shapes are not iterable.
    pub fn iter(&self) -> Result<FalsyIter, FalsyError> {
        if self.is_undefined() {
            return Ok(FalsyIter {
                state: IterState::Empty,
            });
        }

        let state = match &self.inner.value {
            Value::Seq(items) => IterState::Seq {
                items: items.clone(),
                index: 0,
            },
            Value::Str(s) => IterState::Str {
                text: s.clone(),
                pos: 0,
            },
            Value::Map(entries) => IterState::Map {
                entries: entries.clone(),
                index: 0,
            },
            _ => {
                return Err(FalsyError::NotIterable {
                    type_name: self.type_name(),
                });
            }
        };
        Ok(FalsyIter { state })
    }
}

impl Iterator for FalsyIter {
    type Item = Falsy;

    fn next(&mut self) -> Option<Falsy> {
        match &mut self.state {
            IterState::Empty => None,
            IterState::Seq { items, index } => {
                // borrow per step so the source stays usable between steps
                let value = items.borrow().get(*index).cloned()?;
                *index += 1;
                Some(Falsy::wrap(value))
            }
            IterState::Str { text, pos } => {
                let ch = text[*pos..].chars().next()?;
                *pos += ch.len_utf8();
                Some(Falsy::wrap(Value::Str(ch.to_string())))
            }
            IterState::Map { entries, index } => {
                let pair = entries
                    .borrow()
                    .get_index(*index)
                    .map(|(key, value)| (key.clone(), value.clone()))?;
                *index += 1;
                Some(Falsy::wrap(Value::seq(vec![
                    Value::Str(pair.0),
                    pair.1,
                ])))
            }
        }
    }
}
