use bytes::Bytes;

use super::error::EditError;
use crate::bencode::Value;

/// A parsed path expression into a bencoded tree.
///
/// A selector is a sequence of steps obtained by splitting the expression
/// on runs of whitespace. Against a dictionary a step is the literal key;
/// against a list it is `first`, `last`, or a decimal index. The empty
/// expression is the null selector and names the root.
///
/// # Examples
///
/// ```
/// use btkit::bencode::decode;
/// use btkit::edit::Selector;
///
/// let tree = decode(b"d4:infod4:name4:demoee").unwrap();
/// let selected = Selector::parse("info name").select(&tree).unwrap();
/// assert_eq!(selected.as_str(), Some("demo"));
/// ```
#[derive(Debug, Clone)]
pub struct Selector {
    steps: Vec<String>,
}

enum ListStep {
    First,
    Last,
    Index(i64),
}

impl Selector {
    /// Splits an expression into steps. Never fails; an all-whitespace or
    /// empty expression yields the null selector.
    pub fn parse(expr: &str) -> Self {
        Self {
            steps: expr.split_whitespace().map(String::from).collect(),
        }
    }

    /// True iff this selector has no steps and names the root.
    pub fn is_null(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolves the selector against `root`, failing on the first step that
    /// misses.
    pub fn select<'a>(&self, root: &'a Value) -> Result<&'a Value, EditError> {
        let mut current = root;
        for (i, step) in self.steps.iter().enumerate() {
            current = descend(current, step, i + 1)?;
        }
        Ok(current)
    }

    /// Attaches `new_value` at the selector's final step.
    ///
    /// On a dictionary the key is created or replaced. On a list, `first`
    /// and `last` assign the respective end (appending to an empty list); a
    /// decimal index must already be in range. Anything else is a failure,
    /// as is a miss on any intermediate step or a null selector.
    pub fn set(&self, root: &mut Value, new_value: Value) -> Result<(), EditError> {
        let (last, init) = self.steps.split_last().ok_or(EditError::NullSelector)?;
        let step = init.len() + 1;
        let parent = descend_many_mut(root, init)?;

        match parent {
            Value::Dict(dict) => {
                dict.insert(Bytes::copy_from_slice(last.as_bytes()), new_value);
                Ok(())
            }
            Value::List(items) => match parse_list_step(last) {
                None => Err(EditError::NotAListIndex {
                    step,
                    token: last.clone(),
                }),
                Some(ListStep::First) => {
                    if items.is_empty() {
                        items.push(new_value);
                    } else {
                        items[0] = new_value;
                    }
                    Ok(())
                }
                Some(ListStep::Last) => {
                    if let Some(slot) = items.last_mut() {
                        *slot = new_value;
                    } else {
                        items.push(new_value);
                    }
                    Ok(())
                }
                Some(ListStep::Index(index)) => {
                    if index >= 0 && (index as usize) < items.len() {
                        items[index as usize] = new_value;
                        Ok(())
                    } else {
                        Err(EditError::IndexOutOfRange {
                            step,
                            index,
                            len: items.len(),
                        })
                    }
                }
            },
            scalar => Err(EditError::NotAContainer {
                step,
                kind: scalar.kind(),
            }),
        }
    }

    /// Removes the entry at the selector's final step from its container.
    pub fn delete(&self, root: &mut Value) -> Result<(), EditError> {
        let (last, init) = self.steps.split_last().ok_or(EditError::NullSelector)?;
        let step = init.len() + 1;
        let parent = descend_many_mut(root, init)?;

        match parent {
            Value::Dict(dict) => dict
                .remove(last.as_bytes())
                .map(drop)
                .ok_or_else(|| EditError::KeyNotFound {
                    step,
                    key: last.clone(),
                }),
            Value::List(items) => {
                let index = resolve_list_step(last, items.len(), step)?;
                items.remove(index);
                Ok(())
            }
            scalar => Err(EditError::NotAContainer {
                step,
                kind: scalar.kind(),
            }),
        }
    }
}

fn descend<'a>(value: &'a Value, step: &str, number: usize) -> Result<&'a Value, EditError> {
    match value {
        Value::Dict(dict) => dict
            .get(step.as_bytes())
            .ok_or_else(|| EditError::KeyNotFound {
                step: number,
                key: step.to_string(),
            }),
        Value::List(items) => {
            let index = resolve_list_step(step, items.len(), number)?;
            Ok(&items[index])
        }
        scalar => Err(EditError::NotAContainer {
            step: number,
            kind: scalar.kind(),
        }),
    }
}

fn descend_many_mut<'a>(root: &'a mut Value, steps: &[String]) -> Result<&'a mut Value, EditError> {
    let mut current = root;
    for (i, step) in steps.iter().enumerate() {
        current = descend_mut(current, step, i + 1)?;
    }
    Ok(current)
}

fn descend_mut<'a>(value: &'a mut Value, step: &str, number: usize) -> Result<&'a mut Value, EditError> {
    match value {
        Value::Dict(dict) => dict
            .get_mut(step.as_bytes())
            .ok_or_else(|| EditError::KeyNotFound {
                step: number,
                key: step.to_string(),
            }),
        Value::List(items) => {
            let index = resolve_list_step(step, items.len(), number)?;
            Ok(&mut items[index])
        }
        scalar => Err(EditError::NotAContainer {
            step: number,
            kind: scalar.kind(),
        }),
    }
}

/// Resolves a list step to an in-range index, treating negative and
/// out-of-range indices (and `first`/`last` on an empty list) as misses.
fn resolve_list_step(step: &str, len: usize, number: usize) -> Result<usize, EditError> {
    let out_of_range = |index| EditError::IndexOutOfRange {
        step: number,
        index,
        len,
    };

    match parse_list_step(step) {
        None => Err(EditError::NotAListIndex {
            step: number,
            token: step.to_string(),
        }),
        Some(ListStep::First) => {
            if len > 0 {
                Ok(0)
            } else {
                Err(out_of_range(0))
            }
        }
        Some(ListStep::Last) => len.checked_sub(1).ok_or_else(|| out_of_range(-1)),
        Some(ListStep::Index(index)) => {
            if index >= 0 && (index as usize) < len {
                Ok(index as usize)
            } else {
                Err(out_of_range(index))
            }
        }
    }
}

fn parse_list_step(step: &str) -> Option<ListStep> {
    match step {
        "first" => Some(ListStep::First),
        "last" => Some(ListStep::Last),
        _ => {
            let digits = step.strip_prefix(['+', '-']).unwrap_or(step);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // A huge index cannot be in range anyway; saturate instead of
            // failing the parse.
            let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
            let index = if step.starts_with('-') {
                magnitude.saturating_neg()
            } else {
                magnitude
            };
            Some(ListStep::Index(index))
        }
    }
}
