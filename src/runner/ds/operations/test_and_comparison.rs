use futures::future::{join, join_all, LocalBoxFuture};
use futures::FutureExt;

use crate::runner::ds::operations::type_conversion::number_is_not_a_number;
use crate::runner::ds::value::Value;

/// Strict equality (`===`): scalars by value with NaN unequal to itself,
/// everything else by identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    a == b
}

/// SameValueZero: like `strict_equals` but NaN equals NaN. Used for mapping
/// keys and set members.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    if number_is_not_a_number(a) && number_is_not_a_number(b) {
        return true;
    }
    strict_equals(a, b)
}

/// Outcome of a structural comparison. Only blob payload comparison can leave
/// a result pending.
pub enum Equality {
    Settled(bool),
    Pending(LocalBoxFuture<'static, bool>),
}

impl Equality {
    pub fn is_pending(&self) -> bool {
        match self {
            Equality::Pending(_) => true,
            Equality::Settled(_) => false,
        }
    }

    pub fn settled(&self) -> Option<bool> {
        match self {
            Equality::Settled(result) => Some(*result),
            Equality::Pending(_) => None,
        }
    }

    pub async fn resolve(self) -> bool {
        match self {
            Equality::Settled(result) => result,
            Equality::Pending(future) => future.await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EqualsOptions {
    /// Record keys to compare, `None` compares all of them.
    pub properties: Option<Vec<String>>,
    /// Levels to descend, negative means unlimited. Values nested deeper are
    /// assumed to be equal without looking at them.
    pub depth: i64,
    /// A record key starting with one of these ends the comparison of that
    /// record's remaining keys.
    pub exception_prefixes: Vec<String>,
    pub ignore_functions: bool,
    /// Compares blob payloads. Makes the result pending when blobs are met.
    pub compare_blobs: bool,
}

impl Default for EqualsOptions {
    fn default() -> Self {
        EqualsOptions {
            properties: None,
            depth: -1,
            exception_prefixes: vec![],
            ignore_functions: true,
            compare_blobs: false,
        }
    }
}

/// Deep comparison with default options.
pub fn equals(a: &Value, b: &Value) -> bool {
    match equals_with(a, b, &EqualsOptions::default()) {
        Equality::Settled(result) => result,
        Equality::Pending(future) => futures::executor::block_on(future),
    }
}

pub fn equals_with(a: &Value, b: &Value, options: &EqualsOptions) -> Equality {
    compare(a, b, options, options.depth)
}

fn leaf_equal(a: &Value, b: &Value, options: &EqualsOptions) -> bool {
    if strict_equals(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Function(_), Value::Function(_)) => options.ignore_functions,
        (Value::Number(_), Value::Number(_)) => {
            number_is_not_a_number(a) && number_is_not_a_number(b)
        }
        (Value::Pattern(x), Value::Pattern(y)) => x.borrow().to_string() == y.borrow().to_string(),
        (Value::Temporal(x), Value::Temporal(y)) => x.borrow().get_time() == y.borrow().get_time(),
        _ => false,
    }
}

/// Folds a nested result into the pending list. Returns `false` when the
/// nested comparison already failed.
fn collect(result: Equality, pending: &mut Vec<LocalBoxFuture<'static, bool>>) -> bool {
    match result {
        Equality::Settled(result) => result,
        Equality::Pending(future) => {
            pending.push(future);
            true
        }
    }
}

fn compare(a: &Value, b: &Value, options: &EqualsOptions, depth: i64) -> Equality {
    if leaf_equal(a, b, options) {
        return Equality::Settled(true);
    }
    if options.compare_blobs {
        if let (Value::Blob(x), Value::Blob(y)) = (a, b) {
            let reads = join(x.read_as_data_url(), y.read_as_data_url());
            return Equality::Pending(async move {
                let (first, second) = reads.await;
                first == second
            }
            .boxed_local());
        }
    }
    let mut pending = vec![];
    match (a, b) {
        (Value::Sequence(x), Value::Sequence(y)) => {
            let (left, right) = (x.borrow().clone(), y.borrow().clone());
            if left.len() != right.len() {
                return Equality::Settled(false);
            }
            for (first, second) in [(&left, &right), (&right, &left)].iter() {
                for (index, value) in first.iter().enumerate() {
                    if depth != 0
                        && !collect(compare(value, &second[index], options, depth - 1), &mut pending)
                    {
                        return Equality::Settled(false);
                    }
                }
            }
        }
        (Value::Mapping(x), Value::Mapping(y)) => {
            if x.borrow().len() != y.borrow().len() {
                return Equality::Settled(false);
            }
            let (left, right) = (x.borrow().entries(), y.borrow().entries());
            for (first, second) in [(&left, y), (&right, x)].iter() {
                for (key, value) in first.iter() {
                    if depth == 0 {
                        continue;
                    }
                    let counterpart = match second.borrow().get(key) {
                        Some(counterpart) => counterpart.clone(),
                        None => return Equality::Settled(false),
                    };
                    if !collect(compare(value, &counterpart, options, depth - 1), &mut pending) {
                        return Equality::Settled(false);
                    }
                }
            }
        }
        (Value::Set(x), Value::Set(y)) => {
            let (left, right) = (x.borrow().values(), y.borrow().values());
            if left.len() != right.len() {
                return Equality::Settled(false);
            }
            for (first, second) in [(&left, &right), (&right, &left)].iter() {
                for value in first.iter() {
                    if depth == 0 {
                        continue;
                    }
                    let mut equal = false;
                    let mut candidates = vec![];
                    for other in second.iter() {
                        match compare(value, other, options, depth - 1) {
                            Equality::Settled(true) => {
                                equal = true;
                                break;
                            }
                            Equality::Settled(false) => {}
                            Equality::Pending(future) => candidates.push(future),
                        }
                    }
                    if equal {
                        continue;
                    }
                    if candidates.is_empty() {
                        return Equality::Settled(false);
                    }
                    pending.push(
                        async move { join_all(candidates).await.into_iter().any(|r| r) }
                            .boxed_local(),
                    );
                }
            }
        }
        (Value::Record(x), Value::Record(y)) => {
            let (left, right) = (x.borrow().entries(), y.borrow().entries());
            for (first, second) in [(&left, y), (&right, x)].iter() {
                for (key, value) in first.iter() {
                    if let Some(properties) = &options.properties {
                        if !properties.contains(key) {
                            continue;
                        }
                    }
                    if options
                        .exception_prefixes
                        .iter()
                        .any(|prefix| key.starts_with(prefix.as_str()))
                    {
                        break;
                    }
                    if depth == 0 {
                        continue;
                    }
                    let counterpart = second.borrow().get(key).cloned().unwrap_or(Value::Undefined);
                    if !collect(compare(value, &counterpart, options, depth - 1), &mut pending) {
                        return Equality::Settled(false);
                    }
                }
            }
        }
        _ => return Equality::Settled(false),
    }
    if pending.is_empty() {
        Equality::Settled(true)
    } else {
        Equality::Pending(async move { join_all(pending).await.into_iter().all(|r| r) }.boxed_local())
    }
}
