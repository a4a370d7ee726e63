//! Bounded sequences as unions of fixed-arity tuples.
//!
//! `minItems: 1, maxItems: 3` over `T` is `[T] | [T, T] | [T, T, T]`, never
//! `[T, T?, T?]`: optional slots would accept `undefined` in place of a
//! present element.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleShape<T> {
    /// One fixed-arity arm per achievable length, shortest first.
    pub arms: Vec<Vec<T>>,
    /// Rest type appended to the longest arm.
    pub spread: Option<T>,
}

/// Shape of a tuple with positional `elements`, bounds, an explicit rest
/// type, and the configured `top` type for positions nothing describes.
pub fn tuple_shape<T: Clone>(
    elements: &[T],
    min_items: usize,
    max_items: Option<usize>,
    spread: Option<T>,
    top: T,
) -> TupleShape<T> {
    let mut elements = elements.to_vec();
    let mut rest = spread.clone();

    if min_items > elements.len() && spread.is_none() && max_items.is_none() {
        rest = Some(top.clone());
    }
    if let Some(max) = max_items {
        if max > elements.len() && spread.is_none() {
            elements.resize(max, top);
        }
    }

    if elements.len() > min_items {
        let arms = (min_items..=elements.len())
            .map(|len| elements[..len].to_vec())
            .collect();
        return TupleShape { arms, spread: rest };
    }
    TupleShape { arms: vec![elements], spread: rest }
}

impl TupleShape<String> {
    pub fn render(&self) -> String {
        let last = self.arms.len().saturating_sub(1);
        let arms: Vec<String> = self
            .arms
            .iter()
            .enumerate()
            .map(|(i, arm)| {
                let mut parts = arm.clone();
                if i == last {
                    if let Some(rest) = &self.spread {
                        parts.push(format!("...({rest})[]"));
                    }
                }
                format!("[{}]", parts.join(", "))
            })
            .collect();
        match arms.as_slice() {
            [single] => single.clone(),
            _ => format!("({})", arms.join(" | ")),
        }
    }
}
