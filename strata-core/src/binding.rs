use crate::{Error, Result, Value};
use std::{fmt::Display, str::FromStr};

/// Clause a bound value belongs to, in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Select,
    From,
    Join,
    Where,
    Having,
    Order,
    Union,
}

impl Bucket {
    pub const ALL: [Bucket; 7] = [
        Bucket::Select,
        Bucket::From,
        Bucket::Join,
        Bucket::Where,
        Bucket::Having,
        Bucket::Order,
        Bucket::Union,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Select => "select",
            Bucket::From => "from",
            Bucket::Join => "join",
            Bucket::Where => "where",
            Bucket::Having => "having",
            Bucket::Order => "order",
            Bucket::Union => "union",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Bucket::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::msg(format!("Unknown binding bucket `{s}`")))
    }
}

/// Values bound to the `?` placeholders of one statement, collected per clause.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Binding {
    buckets: [Vec<Value>; 7],
}

impl Binding {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_binding(&mut self, bucket: Bucket, value: impl Into<Value>) {
        self.buckets[bucket.index()].push(value.into());
    }

    /// Like [`Binding::add_binding`], unknown bucket names are ignored.
    pub fn add_named(&mut self, bucket: &str, value: impl Into<Value>) {
        if let Ok(bucket) = bucket.parse::<Bucket>() {
            self.add_binding(bucket, value);
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Value] {
        &self.buckets[bucket.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Every value flattened, buckets in declaration order.
    pub fn bindings(&self) -> Vec<Value> {
        self.flatten(Vec::new(), &Bucket::ALL)
    }

    /// The set values first, then everything bound after the `set` clause.
    pub fn prepare_update_binding(&self, values: Vec<Value>) -> Vec<Value> {
        self.flatten(
            values,
            &[
                Bucket::From,
                Bucket::Where,
                Bucket::Having,
                Bucket::Order,
                Bucket::Union,
            ],
        )
    }

    pub fn prepare_delete_binding(&self) -> Vec<Value> {
        self.flatten(Vec::new(), &[Bucket::Where])
    }

    /// The flattened values of a single bucket.
    pub fn bucket_bindings(&self, bucket: Bucket) -> Vec<Value> {
        self.flatten(Vec::new(), &[bucket])
    }

    /// Appends every value of `other` to the `bucket` of self.
    pub fn merge_into(&mut self, bucket: Bucket, other: &Binding) {
        let values = other.bindings();
        self.buckets[bucket.index()].extend(values);
    }

    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
    }

    fn flatten(&self, mut result: Vec<Value>, buckets: &[Bucket]) -> Vec<Value> {
        for bucket in buckets {
            for value in &self.buckets[bucket.index()] {
                match value {
                    Value::List(items) => {
                        for item in items {
                            if item.is_bindable() {
                                result.push(item.clone());
                            } else {
                                log::warn!(
                                    "Dropping a {} nested in a {} binding, it can't be bound",
                                    item.type_name(),
                                    bucket
                                );
                            }
                        }
                    }
                    Value::Map(..) => {
                        log::warn!("Dropping a map from the {} binding, it can't be bound", bucket)
                    }
                    v if v.is_null() => {
                        log::warn!("Dropping a null from the {} binding", bucket)
                    }
                    v => result.push(v.clone()),
                }
            }
        }
        result
    }
}
