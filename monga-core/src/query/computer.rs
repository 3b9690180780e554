//! Field computations for the `$group` and `$project` pipeline stages.

use bson::{Bson, Document};

use crate::input::{Compile, Input};

/// Prefixes string field references with `$`, leaving literals untouched.
pub fn prepare_field(field: Bson) -> Bson {
    match field {
        Bson::String(name) => Bson::String(format!("${}", name.trim_start_matches('$'))),
        other => other,
    }
}

/// Accumulator helpers shared by [`Group`] and [`Projection`].
///
/// Each helper sets `result: {operator: field}`, where string fields are
/// turned into field references.
pub trait Computer {
    fn fields_mut(&mut self) -> &mut Document;

    fn compute(&mut self, operator: &str, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        let mut accumulator = Document::new();
        accumulator.insert(operator, prepare_field(field.into()));
        self.fields_mut().insert(result.into(), accumulator);
        self
    }

    /// Like [`Computer::compute`], storing the result under the field's own
    /// name.
    fn compute_field(&mut self, operator: &str, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        let field = field.into();
        let reference = Bson::String(field.clone());
        self.compute(operator, field, reference)
    }

    /// Counts the documents of each group: `result: {$sum: 1}`.
    fn count(&mut self, result: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$sum", result, 1)
    }

    /// Sums `field`. Pass `1` to count documents.
    fn sum(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$sum", result, field)
    }

    fn add_to_set(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$addToSet", result, field)
    }

    fn first(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$first", result, field)
    }

    fn last(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$last", result, field)
    }

    fn max(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$max", result, field)
    }

    fn min(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$min", result, field)
    }

    fn push(&mut self, result: impl Into<String>, field: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute("$push", result, field)
    }

    fn sum_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$sum", field)
    }

    fn add_to_set_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$addToSet", field)
    }

    fn first_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$first", field)
    }

    fn last_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$last", field)
    }

    /// `field: {$max: "$field"}`.
    fn max_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$max", field)
    }

    fn min_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$min", field)
    }

    fn push_of(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.compute_field("$push", field)
    }
}

/// Contents of a `$group` stage.
#[derive(Debug, Clone, Default)]
pub struct Group {
    fields: Document,
}

impl Group {
    pub fn new() -> Self {
        Group::default()
    }

    /// Sets the grouping key (`_id`).
    pub fn by(&mut self, index: impl Into<Bson>) -> &mut Self {
        self.fields.insert("_id", prepare_field(index.into()));
        self
    }

    pub fn get_group(&self) -> Document {
        self.fields.clone()
    }
}

impl Computer for Group {
    fn fields_mut(&mut self) -> &mut Document {
        &mut self.fields
    }
}

impl Compile for Group {
    fn compile(&self) -> Document {
        self.get_group()
    }
}

impl From<Group> for Input<'_, Group> {
    fn from(builder: Group) -> Self {
        Input::Builder(builder)
    }
}

/// Contents of a `$project` stage.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    fields: Document,
}

impl Projection {
    pub fn new() -> Self {
        Projection::default()
    }

    pub fn select(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), 1);
        self
    }

    pub fn exclude(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), -1);
        self
    }

    /// Exposes `field` under the name `alias`.
    pub fn alias(&mut self, field: &str, alias: impl Into<String>) -> &mut Self {
        self.fields.insert(alias.into(), prepare_field(Bson::String(field.to_string())));
        self
    }

    pub fn get_projection(&self) -> Document {
        self.fields.clone()
    }
}

impl Computer for Projection {
    fn fields_mut(&mut self) -> &mut Document {
        &mut self.fields
    }
}

impl Compile for Projection {
    fn compile(&self) -> Document {
        self.get_projection()
    }
}

impl From<Projection> for Input<'_, Projection> {
    fn from(builder: Projection) -> Self {
        Input::Builder(builder)
    }
}
