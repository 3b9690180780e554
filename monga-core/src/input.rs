//! Clause inputs accepted interchangeably by the builders.
//!
//! Most builder entry points that take a sub-clause accept a literal document,
//! a callback configuring a fresh sub-builder, or an already configured
//! sub-builder. [`Input`] captures those three shapes and [`Input::resolve`]
//! turns any of them into the document the enclosing builder embeds.

use bson::{Bson, Document};

use crate::error::MongaError;

/// A builder that compiles down to a single document.
pub trait Compile: Default {
    fn compile(&self) -> Document;
}

/// A sub-clause handed to a builder.
pub enum Input<'a, B> {
    /// A literal document, embedded as-is.
    Document(Document),
    /// A callback run against a fresh `B`.
    Callback(Box<dyn FnOnce(&mut B) + 'a>),
    /// A configured builder.
    Builder(B),
}

impl<'a, B: Compile> Input<'a, B> {
    /// Wraps a callback configuring a fresh sub-builder.
    pub fn callback(callback: impl FnOnce(&mut B) + 'a) -> Self {
        Input::Callback(Box::new(callback))
    }

    /// Resolves the input to the document it stands for.
    pub fn resolve(self) -> Document {
        match self {
            Input::Document(document) => document,
            Input::Callback(callback) => {
                let mut builder = B::default();
                callback(&mut builder);
                builder.compile()
            }
            Input::Builder(builder) => builder.compile(),
        }
    }
}

impl<B> From<Document> for Input<'_, B> {
    fn from(document: Document) -> Self {
        Input::Document(document)
    }
}

impl<B> TryFrom<Bson> for Input<'_, B> {
    type Error = MongaError;

    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        match value {
            Bson::Document(document) => Ok(Input::Document(document)),
            other => Err(MongaError::InvalidArgument(format!(
                "expected a document or a callback, got {:?}",
                other.element_type()
            ))),
        }
    }
}
