//! The boolean filter tree behind every `Where` builder.
//!
//! A filter is kept in disjunctive normal form: the root is an ordered list of
//! OR-branches and every branch is an ordered list of AND-clauses. A clause is
//! either a flat field-predicate document or an explicit and-list, created when
//! a field is constrained twice inside the same branch.
//!
//! ```text
//! FilterTree ── Branch ── Clause::Fields { a: 1, b: { $gt: 2 } }
//!            │        └── Clause::All [ { c: 1 }, { c: 2 } ]
//!            └─ Branch ── Clause::Fields { d: true }
//! ```
//!
//! Serialization collapses every single-child layer, so a tree holding one
//! branch with one clause renders as that clause's document.

use bson::{Bson, Document, doc};
use log::trace;

/// Pseudo-fields whose value is a list of sub-filters. Repeated predicates on
/// these fields append to the list instead of splitting the clause.
const LIST_FIELDS: [&str; 2] = ["$nor", "$not"];

/// Which branch of the tree receives a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// Merge into the currently open AND-branch.
    And,
    /// Start a new OR-branch.
    Or,
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Fields(Document),
    All(Vec<Document>),
}

impl Clause {
    fn from_document(document: Document) -> Self {
        match into_list(unwrap_single(document), "$and") {
            Ok(list) => Clause::All(list.into_iter().map(unwrap_single).collect()),
            Err(document) => Clause::Fields(document),
        }
    }

    fn into_document(self) -> Document {
        match self {
            Clause::Fields(document) => document,
            Clause::All(mut list) if list.len() == 1 => list.pop().unwrap_or_default(),
            Clause::All(list) => doc! { "$and": list },
        }
    }

    fn with_predicate(self, field: String, statement: Bson) -> Self {
        match self {
            Clause::Fields(mut document) => match merge_predicate(&mut document, field, statement) {
                Ok(()) => Clause::Fields(document),
                Err((field, statement)) => {
                    trace!("field {field} constrained twice, promoting clause to an and-list");
                    Clause::All(vec![document, doc! { field: statement }])
                }
            },
            Clause::All(mut list) => {
                match list.pop() {
                    Some(mut last) if !last.contains_key("$and") && !last.contains_key("$or") => {
                        if let Err((field, statement)) = merge_predicate(&mut last, field, statement) {
                            list.push(last);
                            list.push(doc! { field: statement });
                        } else {
                            list.push(last);
                        }
                    }
                    Some(last) => {
                        list.push(last);
                        list.push(doc! { field: statement });
                    }
                    None => list.push(doc! { field: statement }),
                }
                Clause::All(list)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Branch {
    clauses: Vec<Clause>,
}

impl Branch {
    fn from_document(document: Document) -> Self {
        let clauses = match into_list(document, "$and") {
            Ok(list) => list.into_iter().map(Clause::from_document).collect(),
            Err(document) => vec![Clause::from_document(document)],
        };
        Branch { clauses }
    }

    fn collapse(self) -> Document {
        let mut documents = self
            .clauses
            .into_iter()
            .map(Clause::into_document)
            .collect::<Vec<_>>();

        if documents.len() == 1 {
            if let Some(document) = documents.pop() {
                return unwrap_single(document);
            }
        }

        doc! { "$and": documents }
    }
}

/// An OR-of-ANDs filter under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree {
    branches: Vec<Branch>,
}

impl FilterTree {
    pub fn new() -> Self {
        FilterTree::default()
    }

    /// Rebuilds the canonical tree shape from a raw filter document so that
    /// further predicates can be chained onto it. An empty document yields an
    /// empty tree.
    pub fn from_document(document: Document) -> Self {
        if document.is_empty() {
            return FilterTree::default();
        }

        let branches = match into_list(document, "$or") {
            Ok(list) => list,
            Err(document) => vec![document],
        };

        FilterTree {
            branches: branches
                .into_iter()
                .filter(|branch| !branch.is_empty())
                .map(Branch::from_document)
                .collect(),
        }
    }

    /// `true` while no predicate has been added.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Number of OR-branches before collapsing.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn clear(&mut self) {
        self.branches.clear();
    }

    /// Adds a `field: statement` predicate.
    ///
    /// Under [`Chain::And`] the predicate is merged into the last clause of the
    /// last branch. A field already present in that clause is never
    /// overwritten: the clause is split into an and-list instead, except for
    /// the list pseudo-fields `$nor` and `$not` whose lists are concatenated.
    pub fn push_predicate(&mut self, chain: Chain, field: impl Into<String>, statement: Bson) {
        let field = field.into();

        match chain {
            Chain::Or => self.branches.push(Branch {
                clauses: vec![Clause::Fields(doc! { field: statement })],
            }),
            Chain::And => {
                let mut branch = self.branches.pop().unwrap_or_default();
                let clause = branch
                    .clauses
                    .pop()
                    .unwrap_or_else(|| Clause::Fields(Document::new()));
                branch.clauses.push(clause.with_predicate(field, statement));
                self.branches.push(branch);
            }
        }
    }

    /// Embeds a compiled sub-filter. The sub-filter becomes a clause of its own,
    /// so following AND predicates are merged into it. Empty sub-filters are
    /// ignored.
    pub fn push_nested(&mut self, chain: Chain, statement: Document) {
        let statement = unwrap_single(statement);
        if statement.is_empty() {
            return;
        }

        match chain {
            Chain::Or => self.branches.push(Branch {
                clauses: vec![Clause::from_document(statement)],
            }),
            Chain::And => {
                let mut branch = self.branches.pop().unwrap_or_default();
                branch.clauses.push(Clause::from_document(statement));
                self.branches.push(branch);
            }
        }
    }

    /// Serializes the tree, collapsing every single-child layer.
    pub fn to_document(&self) -> Document {
        let mut branches = self
            .branches
            .iter()
            .cloned()
            .map(Branch::collapse)
            .collect::<Vec<_>>();

        match branches.len() {
            0 => Document::new(),
            1 => branches.pop().unwrap_or_default(),
            _ => doc! { "$or": branches },
        }
    }
}

fn merge_predicate(
    document: &mut Document,
    field: String,
    statement: Bson,
) -> Result<(), (String, Bson)> {
    if !document.contains_key(&field) {
        document.insert(field, statement);
        return Ok(());
    }

    if !LIST_FIELDS.contains(&field.as_str()) {
        return Err((field, statement));
    }

    match (document.get_mut(&field), statement) {
        (Some(Bson::Array(existing)), Bson::Array(items)) => {
            existing.extend(items);
            Ok(())
        }
        (_, statement) => Err((field, statement)),
    }
}

/// Splits `{operator: [doc, ...]}` into its documents. Anything else, including
/// documents carrying extra keys, is handed back untouched.
fn into_list(mut document: Document, operator: &str) -> Result<Vec<Document>, Document> {
    let is_list = document.len() == 1
        && matches!(
            document.get(operator),
            Some(Bson::Array(items)) if items.iter().all(|item| matches!(item, Bson::Document(_)))
        );

    if !is_list {
        return Err(document);
    }

    match document.remove(operator) {
        Some(Bson::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Bson::Document(document) => Some(document),
                _ => None,
            })
            .collect()),
        _ => Err(document),
    }
}

/// Strips `{"$and": [x]}` and `{"$or": [x]}` wrappers down to `x`.
fn unwrap_single(mut document: Document) -> Document {
    while let Some(inner) = single_child(&document) {
        document = inner;
    }
    document
}

fn single_child(document: &Document) -> Option<Document> {
    if document.len() != 1 {
        return None;
    }

    let (operator, value) = document.iter().next()?;
    if operator != "$and" && operator != "$or" {
        return None;
    }

    match value {
        Bson::Array(items) if items.len() == 1 => match &items[0] {
            Bson::Document(inner) => Some(inner.clone()),
            _ => None,
        },
        _ => None,
    }
}
