//! Remove queries.

use bson::Document;

use crate::{
    options::{Options, OptionsPatch, QueryOptions},
    query::{filter::FilterTree, where_clause::WhereClause},
};

/// A remove query. Removes every matching document unless [`Remove::single`]
/// is set.
#[derive(Debug, Clone, Default)]
pub struct Remove {
    filter: FilterTree,
    options: Options,
    just_one: bool,
}

impl Remove {
    pub fn new() -> Self {
        Remove::default()
    }

    pub fn single(&mut self, single: bool) -> &mut Self {
        self.just_one = single;
        self
    }

    pub fn multiple(&mut self, multiple: bool) -> &mut Self {
        self.just_one = !multiple;
        self
    }

    pub fn is_just_one(&self) -> bool {
        self.just_one
    }
}

impl WhereClause for Remove {
    fn filter_tree(&self) -> &FilterTree {
        &self.filter
    }

    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        &mut self.filter
    }
}

impl QueryOptions for Remove {
    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn apply_options(&mut self, patch: &OptionsPatch) {
        self.options.apply(patch);
        if let Some(just_one) = patch.just_one {
            self.just_one = just_one;
        }
    }

    fn get_options(&self) -> Document {
        let mut options = self.options.to_document();
        options.insert("justOne", self.just_one);
        options
    }
}
