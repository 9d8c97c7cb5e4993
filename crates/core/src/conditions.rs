//! Structural predicates that disambiguate overloaded tokens

use crate::engine::ResolveError;
use crate::models::ConditionKind;
use crate::syntax::Grammar;
use crate::table::MappingTable;
use std::collections::HashMap;
use std::fmt;

/// What a predicate may inspect about a candidate token
pub struct NodeContext<'a> {
    pub kind: &'a str,
    pub text: &'a str,
    pub parent_kind: Option<&'a str>,
    pub grammar: &'a dyn Grammar,
}

pub type Predicate = Box<dyn Fn(&NodeContext<'_>) -> bool + Send + Sync>;

/// Registry mapping condition kinds to predicates.
///
/// Adding a context-sensitive symbol means registering a predicate here and
/// referencing its kind from the mapping table; the resolver is unchanged.
pub struct ConditionEvaluator {
    predicates: HashMap<ConditionKind, Predicate>,
}

impl ConditionEvaluator {
    /// Evaluator with no predicates; only `None` conditions pass validation
    pub fn empty() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut evaluator = Self::empty();
        evaluator.register(ConditionKind::ParentIsBinaryExpression, |ctx| {
            ctx.parent_kind
                .is_some_and(|kind| ctx.grammar.is_binary_expression(kind))
        });
        evaluator
    }

    /// Add or replace the predicate for `kind`. `None` cannot be overridden.
    pub fn register<F>(&mut self, kind: ConditionKind, predicate: F) -> &mut Self
    where
        F: Fn(&NodeContext<'_>) -> bool + Send + Sync + 'static,
    {
        if kind.is_none() {
            tracing::warn!("predicate for condition `none` ignored");
            return self;
        }
        self.predicates.insert(kind, Box::new(predicate));
        self
    }

    pub fn is_registered(&self, kind: &ConditionKind) -> bool {
        kind.is_none() || self.predicates.contains_key(kind)
    }

    pub fn evaluate(&self, kind: &ConditionKind, ctx: &NodeContext<'_>) -> bool {
        if kind.is_none() {
            return true;
        }
        match self.predicates.get(kind) {
            Some(predicate) => predicate(ctx),
            None => {
                tracing::warn!(condition = %kind, "no predicate registered");
                false
            }
        }
    }

    /// Fail on the first condition in `table` without a predicate
    pub fn validate(&self, table: &MappingTable) -> Result<(), ResolveError> {
        for kind in table.conditions() {
            if !self.is_registered(kind) {
                let mapping = table
                    .all()
                    .into_iter()
                    .find(|e| &e.condition == kind)
                    .map(|e| e.source.clone())
                    .unwrap_or_default();
                return Err(ResolveError::UnregisteredCondition {
                    condition: kind.to_string(),
                    mapping,
                });
            }
        }
        Ok(())
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.predicates.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ConditionEvaluator")
            .field("predicates", &kinds)
            .finish()
    }
}
