//! Operator allow-list

use std::collections::HashSet;

use sb_core::OperatorId;

/// Operators allowed to talk to the service
///
/// An empty list authorizes nobody.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    operators: HashSet<OperatorId>,
}

impl AllowList {
    pub fn new<I, T>(operators: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OperatorId>,
    {
        Self {
            operators: operators.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_authorized(&self, operator: &OperatorId) -> bool {
        self.operators.contains(operator)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
