//! In-memory transaction list with its filtered view.
//!
//! The owner applies every change to both lists, in order, so the filtered
//! view never shows a row that the full list no longer holds.

use crate::{Filters, Transaction, TransactionChange};

#[derive(Debug, Default, Clone)]
pub struct TransactionList {
    all: Vec<Transaction>,
    filtered: Vec<Transaction>,
    filters: Filters,
}

impl TransactionList {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let mut list = Self::default();
        list.replace_all(transactions);
        list
    }

    pub fn all(&self) -> &[Transaction] {
        &self.all
    }

    pub fn visible(&self) -> &[Transaction] {
        &self.filtered
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.all.iter().find(|tx| tx.id == id)
    }

    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        self.all = transactions;
        self.refilter();
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.refilter();
    }

    /// Adds a freshly created transaction on top of both lists. It is shown
    /// in the filtered view only when it matches the active filters.
    pub fn prepend(&mut self, transaction: Transaction) {
        if self.filters.matches(&transaction) {
            self.filtered.insert(0, transaction.clone());
        }
        self.all.insert(0, transaction);
    }

    /// Applies an update or a removal. Unknown ids are ignored.
    pub fn apply(&mut self, change: TransactionChange) {
        match change {
            TransactionChange::Updated(updated) => {
                replace(&mut self.all, &updated);
                replace(&mut self.filtered, &updated);
            }
            TransactionChange::Deleted(id) => {
                self.all.retain(|tx| tx.id != id);
                self.filtered.retain(|tx| tx.id != id);
            }
        }
    }

    fn refilter(&mut self) {
        self.filtered = self.filters.apply(&self.all);
    }
}

fn replace(list: &mut [Transaction], updated: &Transaction) {
    if let Some(slot) = list.iter_mut().find(|tx| tx.id == updated.id) {
        *slot = updated.clone();
    }
}
