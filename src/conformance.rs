//! Contract conformance.
//!
//! A record satisfies a contract when every required method is matched, by
//! name and identical signature text, within one of the record's two method
//! sets:
//! - the value form: methods declared against the value
//! - the mutable-reference form: every method of the value form plus those
//!   declared only against the reference
//!
//! Checking only the value form would miss records whose required methods
//! take a reference receiver.

use symdex_core::types::{Method, MethodSig};

use crate::entities::{Contract, Record};

/// Returns true if every method of `required` is matched within `methods`.
fn satisfies<'m, I>(methods: I, required: &[MethodSig]) -> bool
where
    I: Iterator<Item = &'m Method> + Clone,
{
    required
        .iter()
        .all(|req| methods.clone().any(|m| m.matches(req)))
}

/// Returns true if the value form or the reference form of `record`
/// satisfies `contract`.
pub fn implements(record: &Record, contract: &Contract) -> bool {
    satisfies(record.value_methods(), &contract.methods)
        || satisfies(record.reference_methods(), &contract.methods)
}

/// Records satisfying `contract`, in the order they were given.
pub fn implementations<'r, I>(records: I, contract: &Contract) -> Vec<&'r Record>
where
    I: IntoIterator<Item = &'r Record>,
{
    records
        .into_iter()
        .filter(|record| implements(record, contract))
        .collect()
}
