use cname_finalizer_domain::AliasChainError;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use rustc_hash::FxHashMap;

pub fn is_alias(record: &Record) -> bool {
    record.record_type() == RecordType::CNAME
}

/// True when at least one record ends the chain.
pub fn has_terminal_record(records: &[Record]) -> bool {
    records.iter().any(|r| !is_alias(r))
}

/// Follow the CNAME chain in `records` starting at `start` and return the last
/// target, i.e. the first name with no further alias in this record set.
///
/// Only CNAME records take part; anything else is ignored. Fails when the set
/// has no aliases at all, when `start` itself is not aliased, or when the chain
/// takes more hops than there are aliases (a loop).
pub fn find_last_target(records: &[Record], start: &Name) -> Result<Name, AliasChainError> {
    let aliases: FxHashMap<&Name, &Name> = records
        .iter()
        .filter_map(|record| match record.data() {
            RData::CNAME(cname) => Some((record.name(), &cname.0)),
            _ => None,
        })
        .collect();

    if aliases.is_empty() {
        return Err(AliasChainError::NoAliasRecords);
    }

    let mut current = start;
    let mut hops = 0usize;
    while let Some(&next) = aliases.get(current) {
        hops += 1;
        if hops > aliases.len() {
            return Err(AliasChainError::CircularAlias(start.to_string()));
        }
        current = next;
    }

    if hops == 0 {
        return Err(AliasChainError::NoAliasForName(start.to_string()));
    }

    Ok(current.clone())
}
