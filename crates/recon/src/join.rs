use std::collections::{BTreeMap, HashMap};

use crate::error::ReconError;
use crate::model::{LongTable, Period, TidyRecord};

/// Join key: (entity, period).
type JoinKey = (String, Period);

/// Inner-join long tables on (entity, period).
///
/// Tables are combined in lexicographic indicator order, each one joined
/// into the accumulator built from the previous ones. A key survives only if
/// every table carries a present value for it; `None` values never match.
/// One table is the identity case: its present rows, no join performed.
/// Output is ordered by (entity, period).
pub fn join_all(tables: &[LongTable]) -> Result<Vec<TidyRecord>, ReconError> {
    let mut ordered: Vec<&LongTable> = tables.iter().collect();
    ordered.sort_by(|a, b| a.indicator.cmp(&b.indicator));

    for pair in ordered.windows(2) {
        if pair[0].indicator == pair[1].indicator {
            return Err(ReconError::malformed(
                &pair[0].indicator,
                "indicator supplied more than once",
            ));
        }
    }

    let Some((first, rest)) = ordered.split_first() else {
        return Err(ReconError::NoSources);
    };

    let mut acc = seed(first)?;
    for table in rest {
        acc = inner_join(acc, table)?;
        log::debug!("joined '{}': {} keys remain", table.indicator, acc.len());
    }

    Ok(acc
        .into_iter()
        .map(|((entity, period), values)| TidyRecord {
            entity,
            period,
            values,
        })
        .collect())
}

fn seed(table: &LongTable) -> Result<BTreeMap<JoinKey, BTreeMap<String, f64>>, ReconError> {
    let mut acc = BTreeMap::new();
    for (row, value) in table.present() {
        let key = (row.entity.clone(), row.period);
        let values = BTreeMap::from([(table.indicator.clone(), value)]);
        if acc.insert(key, values).is_some() {
            return Err(duplicate_key(table, &row.entity, row.period));
        }
    }
    Ok(acc)
}

/// Keep accumulator keys that `next` also has a present value for, adding
/// `next`'s column.
fn inner_join(
    acc: BTreeMap<JoinKey, BTreeMap<String, f64>>,
    next: &LongTable,
) -> Result<BTreeMap<JoinKey, BTreeMap<String, f64>>, ReconError> {
    let mut right: HashMap<(&str, Period), f64> = HashMap::with_capacity(next.rows.len());
    for (row, value) in next.present() {
        if right.insert((row.entity.as_str(), row.period), value).is_some() {
            return Err(duplicate_key(next, &row.entity, row.period));
        }
    }

    Ok(acc
        .into_iter()
        .filter_map(|(key, mut values)| {
            let value = *right.get(&(key.0.as_str(), key.1))?;
            values.insert(next.indicator.clone(), value);
            Some((key, values))
        })
        .collect())
}

fn duplicate_key(table: &LongTable, entity: &str, period: Period) -> ReconError {
    ReconError::malformed(
        &table.indicator,
        format!("duplicate row for ('{entity}', {period})"),
    )
}
