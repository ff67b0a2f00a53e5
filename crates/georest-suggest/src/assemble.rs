//! Decodes a merged result set into a [`Suggestion`].

use std::collections::HashSet;

use georest_core::{Category, Courier, EngineKey, Order, RegionSuggestion, Suggestion};
use serde::de::DeserializeOwned;

use crate::error::SuggestError;
use crate::hits::{EngineResultSet, NormalizedHit};

/// Builds the category lists of a [`Suggestion`] from engine hits.
///
/// Engines are visited in key order, so `orders` hits come before the
/// `orders-prefix` hits; an order seen twice keeps its first occurrence.
/// Every courier and order gets the hit's document id as its `id`. Engines
/// that recorded a failure have no hits and contribute nothing.
///
/// # Errors
///
/// Returns [`SuggestError::Parse`] naming the engine whose payload did not
/// decode.
pub fn build_suggestion(results: &EngineResultSet) -> Result<Suggestion, SuggestError> {
    let mut suggestion = Suggestion::default();
    let mut seen_orders: HashSet<String> = HashSet::new();

    for (key, entry) in results {
        match key.category() {
            Category::Couriers => {
                let couriers =
                    decode_hits(*key, &entry.hits, |courier: &mut Courier, id| courier.id = id)?;
                suggestion.couriers.extend(couriers);
            }
            Category::Orders => {
                let orders =
                    decode_hits(*key, &entry.hits, |order: &mut Order, id| order.id = id)?;
                suggestion.orders.extend(
                    orders
                        .into_iter()
                        .filter(|order| seen_orders.insert(order.id.clone())),
                );
            }
            Category::Regions => {
                // Region payloads already carry their identifier.
                let regions =
                    decode_hits(*key, &entry.hits, |_: &mut RegionSuggestion, _| {})?;
                suggestion.regions.extend(regions);
            }
        }
    }
    Ok(suggestion)
}

fn decode_hits<T, F>(
    engine: EngineKey,
    hits: &[NormalizedHit],
    mut tag: F,
) -> Result<Vec<T>, SuggestError>
where
    T: DeserializeOwned,
    F: FnMut(&mut T, String),
{
    hits.iter()
        .map(|hit| {
            let mut record: T = hit.decode().map_err(|e| SuggestError::Parse {
                engine,
                reason: format!("document {}: {e}", hit.id),
            })?;
            tag(&mut record, hit.id.clone());
            Ok(record)
        })
        .collect()
}
