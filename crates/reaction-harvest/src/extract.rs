//! Record extractor: walk a settled list and map each entry to a [`Record`].

use crate::config::HarvestConfig;
use crate::field::{try_resolve_field, try_resolve_field_with_fallback, OrEmpty};
use crate::page::Element;
use crate::types::{FieldKind, FieldMisses, HarvestResult, Record};

/// Records produced by one extraction pass, with per-field miss counts.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub misses: FieldMisses,
}

/// Extract one record per entry of `list`, in presentation order.
///
/// Entries are enumerated once; the result has exactly one record per
/// handle observed, with `index` running 1..=n.
pub async fn extract_records(list: &dyn Element, config: &HarvestConfig) -> HarvestResult<Extraction> {
    let items = list.find_children(&config.selectors.item).await?;
    tracing::info!("Extracting {} entries", items.len());

    let attach_wait = config.timing.field_attach_wait();
    let mut extraction = Extraction {
        records: Vec::with_capacity(items.len()),
        misses: FieldMisses::default(),
    };

    for (position, item) in items.iter().enumerate() {
        let item = item.as_ref();
        let mut values: [String; 4] = Default::default();
        for (value, kind) in values.iter_mut().zip(FieldKind::ALL) {
            let locator = config.fields.get(kind);
            let result = match kind {
                FieldKind::UserName => {
                    try_resolve_field_with_fallback(item, locator, attach_wait).await
                }
                _ => try_resolve_field(item, locator, attach_wait).await,
            };
            if result.is_err() {
                extraction.misses.record(kind);
            }
            *value = result.or_empty();
        }
        let [user_name, current_role, profile_link, reaction_type] = values;

        let record = Record {
            index: position as u32 + 1,
            reaction_type,
            user_name,
            current_role,
            profile_link,
        };

        tracing::info!(
            "#{} [{}] {} | {} | {}",
            record.index,
            record.reaction_type,
            record.user_name,
            record.current_role,
            record.profile_link
        );
        extraction.records.push(record);
    }

    Ok(extraction)
}

/// Extract the records of `list`, discarding miss statistics.
pub async fn extract_all(list: &dyn Element, config: &HarvestConfig) -> HarvestResult<Vec<Record>> {
    Ok(extract_records(list, config).await?.records)
}
