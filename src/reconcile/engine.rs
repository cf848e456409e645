//! Single-transaction reconciliation

use crate::crawler::BookRecord;
use crate::reconcile::{ReconcileFailure, ReconcileOutcome, ReconcileStage};
use crate::storage::{CatalogStore, CatalogTransaction, NewBook};
use std::collections::{BTreeSet, HashMap};

/// Persists a scraped batch into `store`
///
/// Inside one transaction this:
/// 1. Collects the distinct category names of the batch
/// 2. Looks up which of them already exist
/// 3. Creates the missing categories
/// 4. Inserts one book per record, linked to its category id
///
/// Either everything commits or nothing does. Categories created earlier in
/// a failed call are rolled back with the rest.
///
/// An empty batch does nothing and does not open a transaction.
pub fn reconcile<S>(store: &mut S, records: &[BookRecord]) -> Result<ReconcileOutcome, ReconcileFailure>
where
    S: CatalogStore + ?Sized,
{
    if records.is_empty() {
        tracing::debug!("Nothing to reconcile");
        return Ok(ReconcileOutcome::default());
    }

    let mut tx = store
        .begin_transaction()
        .map_err(ReconcileFailure::at(ReconcileStage::Begin))?;

    match apply(tx.as_mut(), records) {
        Ok(outcome) => {
            tx.commit().map_err(ReconcileFailure::at(ReconcileStage::Commit))?;
            Ok(outcome)
        }
        Err(failure) => {
            tracing::warn!("Rolling back reconciliation: {}", failure);
            if let Err(e) = tx.rollback() {
                tracing::error!("Rollback failed: {}", e);
            }
            Err(failure)
        }
    }
}

fn apply<T>(tx: &mut T, records: &[BookRecord]) -> Result<ReconcileOutcome, ReconcileFailure>
where
    T: CatalogTransaction + ?Sized,
{
    let names: BTreeSet<String> = records.iter().map(|r| r.category.clone()).collect();

    let mut ids: HashMap<String, i64> = tx
        .find_categories_by_name(&names)
        .map_err(ReconcileFailure::at(ReconcileStage::Lookup))?
        .into_iter()
        .map(|category| (category.name, category.id))
        .collect();

    let mut categories_created = 0;
    for name in &names {
        if ids.contains_key(name) {
            continue;
        }
        let id = tx
            .create_category(name)
            .map_err(ReconcileFailure::at(ReconcileStage::CreateCategory))?;
        tracing::debug!("Created category '{}' (id {})", name, id);
        ids.insert(name.clone(), id);
        categories_created += 1;
    }

    let books = records
        .iter()
        .map(|record| {
            let category_id = *ids.get(&record.category).ok_or_else(|| {
                ReconcileFailure::UnresolvedCategory {
                    name: record.category.clone(),
                }
            })?;

            Ok(NewBook {
                title: record.title.clone(),
                price: record.price.clone(),
                rating: record.rating,
                availability: record.availability.clone(),
                image_src: record.image_src.clone(),
                category_id,
            })
        })
        .collect::<Result<Vec<_>, ReconcileFailure>>()?;

    tx.create_books(&books)
        .map_err(ReconcileFailure::at(ReconcileStage::CreateBooks))?;

    Ok(ReconcileOutcome {
        categories_created,
        books_created: books.len(),
    })
}
