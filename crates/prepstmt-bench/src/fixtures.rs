//! Fixture data for read benchmarks.

use rand::Rng;
use uuid::Uuid;

use crate::backends::RowStore;
use crate::error::Result;

/// Generate a unique text value for one row.
pub fn random_data() -> String {
    Uuid::new_v4().to_string()
}

/// Draw an identifier (or threshold) in `[0, bound)`.
///
/// Zero is never assigned by the database, so draws of `0` exercise the
/// not-found path the same way the rest of the range exercises hits.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R, bound: i32) -> i32 {
    if bound <= 0 {
        return 0;
    }
    rng.gen_range(0..bound)
}

/// Insert `count` rows of random text through the store's insert path.
///
/// Returns the inserted values in insertion order. Inserts that report no
/// rows are skipped; any other error aborts the seeding.
pub async fn seed(store: &mut dyn RowStore, count: usize) -> Result<Vec<String>> {
    let mut inserted = Vec::with_capacity(count);

    for _ in 0..count {
        let data = random_data();
        match store.insert(&data).await {
            Ok(()) => inserted.push(data),
            Err(e) if e.is_row_not_found() => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(inserted)
}
