/// Allocates the next identifier for a collection: the successor of the
/// highest numeric id, rendered as a decimal string. Ids that do not
/// parse as numbers are skipped, so the result is never already present
/// in the supplied collection.
pub fn next_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    (max + 1).to_string()
}
