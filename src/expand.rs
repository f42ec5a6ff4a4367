use crate::error::ScrapeError;

/// Repeat each label `counts[i]` times, keeping input order.
///
/// A zero count skips its label without disturbing the labels after it.
/// Fails with [`ScrapeError::InputMismatch`] when the two slices differ in
/// length instead of silently truncating.
pub fn expand<S: AsRef<str>>(labels: &[S], counts: &[usize]) -> Result<Vec<String>, ScrapeError> {
    if labels.len() != counts.len() {
        return Err(ScrapeError::InputMismatch {
            labels: labels.len(),
            counts: counts.len(),
        });
    }

    let mut ret = Vec::with_capacity(counts.iter().sum());
    for (label, &count) in labels.iter().zip(counts) {
        ret.extend(std::iter::repeat(label.as_ref().to_string()).take(count));
    }
    Ok(ret)
}
