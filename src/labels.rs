//! Label relevance filtering and reply composition for the photo branch

use std::collections::HashSet;

/// Labels that mark a photo as containing mushrooms
pub const MUSHROOM_LABELS: [&str; 2] = ["fungus", "mushroom"];

/// Reply when no mushroom label was detected
pub const NOT_FOUND_MESSAGE: &str = "Увы, но на этом изображении грибов я не вижу.";

/// Prefix of the reply listing detected labels
pub const SEEN_PREFIX: &str = "На этом изображении я вижу: ";

/// Footer appended to every photo-branch reply
pub const DISCLAIMER: &str = "\n\n⚠️ Результаты распознавания и определения основаны на сервисах Google Cloud Vision и Google Cloud Translation. За любые несоответствия фактического названия гриба и результатов распознавания ответственны указанные решения и их производители. Мы рекомендуем вам брать только те грибы, в которых вы уверены на 100 %.";

/// Whether any of `targets` equals any of `candidates`, ignoring case
pub fn has_any<T, C>(targets: &[T], candidates: &[C]) -> bool
where
    T: AsRef<str>,
    C: AsRef<str>,
{
    targets.iter().any(|target| {
        let target = target.as_ref().to_lowercase();
        candidates
            .iter()
            .any(|candidate| candidate.as_ref().to_lowercase() == target)
    })
}

/// Keep the elements of `source` that are not in `exclude`
///
/// Matching is exact and case-sensitive. Order and duplicates of `source`
/// are preserved.
#[must_use]
pub fn filter<S: AsRef<str>>(source: &[String], exclude: &[S]) -> Vec<String> {
    let exclude: HashSet<&str> = exclude.iter().map(AsRef::as_ref).collect();
    source
        .iter()
        .filter(|label| !exclude.contains(label.as_str()))
        .cloned()
        .collect()
}

/// Outcome of inspecting the detected labels of a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelVerdict {
    /// No mushroom label among the detections
    NotFound,
    /// Mushroom detected; remaining labels joined with `", "`
    Seen(String),
}

impl LabelVerdict {
    /// Classify a detector result
    ///
    /// Note that `filter` compares case-sensitively against lowercase
    /// category names, so capitalized detector labels such as `"Mushroom"`
    /// stay in the joined text.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Self {
        if !has_any(&MUSHROOM_LABELS, labels) {
            return Self::NotFound;
        }
        Self::Seen(filter(labels, &MUSHROOM_LABELS).join(", "))
    }
}

/// Final text for a not-found verdict
#[must_use]
pub fn not_found_reply() -> String {
    format!("{NOT_FOUND_MESSAGE}{DISCLAIMER}")
}

/// Final text listing the (possibly translated) labels
#[must_use]
pub fn seen_reply(labels_text: &str) -> String {
    format!("{SEEN_PREFIX}{labels_text}{DISCLAIMER}")
}
